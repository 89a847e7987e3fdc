//! qrscan - scan QR codes with a camera from the terminal.

mod action;
mod app;
mod camera;
mod clipboard;
mod event;
mod log_buffer;
mod tcc;
mod theme;
mod tui;
mod ui;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use action::Action;
use app::App;
use camera::NokhwaSource;
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use event::{Event, EventHandler};
use log_buffer::{LogBuffer, LogBufferLayer};
use qrscan_core::config::{self, MIN_SAMPLE_INTERVAL_MS};
use qrscan_core::{
    AppConfig, CameraSource, Clipboard, ConfigError, Decoder, Facing, FrameBuffer, RqrrDecoder,
    Scanner, TickOutcome, decode_image_bytes,
};
use theme::Theme;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tui::Tui;

/// Redraw rate for the spinner; sampling runs on its own schedule.
const UI_TICK: Duration = Duration::from_millis(100);

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "qrscan=info,qrscan_core=info";

/// qrscan - point a camera at a QR code and read it.
#[derive(Parser, Debug)]
#[command(name = "qrscan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera to scan with: back or front
    #[arg(short, long)]
    facing: Option<Facing>,

    /// Milliseconds between decode attempts
    #[arg(
        long = "interval-ms",
        value_parser = clap::value_parser!(u64).range(MIN_SAMPLE_INTERVAL_MS..)
    )]
    interval_ms: Option<u64>,

    /// Device index to use for the selected facing mode
    #[arg(short, long)]
    camera: Option<u32>,

    /// Decode a QR code from an image file ("-" for stdin), print it and exit
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// List cameras and exit
    #[arg(long)]
    list_cameras: bool,
}

impl Args {
    fn headless(&self) -> bool {
        self.image.is_some() || self.list_cameras
    }

    /// Layer command-line choices over the stored configuration.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(facing) = self.facing {
            config.facing = facing;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.sample_interval_ms = interval_ms;
        }
        if let Some(index) = self.camera {
            config.cameras.set(config.facing, index);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;

    let log_buffer = LogBuffer::new();
    let env_filter = log_filter(std::env::var("RUST_LOG").ok().as_deref())?;

    if args.headless() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(LogBufferLayer::new(log_buffer.clone()))
            .init();
    }

    if let Some(path) = &args.image {
        return match decode_file(path)? {
            Some(text) => {
                println!("{}", text);
                Ok(())
            }
            None => Err(eyre!("No QR code found in {}", path.display())),
        };
    }

    if args.list_cameras {
        for (index, name) in camera::list_cameras()? {
            println!("{}\t{}", index, name);
        }
        return Ok(());
    }

    let mut stored = load_config();
    let mut app_config = stored.clone();
    args.apply_to(&mut app_config);

    let last_facing = run_scanner(&app_config, log_buffer).await?;

    if remember_switch(&mut stored, app_config.facing, last_facing)
        && let Err(e) = config::save_config(&stored)
    {
        tracing::warn!("Failed to save config: {}", e);
    }
    Ok(())
}

/// `RUST_LOG` when set, otherwise the defaults.
fn log_filter(rust_log: Option<&str>) -> Result<EnvFilter> {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => Ok(EnvFilter::try_new(directives)?),
        _ => Ok(EnvFilter::new(DEFAULT_LOG_FILTER)),
    }
}

/// Record a camera switch made during the session. Returns whether the
/// stored config changed; a facing picked on the command line is not kept.
fn remember_switch(stored: &mut AppConfig, started_with: Facing, last: Facing) -> bool {
    if last == started_with || stored.facing == last {
        return false;
    }
    stored.facing = last;
    true
}

/// Load the stored configuration, falling back to defaults.
///
/// An unreadable file is copied aside so the next save does not lose it.
fn load_config() -> AppConfig {
    match config::load_config() {
        Ok(config) => config,
        Err(ConfigError::Json(e)) => {
            tracing::warn!("Config file is corrupted: {}", e);
            if let Ok(path) = config::get_config_path() {
                match config::backup_corrupted_config(&path) {
                    Ok(backup) => tracing::warn!("Backed up config to {}", backup.display()),
                    Err(e) => tracing::warn!("Failed to back up config: {}", e),
                }
            }
            AppConfig::default()
        }
        Err(e) => {
            tracing::warn!("Failed to load config: {}", e);
            AppConfig::default()
        }
    }
}

/// Decode the first QR code in an image file, or stdin for `-`.
fn decode_file(path: &Path) -> Result<Option<String>> {
    if path.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .wrap_err("Failed to read image from stdin")?;
        return decode_image_bytes(&bytes).wrap_err("Failed to load image from stdin");
    }

    let frame = FrameBuffer::open(path)
        .wrap_err_with(|| format!("Failed to load image {}", path.display()))?;
    Ok(RqrrDecoder.decode(&frame))
}

/// Run the interactive scanner. Returns the facing mode in use at exit.
async fn run_scanner(app_config: &AppConfig, log_buffer: LogBuffer) -> Result<Facing> {
    // Detection reads the terminal's reply, so it has to happen before raw mode.
    let theme = Theme::from_config(app_config.theme);

    if let Err(e) = tcc::ensure_camera_permission() {
        tracing::warn!("Camera permission not available: {}", e);
    }

    let mut scanner = Scanner::new(
        NokhwaSource::new(app_config.cameras),
        app_config.scanner_options(),
    );
    let mut clipboard = clipboard::system_clipboard();
    let mut app = App::new(theme, log_buffer);

    let mut tui = Tui::new()?;
    tui.enter()?;
    let mut events = EventHandler::new(UI_TICK);

    loop {
        tui.draw(|frame| {
            let view = ui::ScanView {
                session: scanner.session(),
                preview: scanner.preview(),
            };
            ui::render(frame, &app, &view);
        })?;

        tokio::select! {
            event = events.next() => {
                match event? {
                    Event::Tick => app.tick(scanner.state()),
                    Event::Key(key) => {
                        if let Some(action) = app.handle_key(key, scanner.state()) {
                            handle_action(action, &mut scanner, &mut app, clipboard.as_mut()).await;
                        }
                    }
                    Event::Resize => {}
                }
            }
            _ = scanner.next_tick() => {
                if let TickOutcome::Decoded(text) = scanner.tick() {
                    tracing::info!("QR code scanned: {} characters", text.chars().count());
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    scanner.stop();
    tui.exit()?;
    Ok(scanner.session().facing)
}

async fn handle_action<S: CameraSource>(
    action: Action,
    scanner: &mut Scanner<S>,
    app: &mut App,
    clipboard: &mut dyn Clipboard,
) {
    app.notice = None;

    match action {
        Action::StartScan => {
            if let Err(e) = scanner.start().await {
                tracing::debug!("Start scan failed: {}", e);
            }
        }
        Action::StopScan => scanner.stop(),
        Action::SwitchCamera => {
            if let Err(e) = scanner.switch_facing().await {
                tracing::debug!("Camera switch failed: {}", e);
            }
        }
        Action::ScanAnother => {
            if let Err(e) = scanner.retry().await {
                tracing::debug!("Scan another failed: {}", e);
            }
        }
        Action::CopyResult => match scanner.copy_result(clipboard) {
            Ok(true) => app.notice = Some("Copied to clipboard".to_string()),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("{}", e);
                app.notice = Some("Copy failed".to_string());
            }
        },
        Action::DismissError => scanner.dismiss_error(),
        Action::Quit => app.should_quit = true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qrscan_core::testing::{FakeCamera, qr_frame};
    use qrscan_core::{CameraError, MemoryClipboard, ScannerOptions, SessionState};
    use tracing::level_filters::LevelFilter;

    fn write_qr_png(payload: &str, name: &str) -> PathBuf {
        let frame = qr_frame(payload);
        let image = image::GrayImage::from_raw(
            frame.width() as u32,
            frame.height() as u32,
            frame.as_bytes().to_vec(),
        )
        .unwrap();
        let path = std::env::temp_dir().join(format!("qrscan-{}-{}.png", name, std::process::id()));
        image.save(&path).unwrap();
        path
    }

    fn app() -> App {
        App::new(Theme::Dark, LogBuffer::new())
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "qrscan",
            "--facing",
            "front",
            "--camera",
            "2",
            "--interval-ms",
            "250",
        ]);
        let mut config = AppConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.facing, Facing::User);
        assert_eq!(config.cameras.user, 2);
        assert_eq!(config.cameras.environment, 0);
        assert_eq!(config.sample_interval_ms, 250);
    }

    #[test]
    fn test_args_without_flags_keep_config() {
        let args = Args::parse_from(["qrscan"]);
        let mut config = AppConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config, AppConfig::default());
        assert!(!args.headless());
    }

    #[test]
    fn test_interval_below_minimum_is_rejected() {
        assert!(Args::try_parse_from(["qrscan", "--interval-ms", "10"]).is_err());
    }

    #[test]
    fn test_unknown_facing_is_rejected() {
        assert!(Args::try_parse_from(["qrscan", "--facing", "sideways"]).is_err());
    }

    #[test]
    fn test_decode_file() {
        let path = write_qr_png("from a file", "decode");
        let decoded = decode_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(decoded.as_deref(), Some("from a file"));
    }

    #[test]
    fn test_decode_missing_file_is_error() {
        let path = std::env::temp_dir().join("qrscan-does-not-exist.png");
        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn test_rust_log_directives_are_kept() {
        let filter = log_filter(Some("qrscan_core=debug")).unwrap();
        assert!(filter.to_string().contains("qrscan_core=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_default_log_filter() {
        for unset in [None, Some(""), Some("  ")] {
            let filter = log_filter(unset).unwrap();
            assert!(filter.to_string().contains("qrscan=info"));
            assert!(filter.to_string().contains("qrscan_core=info"));
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        }
    }

    #[test]
    fn test_invalid_rust_log_is_error() {
        assert!(log_filter(Some("qrscan_core=loud")).is_err());
    }

    #[test]
    fn test_command_line_facing_is_not_saved() {
        let mut stored = AppConfig::default();
        let args = Args::parse_from(["qrscan", "--facing", "front"]);
        let mut session_config = stored.clone();
        args.apply_to(&mut session_config);

        assert!(!remember_switch(&mut stored, session_config.facing, Facing::User));
        assert_eq!(stored.facing, Facing::Environment);
    }

    #[test]
    fn test_switch_during_session_is_saved() {
        let mut stored = AppConfig::default();
        assert!(remember_switch(&mut stored, Facing::Environment, Facing::User));
        assert_eq!(stored.facing, Facing::User);

        // Switched away from a command-line choice back to the stored one.
        let mut stored = AppConfig::default();
        assert!(!remember_switch(&mut stored, Facing::User, Facing::Environment));
        assert_eq!(stored.facing, Facing::Environment);
    }

    #[tokio::test]
    async fn test_failed_start_action_shows_banner() {
        let camera = FakeCamera::new();
        camera.fail_next_open(CameraError::PermissionDenied("denied".to_string()));
        let mut scanner = Scanner::new(camera.clone(), ScannerOptions::default());
        let mut app = app();
        let mut clipboard = MemoryClipboard::new();

        handle_action(Action::StartScan, &mut scanner, &mut app, &mut clipboard).await;
        assert_eq!(scanner.state(), SessionState::Idle);
        assert!(scanner.session().error_message.is_some());
        assert_eq!(camera.live_handles(), 0);

        handle_action(Action::DismissError, &mut scanner, &mut app, &mut clipboard).await;
        assert!(scanner.session().error_message.is_none());
    }

    #[tokio::test]
    async fn test_copy_action_sets_notice() {
        let camera = FakeCamera::new();
        camera.show(qr_frame("copied text"));
        let mut scanner = Scanner::new(camera.clone(), ScannerOptions::default());
        let mut app = app();
        let mut clipboard = MemoryClipboard::new();

        handle_action(Action::StartScan, &mut scanner, &mut app, &mut clipboard).await;
        assert!(matches!(scanner.tick(), TickOutcome::Decoded(_)));

        handle_action(Action::CopyResult, &mut scanner, &mut app, &mut clipboard).await;
        assert_eq!(clipboard.contents(), Some("copied text"));
        assert_eq!(app.notice.as_deref(), Some("Copied to clipboard"));

        handle_action(Action::ScanAnother, &mut scanner, &mut app, &mut clipboard).await;
        assert!(app.notice.is_none());
        assert_eq!(scanner.state(), SessionState::Scanning);
    }
}
