//! UI rendering.

use qrscan_core::{Preview, Session, SessionState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, LOG_PANEL_LINES};
use crate::log_buffer::LogLevel;

/// Snapshot of the scanner the UI renders from.
pub struct ScanView<'a> {
    pub session: &'a Session,
    pub preview: Option<&'a Preview>,
}

/// Braille dot bits indexed by `[row][column]` inside one 2x4 cell.
const BRAILLE_DOTS: [[u32; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// Placeholder size when there is no preview yet, in braille cells.
const PLACEHOLDER_WIDTH: usize = 40;
const PLACEHOLDER_HEIGHT: usize = 12;

pub fn render(frame: &mut Frame, app: &App, view: &ScanView) {
    let banner_height = if view.session.error_message.is_some() { 3 } else { 0 };
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(LOG_PANEL_LINES as u16 + 2),
    ])
    .split(frame.area());

    render_header(frame, app, view, chunks[0]);
    if let Some(message) = &view.session.error_message {
        render_error_banner(frame, app, message, chunks[1]);
    }
    match view.session.state() {
        SessionState::Idle => render_idle(frame, app, view, chunks[2]),
        SessionState::Scanning => render_scanning(frame, app, view, chunks[2]),
        SessionState::Result => render_result(frame, app, view, chunks[2]),
    }
    render_key_hints(frame, app, view.session.state(), chunks[3]);
    render_logs(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, view: &ScanView, area: Rect) {
    let p = &app.palette;
    let state = view.session.state();
    let state_style = match state {
        SessionState::Idle => Style::default().fg(p.muted),
        SessionState::Scanning => Style::default().fg(p.warning),
        SessionState::Result => Style::default().fg(p.success),
    };

    let line = Line::from(vec![
        Span::styled(" qrscan ", Style::default().fg(p.primary).bold()),
        Span::styled("│ ", Style::default().fg(p.border)),
        Span::styled(state.label(), state_style),
        Span::styled(" │ ", Style::default().fg(p.border)),
        Span::styled(view.session.facing.label(), Style::default().fg(p.fg)),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border)),
    );
    frame.render_widget(header, area);
}

fn render_error_banner(frame: &mut Frame, app: &App, message: &str, area: Rect) {
    let p = &app.palette;
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("✗ ", Style::default().fg(p.error).bold()),
        Span::styled(message.to_string(), Style::default().fg(p.error)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.error))
            .title(" Camera error "),
    );
    frame.render_widget(banner, area);
}

fn render_idle(frame: &mut Frame, app: &App, view: &ScanView, area: Rect) {
    let p = &app.palette;
    let mut lines = vec![Line::from("")];
    lines.extend(placeholder_box(' ', Style::default().fg(p.border), Style::default()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to scan a QR code",
        Style::default().fg(p.fg).bold(),
    )));
    lines.push(Line::from(Span::styled(
        format!("Camera: {}", view.session.facing.label()),
        Style::default().fg(p.muted),
    )));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_scanning(frame: &mut Frame, app: &App, view: &ScanView, area: Rect) {
    let p = &app.palette;
    let border_style = Style::default().fg(p.border);
    let mut lines = vec![Line::from("")];

    match view.preview {
        Some(preview) if preview.width > 0 && preview.height > 0 => {
            let threshold = mean_luma(&preview.pixels);
            let braille =
                grayscale_to_braille(&preview.pixels, preview.width, preview.height, threshold);
            let inner_width = preview.width.div_ceil(2);

            lines.push(Line::from(Span::styled(
                format!("┌{}┐", "─".repeat(inner_width)),
                border_style,
            )));
            for row in braille {
                lines.push(Line::from(vec![
                    Span::styled("│", border_style),
                    Span::styled(row, Style::default().fg(p.fg)),
                    Span::styled("│", border_style),
                ]));
            }
            lines.push(Line::from(Span::styled(
                format!("└{}┘", "─".repeat(inner_width)),
                border_style,
            )));
        }
        _ => {
            lines.extend(placeholder_box(
                app.spinner_char(),
                border_style,
                Style::default().fg(p.muted),
            ));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Scanning... [{} frames]", view.session.frames_sampled),
        Style::default().fg(p.warning),
    )));
    lines.push(Line::from(Span::styled(
        format!("Hold a QR code in front of the {}", view.session.facing.label().to_lowercase()),
        Style::default().fg(p.muted),
    )));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_result(frame: &mut Frame, app: &App, view: &ScanView, area: Rect) {
    let p = &app.palette;
    let text = view.session.decoded_text.as_deref().unwrap_or_default();

    let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(2)]).split(area);

    let result = Paragraph::new(text.to_string())
        .style(Style::default().fg(p.fg))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.success))
                .title(Span::styled(" Decoded ", Style::default().fg(p.success).bold())),
        );
    frame.render_widget(result, chunks[0]);

    let mut actions = vec![
        Span::styled("[y] ", Style::default().fg(p.highlight)),
        Span::styled("Copy", Style::default().fg(p.fg).bold()),
        Span::raw("    "),
        Span::styled("[Enter] ", Style::default().fg(p.highlight)),
        Span::styled("Scan another", Style::default().fg(p.fg).bold()),
    ];
    if let Some(notice) = &app.notice {
        actions.push(Span::raw("    "));
        actions.push(Span::styled(notice.clone(), Style::default().fg(p.success)));
    }
    frame.render_widget(
        Paragraph::new(vec![Line::from(""), Line::from(actions)]).alignment(Alignment::Center),
        chunks[1],
    );
}

fn render_key_hints(frame: &mut Frame, app: &App, state: SessionState, area: Rect) {
    let p = &app.palette;
    let keys: &[(&str, &str)] = match state {
        SessionState::Idle => &[("Enter", "Scan"), ("c", "Switch camera"), ("q", "Quit")],
        SessionState::Scanning => &[("Esc", "Stop"), ("c", "Switch camera"), ("q", "Quit")],
        SessionState::Result => &[
            ("y", "Copy"),
            ("Enter", "Scan another"),
            ("c", "Switch camera"),
            ("q", "Quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, label) in keys.iter().chain([("PgUp/PgDn", "Logs")].iter()) {
        spans.push(Span::styled(format!(" {}", key), Style::default().fg(p.highlight)));
        spans.push(Span::styled(format!(":{} ", label), Style::default().fg(p.muted)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let log_count = app.log_buffer.len();
    let logs = app.log_buffer.tail(LOG_PANEL_LINES, app.log_scroll);

    let mut lines: Vec<Line> = logs
        .iter()
        .map(|log| {
            let level_style = match log.level {
                LogLevel::Trace => Style::default().fg(p.muted),
                LogLevel::Debug => Style::default().fg(p.primary),
                LogLevel::Info => Style::default().fg(p.success),
                LogLevel::Warn => Style::default().fg(p.warning),
                LogLevel::Error => Style::default().fg(p.error),
            };
            Line::from(vec![
                Span::styled(
                    log.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(p.muted),
                ),
                Span::styled(format!("{:5} ", log.level.as_str()), level_style),
                Span::styled(format!("[{}] ", log.target), Style::default().fg(p.muted)),
                Span::raw(log.message.clone()),
            ])
        })
        .collect();
    while lines.len() < LOG_PANEL_LINES {
        lines.insert(0, Line::from(""));
    }

    let scroll_info = if app.log_scroll > 0 {
        format!("[↑{}] ", app.log_scroll)
    } else {
        String::new()
    };
    let title = Line::from(vec![
        Span::raw(" Logs "),
        Span::styled(format!("({}) ", log_count), Style::default().fg(p.muted)),
        Span::styled(scroll_info, Style::default().fg(p.muted)),
    ]);

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border))
            .title(title),
    );
    frame.render_widget(paragraph, area);
}

/// Empty bordered frame with `indicator` in the middle.
fn placeholder_box(indicator: char, border: Style, indicator_style: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(PLACEHOLDER_HEIGHT + 2);
    lines.push(Line::from(Span::styled(
        format!("┌{}┐", "─".repeat(PLACEHOLDER_WIDTH)),
        border,
    )));
    for row in 0..PLACEHOLDER_HEIGHT {
        let fill = if row == PLACEHOLDER_HEIGHT / 2 {
            format!("{:^width$}", indicator, width = PLACEHOLDER_WIDTH)
        } else {
            " ".repeat(PLACEHOLDER_WIDTH)
        };
        lines.push(Line::from(vec![
            Span::styled("│", border),
            Span::styled(fill, indicator_style),
            Span::styled("│", border),
        ]));
    }
    lines.push(Line::from(Span::styled(
        format!("└{}┘", "─".repeat(PLACEHOLDER_WIDTH)),
        border,
    )));
    lines
}

/// Average brightness, used as the dark/light cut for the preview.
fn mean_luma(pixels: &[u8]) -> u8 {
    if pixels.is_empty() {
        return 128;
    }
    let sum: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
    (sum / pixels.len() as u64) as u8
}

/// Render greyscale pixels as braille, one character per 2x4 block.
///
/// Pixels darker than `threshold` become raised dots. Out-of-range pixels
/// count as white.
pub fn grayscale_to_braille(
    pixels: &[u8],
    width: usize,
    height: usize,
    threshold: u8,
) -> Vec<String> {
    (0..height)
        .step_by(4)
        .map(|row| {
            (0..width)
                .step_by(2)
                .map(|col| {
                    let mut bits = 0u32;
                    for (dy, dots) in BRAILLE_DOTS.iter().enumerate() {
                        for (dx, dot) in dots.iter().enumerate() {
                            let (x, y) = (col + dx, row + dy);
                            if x >= width || y >= height {
                                continue;
                            }
                            if pixels.get(y * width + x).copied().unwrap_or(255) < threshold {
                                bits |= dot;
                            }
                        }
                    }
                    char::from_u32(0x2800 + bits).unwrap_or(' ')
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_buffer::LogBuffer;
    use crate::theme::Theme;
    use qrscan_core::{Facing, PREVIEW_HEIGHT, PREVIEW_WIDTH};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(app: &App, view: &ScanView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| render(frame, app, view)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        App::new(Theme::Dark, LogBuffer::new())
    }

    #[test]
    fn test_braille_blank_and_full() {
        let white = grayscale_to_braille(&[255; 8], 2, 4, 128);
        assert_eq!(white, vec!["\u{2800}".to_string()]);

        let black = grayscale_to_braille(&[0; 8], 2, 4, 128);
        assert_eq!(black, vec!["\u{28FF}".to_string()]);
    }

    #[test]
    fn test_braille_dot_positions() {
        let mut pixels = [255u8; 8];
        pixels[0] = 0; // top-left, dot 1
        assert_eq!(grayscale_to_braille(&pixels, 2, 4, 128)[0], "\u{2801}");

        let mut pixels = [255u8; 8];
        pixels[7] = 0; // bottom-right, dot 8
        assert_eq!(grayscale_to_braille(&pixels, 2, 4, 128)[0], "\u{2880}");
    }

    #[test]
    fn test_braille_preview_dimensions() {
        let pixels = vec![200u8; PREVIEW_WIDTH * PREVIEW_HEIGHT];
        let lines = grayscale_to_braille(&pixels, PREVIEW_WIDTH, PREVIEW_HEIGHT, 128);
        assert_eq!(lines.len(), PREVIEW_HEIGHT / 4);
        assert!(lines.iter().all(|l| l.chars().count() == PREVIEW_WIDTH / 2));
    }

    #[test]
    fn test_braille_odd_dimensions() {
        let lines = grayscale_to_braille(&[0; 15], 3, 5, 128);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 2);
    }

    #[test]
    fn test_mean_luma() {
        assert_eq!(mean_luma(&[]), 128);
        assert_eq!(mean_luma(&[0, 255]), 127);
    }

    #[test]
    fn test_render_idle() {
        let session = Session::new(Facing::Environment);
        let screen = draw(&app(), &ScanView { session: &session, preview: None });
        assert!(screen.contains("Press Enter to scan a QR code"));
        assert!(screen.contains("Back camera"));
        assert!(!screen.contains("Camera error"));
    }

    #[test]
    fn test_render_scanning_with_preview() {
        let mut session = Session::new(Facing::User);
        session.active = true;
        session.frames_sampled = 7;
        let preview = Preview {
            pixels: vec![0; PREVIEW_WIDTH * PREVIEW_HEIGHT],
            width: PREVIEW_WIDTH,
            height: PREVIEW_HEIGHT,
        };

        let screen = draw(
            &app(),
            &ScanView {
                session: &session,
                preview: Some(&preview),
            },
        );
        assert!(screen.contains("Scanning... [7 frames]"));
        assert!(screen.contains("Front camera"));
        assert!(screen.contains('\u{2800}'));
    }

    #[test]
    fn test_render_result_offers_copy() {
        let mut session = Session::new(Facing::Environment);
        session.decoded_text = Some("https://example.com".to_string());
        let mut app = app();
        app.notice = Some("Copied to clipboard".to_string());

        let screen = draw(&app, &ScanView { session: &session, preview: None });
        assert!(screen.contains("https://example.com"));
        assert!(screen.contains("Copy"));
        assert!(screen.contains("Scan another"));
        assert!(screen.contains("Copied to clipboard"));
    }

    #[test]
    fn test_render_error_banner() {
        let mut session = Session::new(Facing::Environment);
        session.error_message = Some("Could not access the camera.".to_string());

        let screen = draw(&app(), &ScanView { session: &session, preview: None });
        assert!(screen.contains("Camera error"));
        assert!(screen.contains("Could not access the camera."));
    }
}
