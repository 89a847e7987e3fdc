//! TCC (Transparency, Consent, and Control) camera permission on macOS.
//!
//! Permission is granted to the terminal hosting the binary, so the lookup
//! is keyed on the terminal's bundle ID. Elsewhere every check reports
//! `Unknown` and the camera backend has the last word.

use std::env;

#[cfg(target_os = "macos")]
const TCC_DB_PATH: &str = "Library/Application Support/com.apple.TCC/TCC.db";

#[cfg(target_os = "macos")]
const CAMERA_SERVICE: &str = "kTCCServiceCamera";

/// Recorded camera permission for the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPermission {
    Granted,
    Denied,
    /// No record, or the database could not be read.
    Unknown,
}

/// Bundle ID and display name of the application that owns the permission.
pub fn host_app() -> (&'static str, &'static str) {
    let term_program = env::var("TERM_PROGRAM").unwrap_or_default();

    match term_program.as_str() {
        "" => ("dev.qrscan.qrscan", "qrscan"),
        "Apple_Terminal" => ("com.apple.Terminal", "Terminal"),
        "iTerm.app" => ("com.googlecode.iterm2", "iTerm2"),
        "vscode" => ("com.microsoft.VSCode", "VS Code"),
        "WarpTerminal" => ("dev.warp.Warp-Stable", "Warp"),
        "Alacritty" => ("io.alacritty", "Alacritty"),
        "WezTerm" => ("com.github.wez.wezterm", "WezTerm"),
        "ghostty" => ("com.mitchellh.ghostty", "Ghostty"),
        _ => ("com.apple.Terminal", "Terminal"),
    }
}

#[cfg(target_os = "macos")]
pub fn camera_permission() -> CameraPermission {
    match query_tcc() {
        Ok(Some(true)) => CameraPermission::Granted,
        Ok(Some(false)) => CameraPermission::Denied,
        Ok(None) => CameraPermission::Unknown,
        Err(e) => {
            tracing::debug!("Could not read TCC database: {}", e);
            CameraPermission::Unknown
        }
    }
}

#[cfg(not(target_os = "macos"))]
pub fn camera_permission() -> CameraPermission {
    CameraPermission::Unknown
}

#[cfg(target_os = "macos")]
fn query_tcc() -> Result<Option<bool>, String> {
    use rusqlite::{Connection, OpenFlags};
    use std::path::PathBuf;

    let home = env::var("HOME").map_err(|_| "Could not find HOME directory".to_string())?;
    let db_path = PathBuf::from(home).join(TCC_DB_PATH);
    if !db_path.exists() {
        return Err("TCC.db not found".to_string());
    }

    let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| format!("Failed to open TCC.db: {}", e))?;

    let (bundle_id, display_name) = host_app();
    let mut stmt = conn
        .prepare("SELECT auth_value FROM access WHERE client = ?1 AND service = ?2")
        .map_err(|e| format!("Failed to prepare query: {}", e))?;
    let mut rows = stmt
        .query([bundle_id, CAMERA_SERVICE])
        .map_err(|e| format!("Failed to query: {}", e))?;

    let Some(row) = rows.next().map_err(|e| format!("Failed to read row: {}", e))? else {
        tracing::info!("No camera permission record for {} ({})", display_name, bundle_id);
        return Ok(None);
    };

    // auth_value: 0 denied, 2 allowed.
    let auth_value: i32 = row
        .get(0)
        .map_err(|e| format!("Failed to get auth_value: {}", e))?;
    let allowed = auth_value == 2;
    tracing::info!(
        "Camera permission for {} ({}): {}",
        display_name,
        bundle_id,
        if allowed { "ALLOWED" } else { "DENIED" }
    );
    Ok(Some(allowed))
}

/// Ask the system for camera access. Blocks until the prompt is answered.
#[cfg(target_os = "macos")]
fn request_camera_permission() -> Result<bool, String> {
    use std::process::Command;

    tracing::info!("Requesting camera permission...");
    let output = Command::new("swift")
        .args([
            "-e",
            "import AVFoundation; AVCaptureDevice.requestAccess(for: .video) { granted in exit(granted ? 0 : 1) }",
        ])
        .output()
        .map_err(|e| format!("Failed to execute Swift command: {}", e))?;

    Ok(output.status.success())
}

/// Make sure the host application may use the camera, prompting once if
/// nothing is recorded yet.
#[cfg(target_os = "macos")]
pub fn ensure_camera_permission() -> Result<(), String> {
    match camera_permission() {
        CameraPermission::Granted => Ok(()),
        // macOS never prompts twice; the user has to flip the switch.
        CameraPermission::Denied => Err(format!(
            "camera access for {} is off in System Settings > Privacy & Security > Camera",
            host_app().1
        )),
        CameraPermission::Unknown => match request_camera_permission()? {
            true => Ok(()),
            false => Err("camera permission denied by user".to_string()),
        },
    }
}

#[cfg(not(target_os = "macos"))]
pub fn ensure_camera_permission() -> Result<(), String> {
    Ok(())
}
