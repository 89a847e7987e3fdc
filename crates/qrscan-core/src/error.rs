//! Error types for camera acquisition and clipboard output.

use thiserror::Error;

/// Camera acquisition failure.
///
/// Both variants leave the session idle and restartable; the user has to
/// trigger start again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("Camera unavailable: {0}")]
    Unavailable(String),
}

impl CameraError {
    /// Classify a platform error message.
    ///
    /// Platform backends report permission problems as free-form text, so
    /// anything that reads like a refusal becomes `PermissionDenied`.
    pub fn from_platform(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("permission")
            || lower.contains("denied")
            || lower.contains("not authorized")
            || lower.contains("notallowed")
        {
            CameraError::PermissionDenied(message)
        } else {
            CameraError::Unavailable(message)
        }
    }

    /// Message for the error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied(_) => {
                "Could not access the camera. Check the camera permissions."
            }
            CameraError::Unavailable(_) => {
                "Could not access the camera. Make sure one is connected and not in use."
            }
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CameraError::PermissionDenied(_))
    }
}

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write to clipboard: {0}")]
    Write(String),
}
