//! User intents produced by key handling and applied to the scanner.

/// Actions that drive the scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open the camera and begin sampling.
    StartScan,
    /// Cancel sampling and release the camera.
    StopScan,
    /// Flip between back and front camera.
    SwitchCamera,
    /// Copy the decoded text to the clipboard.
    CopyResult,
    /// Discard the result and scan again.
    ScanAnother,
    /// Hide the error banner.
    DismissError,
    Quit,
}
