//! Camera-driven QR scanning core.
//!
//! This crate provides:
//! - Session data and the scan state machine (`types` and `scanner` modules)
//! - Camera acquisition seam and handle ownership (`capture` module)
//! - Interval-driven frame sampling (`sampler` module)
//! - Raster frame buffers and previews (`frame` module)
//! - The QR decoder adapter over rqrr (`decoder` module)
//! - Clipboard output seam (`clipboard` module)
//!
//! With the `persistence` feature enabled:
//! - Configuration management (`config` module)
//!
//! With the `test-util` feature enabled:
//! - A fake camera and QR fixtures (`testing` module)

pub mod capture;
pub mod clipboard;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod sampler;
pub mod scanner;
pub mod types;

#[cfg(feature = "persistence")]
pub mod config;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use capture::{CameraHandle, CameraSource, CaptureController};
pub use clipboard::{Clipboard, MemoryClipboard};
pub use decoder::{Decoder, RqrrDecoder, decode_image_bytes};
pub use error::{CameraError, ClipboardError};
pub use frame::{FrameBuffer, PREVIEW_HEIGHT, PREVIEW_WIDTH, Preview};
pub use sampler::{DEFAULT_SAMPLE_INTERVAL, Sampler, TickOutcome, TickSchedule};
pub use scanner::{DEFAULT_SWITCH_DELAY, Scanner, ScannerOptions};
pub use types::{Facing, Session, SessionState};

#[cfg(feature = "persistence")]
pub use config::{AppConfig, CameraIndices, ConfigError, ThemeConfig};
