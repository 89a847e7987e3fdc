//! Scan session state machine.
//!
//! ```text
//! Idle --start--> Scanning --decoded--> Result --retry--> Scanning
//!                 Scanning --stop-----> Idle
//! ```
//!
//! A failed start leaves the session in `Idle` with an error message and
//! no timer.

use std::time::Duration;

use crate::capture::{CameraSource, CaptureController};
use crate::clipboard::Clipboard;
use crate::decoder::{Decoder, RqrrDecoder};
use crate::error::{CameraError, ClipboardError};
use crate::frame::Preview;
use crate::sampler::{DEFAULT_SAMPLE_INTERVAL, Sampler, TickOutcome};
use crate::types::{Facing, Session, SessionState};

/// Pause between releasing one camera and opening the other.
pub const DEFAULT_SWITCH_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerOptions {
    /// Camera requested on the first start.
    pub facing: Facing,
    /// Period between capture-and-decode attempts.
    pub sample_interval: Duration,
    /// Delay before reopening after a facing switch.
    pub switch_delay: Duration,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            facing: Facing::default(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            switch_delay: DEFAULT_SWITCH_DELAY,
        }
    }
}

/// Owns the session, the camera and the sampler.
///
/// The camera is open exactly when `session().active` is true, and at most
/// one sampling timer exists at any time.
pub struct Scanner<S: CameraSource, D: Decoder = RqrrDecoder> {
    session: Session,
    capture: CaptureController<S>,
    sampler: Sampler<D>,
    switch_delay: Duration,
}

impl<S: CameraSource> Scanner<S> {
    pub fn new(source: S, options: ScannerOptions) -> Self {
        Self::with_decoder(source, RqrrDecoder, options)
    }
}

impl<S: CameraSource, D: Decoder> Scanner<S, D> {
    pub fn with_decoder(source: S, decoder: D, options: ScannerOptions) -> Self {
        Self {
            session: Session::new(options.facing),
            capture: CaptureController::new(source),
            sampler: Sampler::new(decoder, options.sample_interval),
            switch_delay: options.switch_delay,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Last sampled frame, downsampled for display.
    pub fn preview(&self) -> Option<&Preview> {
        if self.session.active {
            self.sampler.preview()
        } else {
            None
        }
    }

    pub fn is_camera_open(&self) -> bool {
        self.capture.is_open()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.sampler.is_running()
    }

    pub fn camera(&self) -> &S {
        self.capture.source()
    }

    pub fn camera_mut(&mut self) -> &mut S {
        self.capture.source_mut()
    }

    /// Open the camera for the current facing mode and begin sampling.
    ///
    /// Clears any previous error and result. On failure the session stays
    /// idle with `error_message` set and no timer armed.
    pub async fn start(&mut self) -> Result<(), CameraError> {
        if self.session.active {
            self.stop();
        }
        self.session.error_message = None;
        self.session.decoded_text = None;
        self.session.frames_sampled = 0;

        match self.capture.acquire(self.session.facing).await {
            Ok(()) => {
                self.session.active = true;
                self.sampler.arm();
                tracing::info!(
                    "Scanning with {} every {:?}",
                    self.session.facing,
                    self.sampler.schedule().period()
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to start camera: {}", e);
                self.session.error_message = Some(e.user_message().to_string());
                Err(e)
            }
        }
    }

    /// Cancel the timer and release the camera. Safe to call when stopped.
    pub fn stop(&mut self) {
        let cancelled = self.sampler.cancel();
        let released = self.capture.release();
        self.session.active = false;
        if cancelled || released {
            tracing::info!("Scanner stopped");
        }
    }

    /// Flip between the back and front camera.
    ///
    /// While scanning, the current stream is released, the switch delay is
    /// awaited and the other camera is opened. When not scanning only the
    /// preference changes.
    pub async fn switch_facing(&mut self) -> Result<(), CameraError> {
        let was_active = self.session.active;
        self.stop();
        self.session.facing = self.session.facing.flipped();
        tracing::info!("Switched to {}", self.session.facing.label());

        if !was_active {
            return Ok(());
        }
        tokio::time::sleep(self.switch_delay).await;
        self.start().await
    }

    /// Discard the current result and scan again.
    pub async fn retry(&mut self) -> Result<(), CameraError> {
        self.session.decoded_text = None;
        self.start().await
    }

    /// Hide the error banner without touching the camera.
    pub fn dismiss_error(&mut self) {
        self.session.error_message = None;
    }

    /// Wait for the sampler's next tick. Never completes while stopped.
    ///
    /// Cancel safe; meant to sit in a `tokio::select!` next to UI events.
    pub async fn next_tick(&mut self) {
        self.sampler.wait().await;
    }

    /// Run one capture-and-decode step.
    ///
    /// A successful decode stores the text and stops the scanner before
    /// returning.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.session.active {
            return TickOutcome::Inactive;
        }
        let Some(handle) = self.capture.handle_mut() else {
            return TickOutcome::Inactive;
        };

        let outcome = self.sampler.sample(handle);
        match &outcome {
            TickOutcome::Decoded(text) => {
                self.session.frames_sampled += 1;
                self.session.decoded_text = Some(text.clone());
                self.stop();
            }
            TickOutcome::NoCode => {
                self.session.frames_sampled += 1;
            }
            TickOutcome::NoFrame | TickOutcome::Inactive => {}
        }
        outcome
    }

    /// Copy the decoded text. Returns `Ok(false)` when there is none.
    pub fn copy_result(&self, clipboard: &mut dyn Clipboard) -> Result<bool, ClipboardError> {
        match self.session.decoded_text.as_deref() {
            Some(text) => {
                clipboard.write_text(text)?;
                tracing::info!("Copied {} characters to clipboard", text.chars().count());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<S: CameraSource, D: Decoder> Drop for Scanner<S, D> {
    fn drop(&mut self) {
        self.stop();
    }
}
