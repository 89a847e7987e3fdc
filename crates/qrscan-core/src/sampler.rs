//! Interval-driven frame sampling.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::capture::CameraHandle;
use crate::decoder::Decoder;
use crate::frame::{PREVIEW_HEIGHT, PREVIEW_WIDTH, Preview};

/// Period between capture-and-decode attempts.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Shortest period accepted; `tokio::time::interval` rejects zero.
const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

/// Cancellable repeating timer.
///
/// Holds at most one interval. Cancelling drops it on the spot, so no tick
/// can fire after `cancel` returns.
#[derive(Debug)]
pub struct TickSchedule {
    period: Duration,
    interval: Option<Interval>,
}

impl TickSchedule {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_SAMPLE_INTERVAL),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking one period from now, replacing any running interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        // A slow decode pushes the next tick back rather than bunching ticks up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    /// Drop the interval. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.interval.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Never completes while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Result of one sampler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The scanner is not active; nothing was sampled.
    Inactive,
    /// The camera had no decodable frame yet.
    NoFrame,
    /// A frame was sampled but held no readable QR code.
    NoCode,
    /// A QR code was decoded.
    Decoded(String),
}

/// Captures a frame per tick and hands it to the decoder.
pub struct Sampler<D: Decoder> {
    schedule: TickSchedule,
    decoder: D,
    preview: Option<Preview>,
}

impl<D: Decoder> Sampler<D> {
    pub fn new(decoder: D, period: Duration) -> Self {
        Self {
            schedule: TickSchedule::new(period),
            decoder,
            preview: None,
        }
    }

    pub fn schedule(&self) -> &TickSchedule {
        &self.schedule
    }

    pub fn arm(&mut self) {
        self.preview = None;
        self.schedule.arm();
    }

    pub fn cancel(&mut self) -> bool {
        self.schedule.cancel()
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_armed()
    }

    pub async fn wait(&mut self) {
        self.schedule.tick().await;
    }

    /// Downsampled copy of the last sampled frame.
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Rasterise the current frame and try to decode it.
    ///
    /// The frame buffer lives only for the duration of this call.
    pub fn sample<H: CameraHandle>(&mut self, handle: &mut H) -> TickOutcome {
        let frame = match handle.snapshot() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Frame capture error: {}", e);
                return TickOutcome::NoFrame;
            }
        };

        if frame.is_empty() {
            tracing::debug!("No video frame available yet");
            return TickOutcome::NoFrame;
        }

        self.preview = Some(frame.preview(PREVIEW_WIDTH, PREVIEW_HEIGHT));

        match self.decoder.decode(&frame) {
            Some(text) => TickOutcome::Decoded(text),
            None => {
                tracing::debug!("No QR code in {}x{} frame", frame.width(), frame.height());
                TickOutcome::NoCode
            }
        }
    }
}
