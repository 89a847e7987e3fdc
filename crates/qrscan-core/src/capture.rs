//! Camera acquisition and handle ownership.

use async_trait::async_trait;

use crate::error::CameraError;
use crate::frame::FrameBuffer;
use crate::types::Facing;

/// Platform camera that can open a video stream for a facing mode.
///
/// Opening may suspend while the platform asks for permission or spins up
/// hardware. Nothing here requires `Send`: the scanner runs on a single
/// logical thread and some camera backends are thread-bound.
#[async_trait(?Send)]
pub trait CameraSource {
    type Handle: CameraHandle;

    /// Open a video-only stream.
    async fn open(&mut self, facing: Facing) -> Result<Self::Handle, CameraError>;
}

/// An open media stream.
pub trait CameraHandle {
    /// Rasterise the current video frame at native resolution.
    ///
    /// A zero-sized buffer means the stream has not produced a frame yet.
    fn snapshot(&mut self) -> Result<FrameBuffer, CameraError>;

    /// Stop the stream. Called exactly once, right before the handle is dropped.
    fn release(&mut self);
}

/// Sole owner of the camera handle.
pub struct CaptureController<S: CameraSource> {
    source: S,
    handle: Option<S::Handle>,
}

impl<S: CameraSource> CaptureController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            handle: None,
        }
    }

    /// Open a stream, releasing any previous handle first.
    pub async fn acquire(&mut self, facing: Facing) -> Result<(), CameraError> {
        if self.release() {
            tracing::warn!("Camera was still open when a new stream was requested");
        }
        tracing::info!("Requesting {} stream", facing);
        let handle = self.source.open(facing).await?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Release the handle if present. Returns whether one was open.
    pub fn release(&mut self) -> bool {
        match self.handle.take() {
            Some(mut handle) => {
                handle.release();
                tracing::debug!("Camera stream released");
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle_mut(&mut self) -> Option<&mut S::Handle> {
        self.handle.as_mut()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCamera;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let camera = FakeCamera::new();
        let mut capture = CaptureController::new(camera.clone());
        assert!(!capture.is_open());

        capture.acquire(Facing::Environment).await.unwrap();
        assert!(capture.is_open());
        assert_eq!(camera.live_handles(), 1);
        assert_eq!(camera.opened_with(), vec![Facing::Environment]);

        assert!(capture.release());
        assert!(!capture.is_open());
        assert_eq!(camera.live_handles(), 0);
    }

    #[tokio::test]
    async fn test_release_when_closed_is_noop() {
        let mut capture = CaptureController::new(FakeCamera::new());
        assert!(!capture.release());
        assert!(!capture.release());
    }

    #[tokio::test]
    async fn test_acquire_twice_keeps_single_handle() {
        let camera = FakeCamera::new();
        let mut capture = CaptureController::new(camera.clone());
        capture.acquire(Facing::Environment).await.unwrap();
        capture.acquire(Facing::User).await.unwrap();
        assert_eq!(camera.live_handles(), 1);
        assert_eq!(camera.opened_with(), vec![Facing::Environment, Facing::User]);
    }

    #[tokio::test]
    async fn test_failed_acquire_leaves_closed() {
        let camera = FakeCamera::new();
        camera.fail_next_open(CameraError::PermissionDenied("nope".to_string()));
        let mut capture = CaptureController::new(camera.clone());

        let err = capture.acquire(Facing::User).await.unwrap_err();
        assert!(err.is_permission_denied());
        assert!(!capture.is_open());
        assert_eq!(camera.live_handles(), 0);
    }
}
