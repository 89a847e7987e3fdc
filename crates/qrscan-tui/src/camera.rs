//! Platform camera backed by nokhwa.
//!
//! nokhwa cameras are not `Send`, so opening happens inline on the UI task.
//! Opening blocks for as long as the driver takes to negotiate a format.

use async_trait::async_trait;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use qrscan_core::{CameraError, CameraHandle, CameraIndices, CameraSource, Facing, FrameBuffer};

use crate::tcc::{self, CameraPermission};

/// Formats tried in order. Higher resolution helps QR detection.
fn requested_formats() -> [RequestedFormat<'static>; 4] {
    let closest = |width, height, format| {
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(width, height),
            format,
            30,
        )))
    };
    [
        closest(1280, 720, FrameFormat::MJPEG),
        closest(1280, 720, FrameFormat::YUYV),
        closest(640, 480, FrameFormat::MJPEG),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

/// Opens cameras by device index, one index per facing mode.
pub struct NokhwaSource {
    cameras: CameraIndices,
}

impl NokhwaSource {
    pub fn new(cameras: CameraIndices) -> Self {
        Self { cameras }
    }

    fn open_with_fallback(&self, index: u32) -> Result<Camera, CameraError> {
        let formats = requested_formats();
        let mut last_error = String::new();

        for (i, requested) in formats.iter().enumerate() {
            tracing::debug!("Trying camera format {}/{}", i + 1, formats.len());
            match Camera::new(CameraIndex::Index(index), *requested) {
                Ok(camera) => return Ok(camera),
                Err(e) => {
                    tracing::warn!("Format {} failed: {}", i + 1, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(CameraError::from_platform(format!(
            "no usable format on camera {}: {}",
            index, last_error
        )))
    }
}

#[async_trait(?Send)]
impl CameraSource for NokhwaSource {
    type Handle = NokhwaHandle;

    async fn open(&mut self, facing: Facing) -> Result<NokhwaHandle, CameraError> {
        if tcc::camera_permission() == CameraPermission::Denied {
            return Err(CameraError::PermissionDenied(format!(
                "camera access for {} is off",
                tcc::host_app().1
            )));
        }

        let index = self.cameras.for_facing(facing);
        tracing::info!("Opening {} (device {})", facing.label(), index);
        let mut camera = self.open_with_fallback(index)?;

        camera.open_stream().map_err(|e| {
            CameraError::from_platform(format!("failed to start camera stream: {}", e))
        })?;

        tracing::info!(
            "Camera opened: {} at {:?}",
            camera.info().human_name(),
            camera.resolution()
        );

        Ok(NokhwaHandle {
            camera,
            streaming: true,
        })
    }
}

/// An open camera stream. Stops the stream on release or drop.
pub struct NokhwaHandle {
    camera: Camera,
    streaming: bool,
}

impl CameraHandle for NokhwaHandle {
    fn snapshot(&mut self) -> Result<FrameBuffer, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Unavailable(e.to_string()))?;
        let rgb = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Unavailable(e.to_string()))?;

        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        Ok(FrameBuffer::from_rgb(width, height, rgb.as_raw()).unwrap_or_default())
    }

    fn release(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        match self.camera.stop_stream() {
            Ok(()) => tracing::info!("Camera stream stopped"),
            Err(e) => tracing::warn!("Failed to stop camera stream: {}", e),
        }
    }
}

impl Drop for NokhwaHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Cameras the platform reports, as `(index, name)`.
pub fn list_cameras() -> Result<Vec<(String, String)>, CameraError> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| CameraError::from_platform(e.to_string()))?;
    Ok(cameras
        .into_iter()
        .map(|info| (info.index().as_string(), info.human_name()))
        .collect())
}

