//! QR decoding adapter.
//!
//! Decoding itself is delegated to rqrr; this module only adapts frame
//! buffers to it and collapses "nothing found" and "found but unreadable"
//! into `None`.

use crate::frame::FrameBuffer;

/// Turns a raster frame into a QR payload.
pub trait Decoder {
    /// Payload of the first readable QR code in the frame, if any.
    fn decode(&self, frame: &FrameBuffer) -> Option<String>;
}

/// Decoder backed by rqrr.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl Decoder for RqrrDecoder {
    fn decode(&self, frame: &FrameBuffer) -> Option<String> {
        if frame.is_empty() {
            return None;
        }

        let width = frame.width();
        let height = frame.height();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| frame.pixel(x, y));

        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return None;
        }
        tracing::debug!(
            "Detected {} QR grid(s) in {}x{} frame",
            grids.len(),
            width,
            height
        );

        for grid in &grids {
            match grid.decode() {
                Ok((meta, content)) => {
                    tracing::info!(
                        "QR decoded: {} bytes, ECC={:?}, version={:?}",
                        content.len(),
                        meta.ecc_level,
                        meta.version
                    );
                    return Some(content);
                }
                Err(e) => {
                    tracing::debug!("QR decode error: {:?}", e);
                }
            }
        }
        None
    }
}

/// Decode a QR code from encoded image bytes (PNG or JPEG).
pub fn decode_image_bytes(image_data: &[u8]) -> Result<Option<String>, image::ImageError> {
    let img = image::load_from_memory(image_data)?;
    Ok(RqrrDecoder.decode(&FrameBuffer::from_image(&img)))
}
