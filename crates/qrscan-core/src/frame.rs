//! Raster snapshots of camera frames.

use std::path::Path;

/// Preview dimensions for braille rendering (2 cols per char, 4 rows per char).
/// 80x48 gives us 40 chars wide × 12 chars tall of braille.
pub const PREVIEW_WIDTH: usize = 80;
pub const PREVIEW_HEIGHT: usize = 48;

/// One greyscale snapshot of the video at native resolution.
///
/// A buffer with zero width or height stands for "no frame yet".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    luma: Vec<u8>,
}

impl FrameBuffer {
    /// A buffer with no pixels.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap greyscale pixels. Returns `None` if the length does not match.
    pub fn from_luma(width: usize, height: usize, luma: Vec<u8>) -> Option<Self> {
        if luma.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            luma,
        })
    }

    /// Convert packed RGB pixels to greyscale.
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != width * height * 3 {
            return None;
        }
        let luma = rgb
            .chunks_exact(3)
            .map(|px| {
                // Y = 0.299*R + 0.587*G + 0.114*B
                ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8
            })
            .collect();
        Some(Self {
            width,
            height,
            luma,
        })
    }

    /// Build from any image the `image` crate can represent.
    pub fn from_image(img: &image::DynamicImage) -> Self {
        let gray = img.to_luma8();
        Self {
            width: gray.width() as usize,
            height: gray.height() as usize,
            luma: gray.into_raw(),
        }
    }

    /// Load and rasterise an encoded image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let img = image::open(path)?;
        Ok(Self::from_image(&img))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when there is nothing to decode.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Greyscale value at (x, y); out of range reads as black.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        if x >= self.width {
            return 0;
        }
        self.luma.get(y * self.width + x).copied().unwrap_or(0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.luma
    }

    /// Downsample for display.
    pub fn preview(&self, dst_width: usize, dst_height: usize) -> Preview {
        Preview {
            pixels: downsample_grayscale(
                &self.luma,
                self.width,
                self.height,
                dst_width,
                dst_height,
            ),
            width: dst_width,
            height: dst_height,
        }
    }
}

/// Downsampled greyscale copy of a frame for the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Greyscale pixels (width × height).
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Nearest-neighbour downsample.
fn downsample_grayscale(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<u8> {
    let mut dst = Vec::with_capacity(dst_width * dst_height);
    if src_width == 0 || src_height == 0 {
        dst.resize(dst_width * dst_height, 128);
        return dst;
    }

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    for dst_y in 0..dst_height {
        for dst_x in 0..dst_width {
            let src_x = ((dst_x as f32 * x_ratio) as usize).min(src_width - 1);
            let src_y = ((dst_y as f32 * y_ratio) as usize).min(src_height - 1);
            dst.push(src.get(src_y * src_width + src_x).copied().unwrap_or(128));
        }
    }

    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_frame() {
        let frame = FrameBuffer::empty();
        assert!(frame.is_empty());
        assert_eq!(frame.width(), 0);
        assert!(frame.as_bytes().is_empty());
    }

    #[test]
    fn test_zero_width_is_empty() {
        let frame = FrameBuffer::from_luma(0, 10, Vec::new()).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_from_luma_length_mismatch() {
        assert!(FrameBuffer::from_luma(4, 4, vec![0; 15]).is_none());
        assert!(FrameBuffer::from_luma(4, 4, vec![0; 16]).is_some());
    }

    #[test]
    fn test_from_rgb_luminance() {
        // white, black, pure red, pure green
        let rgb = [255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 0];
        let frame = FrameBuffer::from_rgb(2, 2, &rgb).unwrap();
        assert_eq!(frame.pixel(0, 0), 255);
        assert_eq!(frame.pixel(1, 0), 0);
        assert_eq!(frame.pixel(0, 1), 76);
        assert_eq!(frame.pixel(1, 1), 149);
    }

    #[test]
    fn test_from_rgb_length_mismatch() {
        assert!(FrameBuffer::from_rgb(2, 2, &[0; 11]).is_none());
    }

    #[test]
    fn test_pixel_out_of_range() {
        let frame = FrameBuffer::from_luma(2, 1, vec![200, 100]).unwrap();
        assert_eq!(frame.pixel(1, 0), 100);
        assert_eq!(frame.pixel(2, 0), 0);
        assert_eq!(frame.pixel(0, 5), 0);
    }

    #[test]
    fn test_from_image() {
        let img = image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            3,
            2,
            image::Luma([42]),
        ));
        let frame = FrameBuffer::from_image(&img);
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert!(frame.as_bytes().iter().all(|&p| p == 42));
    }

    #[test]
    fn test_preview_dimensions() {
        let frame = FrameBuffer::from_luma(640, 480, vec![10; 640 * 480]).unwrap();
        let preview = frame.preview(PREVIEW_WIDTH, PREVIEW_HEIGHT);
        assert_eq!(preview.width, PREVIEW_WIDTH);
        assert_eq!(preview.height, PREVIEW_HEIGHT);
        assert_eq!(preview.pixels.len(), PREVIEW_WIDTH * PREVIEW_HEIGHT);
        assert!(preview.pixels.iter().all(|&p| p == 10));
    }

    #[test]
    fn test_preview_of_empty_frame_is_grey() {
        let preview = FrameBuffer::empty().preview(4, 4);
        assert_eq!(preview.pixels, vec![128; 16]);
    }

    #[test]
    fn test_preview_keeps_left_right_halves() {
        let mut luma = vec![0u8; 8 * 2];
        for y in 0..2 {
            for x in 4..8 {
                luma[y * 8 + x] = 255;
            }
        }
        let frame = FrameBuffer::from_luma(8, 2, luma).unwrap();
        let preview = frame.preview(2, 1);
        assert_eq!(preview.pixels, vec![0, 255]);
    }
}
