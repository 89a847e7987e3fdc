//! Fake camera and QR fixtures for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;

use crate::capture::{CameraHandle, CameraSource};
use crate::error::CameraError;
use crate::frame::FrameBuffer;
use crate::types::Facing;

const QUIET_ZONE: usize = 4;
const MODULE_PX: usize = 6;

/// Render `payload` as a QR code with a quiet zone.
pub fn qr_frame(payload: &str) -> FrameBuffer {
    let code = qrcode::QrCode::new(payload.as_bytes()).expect("payload fits in a QR code");
    let modules = code.width();
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE) * MODULE_PX;
    let mut luma = vec![255u8; side * side];

    for my in 0..modules {
        for mx in 0..modules {
            if colors[my * modules + mx] != qrcode::Color::Dark {
                continue;
            }
            for dy in 0..MODULE_PX {
                for dx in 0..MODULE_PX {
                    let x = (mx + QUIET_ZONE) * MODULE_PX + dx;
                    let y = (my + QUIET_ZONE) * MODULE_PX + dy;
                    luma[y * side + x] = 0;
                }
            }
        }
    }

    FrameBuffer::from_luma(side, side, luma).expect("square buffer")
}

pub fn blank_frame(width: usize, height: usize) -> FrameBuffer {
    FrameBuffer::from_luma(width, height, vec![255; width * height]).expect("sized buffer")
}

#[derive(Default)]
struct FakeState {
    scene: RefCell<FrameBuffer>,
    fail_next: RefCell<Option<CameraError>>,
    opened: RefCell<Vec<Facing>>,
    live: Cell<usize>,
}

/// In-memory camera. Clones share state so tests can inspect it after
/// handing one to the scanner.
#[derive(Clone, Default)]
pub struct FakeCamera {
    state: Rc<FakeState>,
}

impl FakeCamera {
    pub fn new() -> Self {
        let camera = Self::default();
        camera.show(blank_frame(64, 48));
        camera
    }

    /// Frame returned by every snapshot until changed.
    pub fn show(&self, frame: FrameBuffer) {
        *self.state.scene.borrow_mut() = frame;
    }

    pub fn fail_next_open(&self, err: CameraError) {
        *self.state.fail_next.borrow_mut() = Some(err);
    }

    pub fn live_handles(&self) -> usize {
        self.state.live.get()
    }

    pub fn opened_with(&self) -> Vec<Facing> {
        self.state.opened.borrow().clone()
    }
}

pub struct FakeHandle {
    state: Rc<FakeState>,
    released: bool,
}

#[async_trait(?Send)]
impl CameraSource for FakeCamera {
    type Handle = FakeHandle;

    async fn open(&mut self, facing: Facing) -> Result<FakeHandle, CameraError> {
        if let Some(err) = self.state.fail_next.borrow_mut().take() {
            return Err(err);
        }
        self.state.opened.borrow_mut().push(facing);
        self.state.live.set(self.state.live.get() + 1);
        Ok(FakeHandle {
            state: Rc::clone(&self.state),
            released: false,
        })
    }
}

impl CameraHandle for FakeHandle {
    fn snapshot(&mut self) -> Result<FrameBuffer, CameraError> {
        Ok(self.state.scene.borrow().clone())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.state.live.set(self.state.live.get() - 1);
        }
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.release();
    }
}
