//! Scripted camera for the scenario tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use qrscan_core::{CameraError, CameraHandle, CameraSource, Facing, FrameBuffer};

pub use qrscan_core::testing::qr_frame;

pub fn blank_frame() -> FrameBuffer {
    qrscan_core::testing::blank_frame(320, 240)
}

#[derive(Default)]
struct Shared {
    /// Frames handed out one per snapshot; the last one repeats.
    script: VecDeque<FrameBuffer>,
    deny_permission: bool,
    open_calls: usize,
    open_handles: usize,
    max_open_handles: usize,
}

/// Camera whose frames are scripted ahead of time.
#[derive(Clone, Default)]
pub struct ScriptedCamera {
    shared: Rc<RefCell<Shared>>,
}

impl ScriptedCamera {
    pub fn new() -> Self {
        let camera = Self::default();
        camera.push(blank_frame());
        camera
    }

    pub fn denying_permission() -> Self {
        let camera = Self::new();
        camera.shared.borrow_mut().deny_permission = true;
        camera
    }

    pub fn allow_permission(&self) {
        self.shared.borrow_mut().deny_permission = false;
    }

    pub fn push(&self, frame: FrameBuffer) {
        self.shared.borrow_mut().script.push_back(frame);
    }

    /// Replace the script with a single repeating frame.
    pub fn show(&self, frame: FrameBuffer) {
        let mut shared = self.shared.borrow_mut();
        shared.script.clear();
        shared.script.push_back(frame);
    }

    pub fn open_handles(&self) -> usize {
        self.shared.borrow().open_handles
    }

    pub fn max_open_handles(&self) -> usize {
        self.shared.borrow().max_open_handles
    }

    pub fn open_calls(&self) -> usize {
        self.shared.borrow().open_calls
    }
}

pub struct ScriptedHandle {
    shared: Rc<RefCell<Shared>>,
    open: bool,
}

#[async_trait(?Send)]
impl CameraSource for ScriptedCamera {
    type Handle = ScriptedHandle;

    async fn open(&mut self, _facing: Facing) -> Result<ScriptedHandle, CameraError> {
        let mut shared = self.shared.borrow_mut();
        shared.open_calls += 1;
        if shared.deny_permission {
            return Err(CameraError::PermissionDenied(
                "user dismissed the prompt".to_string(),
            ));
        }
        shared.open_handles += 1;
        shared.max_open_handles = shared.max_open_handles.max(shared.open_handles);
        Ok(ScriptedHandle {
            shared: Rc::clone(&self.shared),
            open: true,
        })
    }
}

impl CameraHandle for ScriptedHandle {
    fn snapshot(&mut self) -> Result<FrameBuffer, CameraError> {
        let mut shared = self.shared.borrow_mut();
        let frame = if shared.script.len() > 1 {
            shared.script.pop_front()
        } else {
            shared.script.front().cloned()
        };
        Ok(frame.unwrap_or_default())
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.shared.borrow_mut().open_handles -= 1;
        }
    }
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.release();
    }
}
