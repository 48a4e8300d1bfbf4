#![forbid(unsafe_code)]

//! Bookkeeping that maps animation frame callbacks back to their handles.
//!
//! Every request shares one JS callback, which only receives a timestamp.
//! Browsers run animation frame callbacks in the order they were requested,
//! so the oldest uncancelled request is the one firing.

use std::collections::VecDeque;

use aura_motion::host::FrameHandle;

#[derive(Debug, Default)]
pub struct FrameQueue {
    scheduled: VecDeque<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&mut self, handle: FrameHandle) {
        self.scheduled.push_back(handle);
    }

    /// Forget a cancelled request. Returns whether it was still queued.
    pub fn cancelled(&mut self, handle: FrameHandle) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|h| *h != handle);
        self.scheduled.len() != before
    }

    /// Handle of the callback that is firing now.
    pub fn fired(&mut self) -> Option<FrameHandle> {
        self.scheduled.pop_front()
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    pub fn clear(&mut self) {
        self.scheduled.clear();
    }
}
