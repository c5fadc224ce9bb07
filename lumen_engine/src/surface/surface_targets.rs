/// Render targets of a window, shared with the objects that record into them
///
/// Renderable objects hold an `Arc<SurfaceTargets>` and read the render pass,
/// the per-slot framebuffers and the current slot from it. Every rebuild of
/// the window publishes a new generation; a recording made against an older
/// generation is stale.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};
use crate::error::Result;
use crate::device::{Extent2D, FramebufferHandle, RenderPassHandle};
use crate::engine_invalid_err;

/// Copy of the targets at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSnapshot {
    pub generation: u64,
    pub render_pass: RenderPassHandle,
    pub framebuffers: Vec<FramebufferHandle>,
    pub extent: Extent2D,
    pub current_slot: u32,
}

impl TargetSnapshot {
    pub fn slot_count(&self) -> u32 {
        self.framebuffers.len() as u32
    }
}

#[derive(Debug, Default)]
struct TargetState {
    generation: u64,
    built: bool,
    render_pass: RenderPassHandle,
    framebuffers: Vec<FramebufferHandle>,
    extent: Extent2D,
    current_slot: u32,
}

#[derive(Debug)]
pub struct SurfaceTargets {
    window_id: u64,
    state: RwLock<TargetState>,
}

impl SurfaceTargets {
    pub(crate) fn new(window_id: u64) -> Self {
        Self {
            window_id,
            state: RwLock::new(TargetState::default()),
        }
    }

    /// Id of the owning window
    pub fn window_id(&self) -> u64 {
        self.window_id
    }

    /// Incremented on every rebuild; 0 until the first build
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn is_built(&self) -> bool {
        self.read().built
    }

    pub fn slot_count(&self) -> u32 {
        self.read().framebuffers.len() as u32
    }

    /// Slot of the most recently acquired image
    pub fn current_slot(&self) -> u32 {
        self.read().current_slot
    }

    pub fn render_pass(&self) -> RenderPassHandle {
        self.read().render_pass
    }

    pub fn extent(&self) -> Extent2D {
        self.read().extent
    }

    /// Current targets, or `InvalidResource` while the window is torn down
    pub fn snapshot(&self) -> Result<TargetSnapshot> {
        let state = self.read();
        if !state.built {
            return Err(engine_invalid_err!("lumen::SurfaceTargets",
                "Window {} has no render targets (torn down)", self.window_id));
        }
        Ok(TargetSnapshot {
            generation: state.generation,
            render_pass: state.render_pass,
            framebuffers: state.framebuffers.clone(),
            extent: state.extent,
            current_slot: state.current_slot,
        })
    }

    /// Install freshly built targets and start a new generation
    pub(crate) fn publish(&self, render_pass: RenderPassHandle, framebuffers: Vec<FramebufferHandle>, extent: Extent2D) -> u64 {
        let mut state = self.write();
        state.generation += 1;
        state.built = true;
        state.render_pass = render_pass;
        state.framebuffers = framebuffers;
        state.extent = extent;
        state.current_slot = 0;
        state.generation
    }

    pub(crate) fn set_current_slot(&self, slot: u32) {
        let mut state = self.write();
        debug_assert!(slot < state.framebuffers.len() as u32);
        state.current_slot = slot;
    }

    /// Mark the targets as gone (window teardown)
    pub(crate) fn retire(&self) {
        let mut state = self.write();
        state.built = false;
        state.render_pass = RenderPassHandle::NULL;
        state.framebuffers.clear();
        state.current_slot = 0;
    }

    fn read(&self) -> RwLockReadGuard<'_, TargetState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TargetState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
