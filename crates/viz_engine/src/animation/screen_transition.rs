//! Whole-surface crossfade
//!
//! Snapshots the surface into an offscreen buffer when a transition
//! begins, then composites that snapshot over each new frame at a falling
//! opacity until the transition runs out. Placed last in the scene graph,
//! this crossfades from whatever was on screen to whatever the frames
//! underneath now draw.

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::Animator;
use crate::render::surface::{DrawingSurface, OffscreenId};
use crate::render::RenderResult;
use crate::scene::renderable::{NodeState, Renderable, Resizeable};

/// Crossfade from the previous surface contents to the new ones
///
/// The transition is three things at once: an [`Animator`] that advances
/// the fade, a [`Renderable`] that composites the snapshot, and a
/// [`Resizeable`] that keeps the snapshot buffer sized to the surface.
/// Nothing is drawn until [`begin`](Self::begin) captures a snapshot; a
/// transition that was never begun just counts down and finishes.
pub struct ScreenTransition {
    state: NodeState,
    duration: f32,
    elapsed: f32,
    done: bool,
    cancelled: bool,
    buffer: Option<OffscreenId>,
}

impl ScreenTransition {
    /// Create a transition lasting `duration_seconds`
    ///
    /// A duration of zero or less finishes on the first advance.
    pub fn new(duration_seconds: f32) -> Self {
        Self {
            state: NodeState::new(),
            duration: duration_seconds,
            elapsed: 0.0,
            done: false,
            cancelled: false,
            buffer: None,
        }
    }

    /// Create a transition already wrapped for shared ownership
    ///
    /// The same allocation goes into the scene graph as a node and into
    /// an animation set as an animator.
    pub fn new_shared(duration_seconds: f32) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(duration_seconds)))
    }

    /// Capture the current surface contents and start the fade
    ///
    /// Reuses the offscreen buffer from a previous run when one exists,
    /// resizing it to the current surface dimensions. On failure the
    /// transition holds no snapshot and renders nothing; the caller
    /// decides whether to cut directly instead.
    pub fn begin(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        let extent = surface.extent();
        let buffer = match self.buffer {
            Some(buffer) => {
                surface.resize_offscreen(buffer, extent.width, extent.height)?;
                buffer
            }
            None => {
                let buffer = surface.create_offscreen(extent.width, extent.height)?;
                self.buffer = Some(buffer);
                buffer
            }
        };
        surface.snapshot_to_offscreen(buffer)?;

        self.elapsed = 0.0;
        self.done = false;
        self.cancelled = false;
        self.state.set_dirty(true);
        Ok(())
    }

    /// Progress ratio in `[0, 1]`, where 1 is the end of the fade
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Whether the transition was ended early by cancellation
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Renderable for ScreenTransition {
    fn render(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }

        // The snapshot covers the frame fully at progress 0 and is gone
        // by the time the fade completes.
        if let (Some(buffer), false) = (self.buffer, self.done) {
            surface.blend_offscreen(buffer, 1.0 - self.progress())?;
        }
        self.state.set_dirty(false);
        Ok(())
    }

    fn release(&mut self, surface: &mut dyn DrawingSurface) {
        if let Some(buffer) = self.buffer.take() {
            surface.release_offscreen(buffer);
        }
    }

    fn is_dirty(&self) -> bool {
        self.state.dirty()
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.state.set_dirty(dirty);
    }

    fn is_visible(&self) -> bool {
        self.state.visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.set_visible(visible);
    }

    fn as_resizeable(&mut self) -> Option<&mut dyn Resizeable> {
        Some(self)
    }
}

impl Resizeable for ScreenTransition {
    fn do_layout(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        // Resizing discards the snapshot pixels; the fade keeps its
        // timing and blends whatever the backend now holds.
        if let Some(buffer) = self.buffer {
            let extent = surface.extent();
            surface.resize_offscreen(buffer, extent.width, extent.height)?;
            self.state.set_dirty(true);
        }
        Ok(())
    }
}

impl Animator for ScreenTransition {
    fn advance_frame(&mut self, dt_seconds: f32) {
        if self.done {
            return;
        }

        self.elapsed += dt_seconds;
        if self.elapsed >= self.duration {
            self.done = true;
        }
        // Every advance changes the blend opacity, so the frame must be
        // drawn again.
        self.state.set_dirty(true);
    }

    fn is_animation_done(&self) -> bool {
        self.done
    }

    fn cancel_animation(&mut self) {
        if !self.done {
            self.cancelled = true;
            self.done = true;
            self.state.set_dirty(true);
        }
    }
}
