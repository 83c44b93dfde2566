//! Per-frame orchestration
//!
//! The frame driver runs the fixed phase order every frame: drain queued
//! updates, advance animations, re-layout if the surface changed size,
//! then render the scene. Rendering itself is cheap when nothing is
//! dirty, so the driver can spin at the target rate and let the scene
//! decide whether pixels actually move.

use crate::animation::{AnimationSet, AnimatorRef};
use crate::events::{UpdateListener, UpdateQueue};
use crate::foundation::time::FrameClock;
use crate::render::surface::{DrawingSurface, SurfaceExtent};
use crate::render::RenderResult;
use crate::scene::renderable::{Renderable, Resizeable};
use crate::scene::scene::Scene;

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Frame number, counted from zero
    pub frame: u64,
    /// Elapsed time fed to animators this frame, in seconds
    pub dt_seconds: f32,
    /// Update events delivered to the listener this frame
    pub events_dispatched: usize,
    /// Animators still running after this frame's advance
    pub animators_active: usize,
    /// Whether the scene drew anything, or was clean and skipped
    pub rendered: bool,
}

/// Drives update delivery, animation, layout, and rendering each frame
///
/// The driver owns the update queue and the animation set; producers get
/// queue handles through [`update_queue`](Self::update_queue) and
/// animators are attached with [`spawn`](Self::spawn). The scene and the
/// surface stay with the caller.
pub struct FrameDriver {
    clock: FrameClock,
    animations: AnimationSet,
    updates: UpdateQueue,
    last_extent: Option<SurfaceExtent>,
    frames: u64,
}

impl FrameDriver {
    /// Create a driver with an empty animation set and update queue
    pub fn new() -> Self {
        Self {
            clock: FrameClock::new(),
            animations: AnimationSet::new(),
            updates: UpdateQueue::new(),
            last_extent: None,
            frames: 0,
        }
    }

    /// Handle to the update queue, for producer threads
    pub fn update_queue(&self) -> UpdateQueue {
        self.updates.clone()
    }

    /// Attach an animator to be advanced each frame
    pub fn spawn(&mut self, animator: AnimatorRef) {
        self.animations.spawn(animator);
    }

    /// The driver's animation set
    pub fn animations(&self) -> &AnimationSet {
        &self.animations
    }

    /// Mutable access to the animation set
    pub fn animations_mut(&mut self) -> &mut AnimationSet {
        &mut self.animations
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Average wall-clock frame rate since the driver was created
    ///
    /// Only `run_frame` ticks the clock, so fixed-step callers see zero.
    pub fn average_fps(&self) -> f32 {
        self.clock.average_fps()
    }

    /// Run one frame using wall-clock elapsed time
    pub fn run_frame(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn DrawingSurface,
        listener: Option<&mut dyn UpdateListener>,
    ) -> RenderResult<FrameStats> {
        let dt_seconds = self.clock.tick();
        self.step(dt_seconds, scene, surface, listener)
    }

    /// Run one frame with an explicit time step
    ///
    /// Fixed-step callers and tests drive this directly; `run_frame` is
    /// the wall-clock wrapper around it.
    pub fn step(
        &mut self,
        dt_seconds: f32,
        scene: &mut Scene,
        surface: &mut dyn DrawingSurface,
        listener: Option<&mut dyn UpdateListener>,
    ) -> RenderResult<FrameStats> {
        // 1. Deliver queued updates before anything draws.
        let events_dispatched = match listener {
            Some(listener) => self.updates.handle_events(listener),
            None => 0,
        };

        // 2. Advance animations; finished ones detach here.
        self.animations.advance_all(dt_seconds);

        // 3. Re-layout when the surface changed size since the last frame.
        let extent = surface.extent();
        if self.last_extent != Some(extent) {
            log::debug!("Surface is {}x{}, laying out", extent.width, extent.height);
            scene.do_layout(surface)?;
            self.last_extent = Some(extent);
        }

        // 4. Render; a clean scene draws nothing.
        let rendered = scene.is_dirty() && scene.is_visible();
        scene.render(surface)?;

        let stats = FrameStats {
            frame: self.frames,
            dt_seconds,
            events_dispatched,
            animators_active: self.animations.len(),
            rendered,
        };
        self.frames += 1;
        Ok(stats)
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}
