//! Drawing surface abstraction
//!
//! This module defines the trait that drawing backends must implement to
//! host a scene graph. Nodes never talk to a graphics API directly; every
//! drawing call, state change, and resource request goes through
//! [`DrawingSurface`]. Swapping the backend (GPU, offscreen, recording)
//! never touches node code.

use crate::foundation::geometry::Rect;
use crate::foundation::math::Mat4;
use crate::render::mesh::Mesh;
use crate::render::program::ProgramDescriptor;
use crate::render::RenderResult;

/// Pixel dimensions of a drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceExtent {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl SurfaceExtent {
    /// Create a new extent
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Full-surface rectangle at the origin
    pub fn as_rect(&self) -> Rect {
        Rect::from_size(self.width as f32, self.height as f32)
    }

    /// Width over height, or 1.0 for a degenerate surface
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }
}

/// Handle to a compiled shading program stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// Handle to an offscreen color buffer stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffscreenId(pub u64);

/// Identifier a node renders in place of color during picking passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickId(pub u32);

/// Main drawing surface trait
///
/// Implementations provide transform and attribute state stacks, scissor
/// style clipping, mask fills for two-pass clipped rendering, and opaque
/// handles for compiled programs and offscreen buffers.
///
/// # State discipline
/// Every `push_state` must be paired with a `pop_state` and every
/// `push_clip` with a `pop_clip`, including on error paths. Nodes restore
/// whatever they pushed before propagating a failure.
pub trait DrawingSurface {
    /// Get the current surface dimensions
    fn extent(&self) -> SurfaceExtent;

    /// Save the current transform and attribute state
    fn push_state(&mut self);

    /// Restore the most recently saved transform and attribute state
    fn pop_state(&mut self);

    /// Multiply the given matrix onto the current transform
    fn apply_transform(&mut self, transform: &Mat4);

    /// Constrain subsequent drawing to a rectangular region
    ///
    /// Regions nest; the effective clip is the intersection of the stack.
    fn push_clip(&mut self, region: Rect);

    /// Remove the most recently pushed clip region
    fn pop_clip(&mut self);

    /// Begin filling the clip mask for a region
    ///
    /// Drawing calls between this and [`end_mask_fill`](Self::end_mask_fill)
    /// define mask coverage instead of producing color output. Clip tests
    /// are suspended while the mask is being filled.
    fn begin_mask_fill(&mut self, region: Rect);

    /// Finish the mask fill and return to color rendering
    fn end_mask_fill(&mut self);

    /// Set the identifier drawn in place of color output
    ///
    /// Picking passes set this before re-issuing geometry so that hit
    /// testing can read back which node covers a pixel. Pass `None` to
    /// return to normal color output. The value participates in the
    /// attribute state stack.
    fn set_pick_id(&mut self, id: Option<PickId>);

    /// Set the flat color applied to subsequent quad draws
    ///
    /// The value participates in the attribute state stack.
    fn set_color(&mut self, color: [f32; 4]);

    /// Fill the whole surface with a color, ignoring the clip stack
    fn clear(&mut self, color: [f32; 4]) -> RenderResult<()>;

    /// Draw an axis-aligned rectangle in surface coordinates
    fn draw_quad(&mut self, rect: Rect) -> RenderResult<()>;

    /// Draw indexed triangle geometry under the current transform
    fn draw_mesh(&mut self, mesh: &Mesh) -> RenderResult<()>;

    /// Compile a shading program and return a handle to it
    fn compile_program(&mut self, descriptor: &ProgramDescriptor) -> RenderResult<ProgramId>;

    /// Destroy a compiled program
    ///
    /// Destroying an unknown handle is a no-op.
    fn destroy_program(&mut self, id: ProgramId);

    /// Make a compiled program current for subsequent draws
    fn bind_program(&mut self, id: ProgramId) -> RenderResult<()>;

    /// Allocate an offscreen color buffer
    fn create_offscreen(&mut self, width: u32, height: u32) -> RenderResult<OffscreenId>;

    /// Resize an offscreen buffer, discarding its contents
    fn resize_offscreen(&mut self, id: OffscreenId, width: u32, height: u32) -> RenderResult<()>;

    /// Release an offscreen buffer
    ///
    /// Releasing an unknown handle is a no-op.
    fn release_offscreen(&mut self, id: OffscreenId);

    /// Copy the current surface contents into an offscreen buffer
    fn snapshot_to_offscreen(&mut self, id: OffscreenId) -> RenderResult<()>;

    /// Composite an offscreen buffer over the surface at the given opacity
    ///
    /// `alpha` is clamped to `[0, 1]`, where 1.0 fully covers the surface.
    fn blend_offscreen(&mut self, id: OffscreenId, alpha: f32) -> RenderResult<()>;
}
