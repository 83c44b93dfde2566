//! Recording implementation of the drawing surface
//!
//! Records every drawing call instead of rasterizing, tracking the same
//! transform, clip, and attribute state a GPU backend would. Tests and
//! headless runs inspect the recorded operations to verify what the scene
//! graph actually emitted. No real graphics API is involved.

use std::collections::HashMap;

use crate::foundation::geometry::Rect;
use crate::foundation::math::Mat4;
use crate::render::mesh::Mesh;
use crate::render::program::ProgramDescriptor;
use crate::render::surface::{DrawingSurface, OffscreenId, PickId, ProgramId, SurfaceExtent};
use crate::render::{RenderError, RenderResult};

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// Full-surface clear
    Clear {
        /// Clear color
        color: [f32; 4],
    },
    /// Rectangle draw
    Quad {
        /// Rectangle as submitted
        rect: Rect,
        /// Pixels actually touched after clipping, `None` if fully clipped
        effective: Option<Rect>,
        /// Flat color active at submission
        color: [f32; 4],
        /// Transform current at submission
        transform: Mat4,
        /// Program bound at submission
        program: Option<ProgramId>,
        /// Pick identifier active at submission
        pick: Option<PickId>,
        /// Whether the draw fed the clip mask instead of color output
        mask_fill: bool,
    },
    /// Mesh draw
    Mesh {
        /// Triangle count of the submitted mesh
        triangles: u32,
        /// Transform current at submission
        transform: Mat4,
        /// Program bound at submission
        program: Option<ProgramId>,
        /// Pick identifier active at submission
        pick: Option<PickId>,
        /// Whether the draw fed the clip mask instead of color output
        mask_fill: bool,
    },
    /// Surface contents copied into an offscreen buffer
    Snapshot {
        /// Destination buffer
        target: OffscreenId,
    },
    /// Offscreen buffer composited over the surface
    Blend {
        /// Source buffer
        target: OffscreenId,
        /// Opacity after clamping
        alpha: f32,
    },
}

#[derive(Debug, Clone)]
struct AttributeState {
    transform: Mat4,
    pick: Option<PickId>,
    program: Option<ProgramId>,
    color: [f32; 4],
}

impl Default for AttributeState {
    fn default() -> Self {
        Self {
            transform: Mat4::identity(),
            pick: None,
            program: None,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Drawing surface that records operations for inspection
pub struct RecordingSurface {
    extent: SurfaceExtent,
    ops: Vec<SurfaceOp>,
    state: AttributeState,
    saved: Vec<AttributeState>,
    clip_stack: Vec<Rect>,
    mask_region: Option<Rect>,
    programs: HashMap<ProgramId, String>,
    next_program: u64,
    offscreens: HashMap<OffscreenId, (u32, u32)>,
    next_offscreen: u64,
    fail_compiles: bool,
    unbalanced: bool,
}

impl RecordingSurface {
    /// Create a surface with the given pixel dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            extent: SurfaceExtent::new(width, height),
            ops: Vec::new(),
            state: AttributeState::default(),
            saved: Vec::new(),
            clip_stack: Vec::new(),
            mask_region: None,
            programs: HashMap::new(),
            next_program: 1,
            offscreens: HashMap::new(),
            next_offscreen: 1,
            fail_compiles: false,
            unbalanced: false,
        }
    }

    /// Change the surface dimensions, simulating a window resize
    pub fn set_extent(&mut self, width: u32, height: u32) {
        self.extent = SurfaceExtent::new(width, height);
    }

    /// All operations recorded so far
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Discard the recorded operations, keeping resources and state
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Effective rectangles of color-producing quad draws
    ///
    /// Mask-fill draws, pick passes, and fully clipped quads are skipped,
    /// leaving exactly the pixels a rasterizer would have colored.
    pub fn color_footprints(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Quad {
                    effective: Some(effective),
                    pick: None,
                    mask_fill: false,
                    ..
                } => Some(*effective),
                _ => None,
            })
            .collect()
    }

    /// Whether every push was matched by a pop and nothing underflowed
    pub fn is_balanced(&self) -> bool {
        self.saved.is_empty()
            && self.clip_stack.is_empty()
            && self.mask_region.is_none()
            && !self.unbalanced
    }

    /// Depth of the saved attribute state stack
    pub fn state_depth(&self) -> usize {
        self.saved.len()
    }

    /// Depth of the clip region stack
    pub fn clip_depth(&self) -> usize {
        self.clip_stack.len()
    }

    /// Number of programs currently compiled
    pub fn compiled_program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of offscreen buffers currently allocated
    pub fn live_offscreen_count(&self) -> usize {
        self.offscreens.len()
    }

    /// Dimensions of an allocated offscreen buffer
    pub fn offscreen_size(&self, id: OffscreenId) -> Option<(u32, u32)> {
        self.offscreens.get(&id).copied()
    }

    /// Make subsequent program compilation fail
    pub fn set_fail_compiles(&mut self, fail: bool) {
        self.fail_compiles = fail;
    }

    /// Intersection of the active clip stack applied to a rectangle
    fn clip_to_stack(&self, rect: Rect) -> Option<Rect> {
        let clipped = self
            .clip_stack
            .iter()
            .fold(rect, |acc, region| acc.intersection(region));

        if clipped.is_empty() && !self.clip_stack.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }

    fn effective_quad(&self, rect: Rect) -> Option<Rect> {
        if self.mask_region.is_some() {
            // Clip tests are suspended while the mask is being filled.
            Some(rect)
        } else {
            self.clip_to_stack(rect)
        }
    }
}

impl DrawingSurface for RecordingSurface {
    fn extent(&self) -> SurfaceExtent {
        self.extent
    }

    fn push_state(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn pop_state(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        } else {
            log::error!("pop_state without matching push_state");
            self.unbalanced = true;
        }
    }

    fn apply_transform(&mut self, transform: &Mat4) {
        self.state.transform *= transform;
    }

    fn push_clip(&mut self, region: Rect) {
        self.clip_stack.push(region);
    }

    fn pop_clip(&mut self) {
        if self.clip_stack.pop().is_none() {
            log::error!("pop_clip without matching push_clip");
            self.unbalanced = true;
        }
    }

    fn begin_mask_fill(&mut self, region: Rect) {
        if self.mask_region.is_some() {
            log::warn!("begin_mask_fill while a mask fill is already active");
        }
        self.mask_region = Some(region);
    }

    fn end_mask_fill(&mut self) {
        if self.mask_region.take().is_none() {
            log::error!("end_mask_fill without matching begin_mask_fill");
            self.unbalanced = true;
        }
    }

    fn set_pick_id(&mut self, id: Option<PickId>) {
        self.state.pick = id;
    }

    fn set_color(&mut self, color: [f32; 4]) {
        self.state.color = color;
    }

    fn clear(&mut self, color: [f32; 4]) -> RenderResult<()> {
        self.ops.push(SurfaceOp::Clear { color });
        Ok(())
    }

    fn draw_quad(&mut self, rect: Rect) -> RenderResult<()> {
        self.ops.push(SurfaceOp::Quad {
            rect,
            effective: self.effective_quad(rect),
            color: self.state.color,
            transform: self.state.transform,
            program: self.state.program,
            pick: self.state.pick,
            mask_fill: self.mask_region.is_some(),
        });
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: &Mesh) -> RenderResult<()> {
        self.ops.push(SurfaceOp::Mesh {
            triangles: mesh.triangle_count() as u32,
            transform: self.state.transform,
            program: self.state.program,
            pick: self.state.pick,
            mask_fill: self.mask_region.is_some(),
        });
        Ok(())
    }

    fn compile_program(&mut self, descriptor: &ProgramDescriptor) -> RenderResult<ProgramId> {
        if self.fail_compiles {
            return Err(RenderError::ResourceCreationFailed(format!(
                "compilation of '{}' rejected",
                descriptor.name
            )));
        }

        let id = ProgramId(self.next_program);
        self.next_program += 1;
        self.programs.insert(id, descriptor.name.clone());
        Ok(id)
    }

    fn destroy_program(&mut self, id: ProgramId) {
        if self.programs.remove(&id).is_none() {
            log::trace!("destroy_program for unknown {:?}", id);
        }
    }

    fn bind_program(&mut self, id: ProgramId) -> RenderResult<()> {
        if !self.programs.contains_key(&id) {
            return Err(RenderError::BackendError(format!(
                "bind of unknown program {:?}",
                id
            )));
        }
        self.state.program = Some(id);
        Ok(())
    }

    fn create_offscreen(&mut self, width: u32, height: u32) -> RenderResult<OffscreenId> {
        let id = OffscreenId(self.next_offscreen);
        self.next_offscreen += 1;
        self.offscreens.insert(id, (width, height));
        Ok(id)
    }

    fn resize_offscreen(&mut self, id: OffscreenId, width: u32, height: u32) -> RenderResult<()> {
        match self.offscreens.get_mut(&id) {
            Some(size) => {
                *size = (width, height);
                Ok(())
            }
            None => Err(RenderError::BackendError(format!(
                "resize of unknown offscreen {:?}",
                id
            ))),
        }
    }

    fn release_offscreen(&mut self, id: OffscreenId) {
        if self.offscreens.remove(&id).is_none() {
            log::trace!("release_offscreen for unknown {:?}", id);
        }
    }

    fn snapshot_to_offscreen(&mut self, id: OffscreenId) -> RenderResult<()> {
        if !self.offscreens.contains_key(&id) {
            return Err(RenderError::BackendError(format!(
                "snapshot to unknown offscreen {:?}",
                id
            )));
        }
        self.ops.push(SurfaceOp::Snapshot { target: id });
        Ok(())
    }

    fn blend_offscreen(&mut self, id: OffscreenId, alpha: f32) -> RenderResult<()> {
        if !self.offscreens.contains_key(&id) {
            return Err(RenderError::BackendError(format!(
                "blend of unknown offscreen {:?}",
                id
            )));
        }
        self.ops.push(SurfaceOp::Blend {
            target: id,
            alpha: alpha.clamp(0.0, 1.0),
        });
        Ok(())
    }
}
