//! Mesh leaf node
//!
//! Draws a mesh with a shading program acquired from the shared program
//! registry. Acquisition happens lazily on first render; a node that
//! cannot get its program renders nothing, stays dirty, and retries on
//! the next frame instead of failing the whole pass.

use crate::foundation::geometry::Rect;
use crate::render::mesh::Mesh;
use crate::render::program::{ProgramDescriptor, ProgramHandle, SharedProgramRegistry};
use crate::render::surface::{DrawingSurface, PickId, ProgramId};
use crate::render::{RenderError, RenderResult};
use crate::scene::clip::{ClipState, Clippable, DollyRef, TrackballRef, ViewBinding};
use crate::scene::renderable::{NodeState, Pickable, Renderable};

/// Leaf node rendering a mesh through a registry-managed program
pub struct MeshNode {
    state: NodeState,
    mesh: Mesh,
    descriptor: ProgramDescriptor,
    registry: SharedProgramRegistry,
    program: Option<ProgramHandle>,
    pick_id: Option<PickId>,
    view: ViewBinding,
    clip: ClipState,
}

impl MeshNode {
    /// Create a mesh node shading with the given program descriptor
    pub fn new(mesh: Mesh, descriptor: ProgramDescriptor, registry: SharedProgramRegistry) -> Self {
        Self {
            state: NodeState::new(),
            mesh,
            descriptor,
            registry,
            program: None,
            pick_id: None,
            view: ViewBinding::default(),
            clip: ClipState::new(),
        }
    }

    /// Give the node a pick identity
    pub fn with_pick_id(mut self, id: PickId) -> Self {
        self.pick_id = Some(id);
        self
    }

    /// Geometry this node draws
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Replace the geometry
    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = mesh;
        self.state.set_dirty(true);
    }

    /// Resolve the backend program, acquiring from the registry if needed
    fn ensure_program(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<ProgramId> {
        if let Some(handle) = self.program {
            if let Some(id) = self.registry.borrow().program_id(handle) {
                return Ok(id);
            }
            // Handle went stale; acquire a fresh one below.
            self.program = None;
        }

        let handle = self.registry.borrow_mut().acquire(&self.descriptor, surface)?;
        self.program = Some(handle);
        self.registry.borrow().program_id(handle).ok_or_else(|| {
            RenderError::ResourceCreationFailed(format!(
                "program '{}' missing right after acquire",
                self.descriptor.name
            ))
        })
    }

    fn draw_content(&mut self, program: ProgramId, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        surface.apply_transform(&self.view.compose());

        let clip = self.clip.region().filter(|_| self.clip.is_clipped());
        if let Some(region) = clip {
            surface.push_clip(region);
        }
        let result = surface
            .bind_program(program)
            .and_then(|()| surface.draw_mesh(&self.mesh));
        if clip.is_some() {
            surface.pop_clip();
        }
        result
    }
}

impl Renderable for MeshNode {
    fn render(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }

        let program = match self.ensure_program(surface) {
            Ok(id) => id,
            Err(error) => {
                log::warn!(
                    "Mesh node with program '{}' rendering degraded, no draw: {}",
                    self.descriptor.name,
                    error
                );
                // Stay dirty so the next frame retries acquisition.
                return Ok(());
            }
        };

        surface.push_state();
        let result = self.draw_content(program, surface);
        surface.pop_state();
        result?;

        self.state.set_dirty(false);
        Ok(())
    }

    fn release(&mut self, surface: &mut dyn DrawingSurface) {
        if let Some(handle) = self.program.take() {
            self.registry.borrow_mut().release(handle, surface);
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

    fn as_clippable(&mut self) -> Option<&mut dyn Clippable> {
        Some(self)
    }

    fn as_pickable(&mut self) -> Option<&mut dyn Pickable> {
        if self.pick_id.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Clippable for MeshNode {
    fn clip_region(&self) -> Option<Rect> {
        self.clip.region()
    }

    fn set_clip_region(&mut self, region: Option<Rect>) {
        self.clip.set_region(region);
        self.state.set_dirty(true);
    }

    fn is_clipped(&self) -> bool {
        self.clip.is_clipped()
    }

    fn set_clipped(&mut self, clipped: bool) {
        self.clip.set_clipped(clipped);
    }

    fn set_trackball(&mut self, trackball: Option<TrackballRef>) {
        self.view.trackball = trackball;
        self.state.set_dirty(true);
    }

    fn set_dolly(&mut self, dolly: Option<DollyRef>) {
        self.view.dolly = dolly;
        self.state.set_dirty(true);
    }
}

impl Pickable for MeshNode {
    fn render_pickable(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }
        let Some(id) = self.pick_id else {
            return Ok(());
        };

        surface.push_state();
        surface.apply_transform(&self.view.compose());
        surface.set_pick_id(Some(id));
        let result = surface.draw_mesh(&self.mesh);
        surface.pop_state();
        result
    }
}
