//! Scene root
//!
//! The scene owns the top-level render list and decides whether a frame
//! needs to be drawn at all: render is a no-op unless something in the
//! subtree is dirty. Callers invoke `render` every frame and let the
//! scene suppress the redundant ones.

use crate::foundation::geometry::Rect;
use crate::render::surface::DrawingSurface;
use crate::render::RenderResult;
use crate::scene::clip::{Clippable, DollyRef, TrackballRef};
use crate::scene::render_list::RenderList;
use crate::scene::renderable::{NodeRef, Pickable, Renderable, Resizeable};

/// Root node of a scene graph
pub struct Scene {
    list: RenderList,
    dirty: bool,
    bounds: Rect,
    background: Option<[f32; 4]>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with no background clear
    pub fn new() -> Self {
        Self {
            list: RenderList::new(),
            // Paint the first frame even if the graph is still empty.
            dirty: true,
            bounds: Rect::from_size(0.0, 0.0),
            background: None,
        }
    }

    /// Create an empty scene that clears to the given color each frame
    pub fn with_background(color: [f32; 4]) -> Self {
        let mut scene = Self::new();
        scene.background = Some(color);
        scene
    }

    /// Append a top-level node
    ///
    /// New nodes arrive dirty, so the next frame repaints.
    pub fn add(&mut self, child: NodeRef) {
        self.list.add(child);
    }

    /// Detach a top-level node by identity
    pub fn remove(&mut self, child: &NodeRef) -> bool {
        let removed = self.list.remove(child);
        if removed {
            // The vacated pixels must be repainted even if no child is dirty.
            self.dirty = true;
        }
        removed
    }

    /// Number of top-level nodes
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Layout bounds resolved at the last `do_layout`
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Change the background clear color, `None` to skip clearing
    pub fn set_background(&mut self, color: Option<[f32; 4]>) {
        if self.background != color {
            self.background = color;
            self.dirty = true;
        }
    }

    /// Clip the whole scene content to a region
    pub fn set_clip_region(&mut self, region: Option<Rect>) {
        self.list.set_clip_region(region);
    }

    /// Attach or detach a shared trackball across clip-capable content
    pub fn set_trackball(&mut self, trackball: Option<TrackballRef>) {
        self.list.set_trackball(trackball);
    }

    /// Attach or detach a shared dolly across clip-capable content
    pub fn set_dolly(&mut self, dolly: Option<DollyRef>) {
        self.list.set_dolly(dolly);
    }
}

impl Renderable for Scene {
    /// Draw the scene if anything in it needs drawing
    ///
    /// A clean scene issues no drawing calls at all. A dirty one clears
    /// the background when configured, renders the graph, and marks
    /// itself clean only after the whole pass succeeded, so a failed
    /// frame is retried on the next call.
    fn render(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.list.is_visible() {
            return Ok(());
        }
        if !self.is_dirty() {
            return Ok(());
        }

        if let Some(color) = self.background {
            surface.clear(color)?;
        }
        self.list.render(surface)?;

        self.dirty = false;
        Ok(())
    }

    fn release(&mut self, surface: &mut dyn DrawingSurface) {
        self.list.release(surface);
    }

    fn is_dirty(&self) -> bool {
        self.dirty || self.list.is_dirty()
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
        self.list.set_dirty(dirty);
    }

    fn is_visible(&self) -> bool {
        self.list.is_visible()
    }

    fn set_visible(&mut self, visible: bool) {
        if self.is_visible() != visible {
            self.list.set_visible(visible);
            self.dirty = true;
        }
    }

    fn as_clippable(&mut self) -> Option<&mut dyn Clippable> {
        self.list.as_clippable()
    }

    fn as_resizeable(&mut self) -> Option<&mut dyn Resizeable> {
        Some(self)
    }

    fn as_pickable(&mut self) -> Option<&mut dyn Pickable> {
        Some(self)
    }
}

impl Resizeable for Scene {
    /// Rebind the scene to the surface dimensions
    ///
    /// Must be called whenever the surface changes size. Marks the whole
    /// graph dirty and forwards layout to resize-aware nodes.
    fn do_layout(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        self.bounds = surface.extent().as_rect();
        self.dirty = true;
        self.list.set_dirty(true);
        self.list.do_layout(surface)
    }
}

impl Pickable for Scene {
    /// Run a pick pass over the scene without disturbing frame state
    fn render_pickable(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.list.is_visible() {
            return Ok(());
        }
        self.list.render_pickable(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{RecordingSurface, SurfaceOp};
    use crate::render::surface::PickId;
    use crate::scene::quad_node::QuadNode;
    use crate::scene::renderable::node_ref;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    fn two_leaf_scene() -> (Scene, NodeRef, NodeRef) {
        let mut scene = Scene::new();
        let red = node_ref(QuadNode::new(Rect::new(0.0, 0.0, 20.0, 20.0), RED));
        let blue = node_ref(QuadNode::new(Rect::new(30.0, 0.0, 20.0, 20.0), BLUE));
        scene.add(red.clone());
        scene.add(blue.clone());
        (scene, red, blue)
    }

    #[test]
    fn test_clean_scene_issues_no_drawing_calls() {
        let (mut scene, _red, _blue) = two_leaf_scene();
        let mut surface = RecordingSurface::new(640, 480);

        scene.render(&mut surface).unwrap();
        assert!(!surface.ops().is_empty());

        surface.clear_ops();
        scene.render(&mut surface).unwrap();
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_dirty_leaf_triggers_full_rerender() {
        let (mut scene, red, _blue) = two_leaf_scene();
        let mut surface = RecordingSurface::new(640, 480);

        scene.render(&mut surface).unwrap();
        surface.clear_ops();

        red.borrow_mut().set_dirty(true);
        assert!(scene.is_dirty());
        scene.render(&mut surface).unwrap();

        let rects: Vec<Rect> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Quad { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(
            rects,
            vec![
                Rect::new(0.0, 0.0, 20.0, 20.0),
                Rect::new(30.0, 0.0, 20.0, 20.0)
            ]
        );

        surface.clear_ops();
        scene.render(&mut surface).unwrap();
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_background_clears_before_content() {
        let mut scene = Scene::with_background([0.0, 0.0, 0.0, 1.0]);
        scene.add(node_ref(QuadNode::new(Rect::from_size(10.0, 10.0), RED)));
        let mut surface = RecordingSurface::new(640, 480);

        scene.render(&mut surface).unwrap();

        assert!(matches!(surface.ops()[0], SurfaceOp::Clear { .. }));
        assert!(matches!(surface.ops()[1], SurfaceOp::Quad { .. }));
    }

    #[test]
    fn test_layout_binds_bounds_and_forces_redraw() {
        let (mut scene, _red, _blue) = two_leaf_scene();
        let mut surface = RecordingSurface::new(640, 480);

        scene.render(&mut surface).unwrap();
        surface.clear_ops();

        surface.set_extent(800, 600);
        scene.do_layout(&mut surface).unwrap();

        assert_eq!(scene.bounds(), Rect::from_size(800.0, 600.0));
        assert!(scene.is_dirty());

        scene.render(&mut surface).unwrap();
        assert!(!surface.ops().is_empty());
    }

    #[test]
    fn test_pick_pass_leaves_frame_state_alone() {
        let mut scene = Scene::new();
        scene.add(node_ref(
            QuadNode::new(Rect::from_size(10.0, 10.0), RED).with_pick_id(PickId(3)),
        ));
        let mut surface = RecordingSurface::new(640, 480);

        scene.render(&mut surface).unwrap();
        assert!(!scene.is_dirty());
        surface.clear_ops();

        scene.render_pickable(&mut surface).unwrap();

        assert!(!scene.is_dirty());
        match surface.ops().last() {
            Some(SurfaceOp::Quad { pick, .. }) => assert_eq!(*pick, Some(PickId(3))),
            other => panic!("unexpected op {:?}", other),
        }

        surface.clear_ops();
        scene.render(&mut surface).unwrap();
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_hidden_scene_emits_nothing() {
        let (mut scene, _red, _blue) = two_leaf_scene();
        scene.set_visible(false);
        let mut surface = RecordingSurface::new(640, 480);

        scene.render(&mut surface).unwrap();

        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_removal_forces_repaint() {
        let (mut scene, red, _blue) = two_leaf_scene();
        let mut surface = RecordingSurface::new(640, 480);

        scene.render(&mut surface).unwrap();
        surface.clear_ops();

        assert!(scene.remove(&red));
        assert!(scene.is_dirty());

        scene.render(&mut surface).unwrap();
        let rects: Vec<Rect> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Quad { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects, vec![Rect::new(30.0, 0.0, 20.0, 20.0)]);
    }
}
