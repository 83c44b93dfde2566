//! Flat colored rectangle leaf
//!
//! The simplest drawable node: a fixed rectangle in surface coordinates
//! with a flat color. Used for overlay panels and as the workhorse leaf
//! in rendering tests.

use crate::render::surface::{DrawingSurface, PickId};
use crate::render::RenderResult;
use crate::foundation::geometry::Rect;
use crate::scene::renderable::{NodeState, Pickable, Renderable};

/// Colored rectangle leaf node
#[derive(Debug, Clone)]
pub struct QuadNode {
    state: NodeState,
    rect: Rect,
    color: [f32; 4],
    pick_id: Option<PickId>,
}

impl QuadNode {
    /// Create a quad covering `rect` with the given color
    pub fn new(rect: Rect, color: [f32; 4]) -> Self {
        Self {
            state: NodeState::new(),
            rect,
            color,
            pick_id: None,
        }
    }

    /// Give the quad a pick identity
    pub fn with_pick_id(mut self, id: PickId) -> Self {
        self.pick_id = Some(id);
        self
    }

    /// Rectangle this quad covers
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Move or resize the quad
    pub fn set_rect(&mut self, rect: Rect) {
        if self.rect != rect {
            self.rect = rect;
            self.state.set_dirty(true);
        }
    }

    /// Current fill color
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Change the fill color
    pub fn set_color(&mut self, color: [f32; 4]) {
        if self.color != color {
            self.color = color;
            self.state.set_dirty(true);
        }
    }
}

impl Renderable for QuadNode {
    fn render(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }

        surface.push_state();
        surface.set_color(self.color);
        let result = surface.draw_quad(self.rect);
        surface.pop_state();
        result?;

        self.state.set_dirty(false);
        Ok(())
    }

    fn release(&mut self, _surface: &mut dyn DrawingSurface) {
        // Holds no surface resources.
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

    fn as_pickable(&mut self) -> Option<&mut dyn Pickable> {
        if self.pick_id.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Pickable for QuadNode {
    fn render_pickable(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }
        let Some(id) = self.pick_id else {
            return Ok(());
        };

        surface.push_state();
        surface.set_pick_id(Some(id));
        let result = surface.draw_quad(self.rect);
        surface.pop_state();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{RecordingSurface, SurfaceOp};

    #[test]
    fn test_render_emits_colored_quad_and_clears_dirty() {
        let mut node = QuadNode::new(Rect::new(10.0, 10.0, 30.0, 20.0), [1.0, 0.0, 0.0, 1.0]);
        let mut surface = RecordingSurface::new(640, 480);

        assert!(node.is_dirty());
        node.render(&mut surface).unwrap();

        assert!(!node.is_dirty());
        assert!(surface.is_balanced());
        match &surface.ops()[0] {
            SurfaceOp::Quad { rect, color, pick, .. } => {
                assert_eq!(*rect, Rect::new(10.0, 10.0, 30.0, 20.0));
                assert_eq!(*color, [1.0, 0.0, 0.0, 1.0]);
                assert!(pick.is_none());
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_hidden_quad_draws_nothing() {
        let mut node = QuadNode::new(Rect::from_size(10.0, 10.0), [1.0; 4]);
        let mut surface = RecordingSurface::new(640, 480);

        node.set_visible(false);
        node.render(&mut surface).unwrap();

        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_pick_pass_tags_geometry_without_touching_state() {
        let mut node = QuadNode::new(Rect::from_size(10.0, 10.0), [1.0; 4])
            .with_pick_id(PickId(7));
        let mut surface = RecordingSurface::new(640, 480);

        node.render(&mut surface).unwrap();
        assert!(!node.is_dirty());

        node.render_pickable(&mut surface).unwrap();

        assert!(!node.is_dirty());
        match surface.ops().last() {
            Some(SurfaceOp::Quad { pick, .. }) => assert_eq!(*pick, Some(PickId(7))),
            other => panic!("unexpected op {:?}", other),
        }
        assert!(surface.is_balanced());
    }

    #[test]
    fn test_quad_without_pick_id_is_not_pickable() {
        let mut node = QuadNode::new(Rect::from_size(10.0, 10.0), [1.0; 4]);

        assert!(node.as_pickable().is_none());
    }
}
