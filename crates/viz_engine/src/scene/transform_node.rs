//! Transform node
//!
//! Positions and orients a subtree. The node pushes its matrix onto the
//! surface, renders its children through an internal render list, and
//! restores the surface state whether or not the children succeeded.

use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::surface::DrawingSurface;
use crate::render::RenderResult;
use crate::scene::clip::Clippable;
use crate::scene::render_list::RenderList;
use crate::scene::renderable::{NodeRef, NodeState, Pickable, Renderable, Resizeable};

/// Node that applies a rigid transform to its children
pub struct TransformNode {
    state: NodeState,
    transform: Transform,
    children: RenderList,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformNode {
    /// Create a node at the identity transform
    pub fn new() -> Self {
        Self {
            state: NodeState::new(),
            transform: Transform::identity(),
            children: RenderList::new(),
        }
    }

    /// Create a node with an initial transform
    pub fn with_transform(transform: Transform) -> Self {
        Self {
            state: NodeState::new(),
            transform,
            children: RenderList::new(),
        }
    }

    /// Current transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the whole transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.state.set_dirty(true);
    }

    /// Current translation
    pub fn translation(&self) -> Vec3 {
        self.transform.translation
    }

    /// Replace the translation
    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform.translation = translation;
        self.state.set_dirty(true);
    }

    /// Shift the translation by a delta
    pub fn translate(&mut self, delta: Vec3) {
        self.transform.translation += delta;
        self.state.set_dirty(true);
    }

    /// Current rotation
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Replace the rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
        self.state.set_dirty(true);
    }

    /// Apply an incremental rotation on top of the current one
    ///
    /// Premultiplies, so the increment turns the already-oriented
    /// subtree. Applying a then b accumulates as `b * a`.
    pub fn rotate(&mut self, rotation: Quat) {
        self.transform.rotation = rotation * self.transform.rotation;
        self.state.set_dirty(true);
    }

    /// Append a child
    pub fn add(&mut self, child: NodeRef) {
        self.children.add(child);
    }

    /// Detach a child by identity
    pub fn remove(&mut self, child: &NodeRef) -> bool {
        self.children.remove(child)
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the node has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Renderable for TransformNode {
    fn render(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }

        surface.push_state();
        surface.apply_transform(&self.transform.to_matrix());
        let result = self.children.render(surface);
        surface.pop_state();
        result?;

        self.state.set_dirty(false);
        Ok(())
    }

    fn release(&mut self, surface: &mut dyn DrawingSurface) {
        self.children.release(surface);
    }

    fn is_dirty(&self) -> bool {
        self.state.dirty() || self.children.is_dirty()
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.state.set_dirty(dirty);
        self.children.set_dirty(dirty);
    }

    fn is_visible(&self) -> bool {
        self.state.visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.set_visible(visible);
    }

    fn as_clippable(&mut self) -> Option<&mut dyn Clippable> {
        self.children.as_clippable()
    }

    fn as_resizeable(&mut self) -> Option<&mut dyn Resizeable> {
        Some(self)
    }

    fn as_pickable(&mut self) -> Option<&mut dyn Pickable> {
        Some(self)
    }
}

impl Resizeable for TransformNode {
    fn do_layout(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        self.children.do_layout(surface)
    }
}

impl Pickable for TransformNode {
    fn render_pickable(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }

        surface.push_state();
        surface.apply_transform(&self.transform.to_matrix());
        let result = self.children.render_pickable(surface);
        surface.pop_state();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::geometry::Rect;
    use crate::foundation::math::constants::HALF_PI;
    use crate::render::recording::{RecordingSurface, SurfaceOp};
    use crate::render::{RenderError, RenderResult};
    use crate::scene::quad_node::QuadNode;
    use crate::scene::renderable::node_ref;

    const EPSILON: f32 = 1e-6;

    struct FailingNode {
        state: NodeState,
    }

    impl Renderable for FailingNode {
        fn render(&mut self, _surface: &mut dyn DrawingSurface) -> RenderResult<()> {
            Err(RenderError::RenderingFailed("intentional test failure".into()))
        }

        fn release(&mut self, _surface: &mut dyn DrawingSurface) {}

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
    }

    fn recorded_quad_transforms(surface: &RecordingSurface) -> Vec<crate::foundation::math::Mat4> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Quad { transform, .. } => Some(*transform),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_two_quarter_turns_compose_to_half_turn() {
        let mut node = TransformNode::new();

        node.rotate(Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI));
        node.rotate(Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI));

        let rotated = node.rotation() * Vec3::x();
        assert_relative_eq!(rotated, -Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_increments_premultiply() {
        let a = Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI);
        let b = Quat::from_axis_angle(&Vec3::x_axis(), HALF_PI);

        let mut node = TransformNode::new();
        node.rotate(a);
        node.rotate(b);

        let expected = b * a;
        let probe = Vec3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(node.rotation() * probe, expected * probe, epsilon = EPSILON);
    }

    #[test]
    fn test_render_applies_transform_to_children() {
        let mut node = TransformNode::new();
        node.set_translation(Vec3::new(5.0, 7.0, 0.0));
        node.add(node_ref(QuadNode::new(Rect::from_size(10.0, 10.0), [1.0; 4])));

        let mut surface = RecordingSurface::new(640, 480);
        node.render(&mut surface).unwrap();

        let transforms = recorded_quad_transforms(&surface);
        assert_relative_eq!(transforms[0], node.transform().to_matrix(), epsilon = EPSILON);
        assert!(surface.is_balanced());
    }

    #[test]
    fn test_transform_does_not_leak_to_siblings() {
        let mut parent = crate::scene::render_list::RenderList::new();
        let mut transformed = TransformNode::new();
        transformed.set_translation(Vec3::new(100.0, 0.0, 0.0));
        transformed.add(node_ref(QuadNode::new(Rect::from_size(10.0, 10.0), [1.0; 4])));
        parent.add(node_ref(transformed));
        parent.add(node_ref(QuadNode::new(Rect::from_size(20.0, 20.0), [1.0; 4])));

        let mut surface = RecordingSurface::new(640, 480);
        parent.render(&mut surface).unwrap();

        let transforms = recorded_quad_transforms(&surface);
        assert_relative_eq!(
            transforms[1],
            crate::foundation::math::Mat4::identity(),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_child_failure_still_restores_state() {
        let mut node = TransformNode::new();
        node.set_translation(Vec3::new(1.0, 2.0, 3.0));
        node.add(node_ref(FailingNode {
            state: NodeState::new(),
        }));

        let mut surface = RecordingSurface::new(640, 480);
        let result = node.render(&mut surface);

        assert!(result.is_err());
        assert_eq!(surface.state_depth(), 0);
        assert!(surface.is_balanced());
        // Never drew, so the node must still report dirty.
        assert!(node.is_dirty());
    }

    #[test]
    fn test_dirty_covers_own_motion_and_children() {
        let mut node = TransformNode::new();
        let child = node_ref(QuadNode::new(Rect::from_size(10.0, 10.0), [1.0; 4]));
        node.add(child.clone());

        let mut surface = RecordingSurface::new(640, 480);
        node.render(&mut surface).unwrap();
        assert!(!node.is_dirty());

        node.translate(Vec3::new(1.0, 0.0, 0.0));
        assert!(node.is_dirty());

        node.render(&mut surface).unwrap();
        assert!(!node.is_dirty());

        child.borrow_mut().set_dirty(true);
        assert!(node.is_dirty());
    }
}
