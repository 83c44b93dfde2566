//! Bound-parameter animator
//!
//! Interpolates one `f32` between two endpoints over a fixed duration,
//! writing each sample through an optional shared binding and flagging
//! dependent nodes dirty so the scene repaints. An animator with no
//! binding still advances, which makes it usable as a bare frame timer.

use std::cell::Cell;
use std::rc::Rc;

use crate::animation::{Animator, Easing};
use crate::foundation::math::utils;
use crate::scene::renderable::NodeRef;

/// Animates a single `f32` parameter from a start to an end value
///
/// The animated value is observable two ways: through [`value`](Self::value)
/// and through the shared [`Cell`] binding, written on every advance while
/// the animation runs. Completion and cancellation both stop the writes;
/// the last written value stays put either way.
pub struct FloatAnimator {
    start: f32,
    end: f32,
    duration: f32,
    elapsed: f32,
    value: f32,
    done: bool,
    cancelled: bool,
    easing: Easing,
    binding: Option<Rc<Cell<f32>>>,
    invalidates: Vec<NodeRef>,
}

impl FloatAnimator {
    /// Create an animator running from `start` to `end` over `duration_seconds`
    ///
    /// A duration of zero or less completes on the first advance with the
    /// value snapped to `end`, so the binding still receives exactly one
    /// write.
    pub fn new(start: f32, end: f32, duration_seconds: f32) -> Self {
        Self {
            start,
            end,
            duration: duration_seconds,
            elapsed: 0.0,
            value: start,
            done: false,
            cancelled: false,
            easing: Easing::Linear,
            binding: None,
            invalidates: Vec::new(),
        }
    }

    /// Write each interpolated sample into a shared cell
    pub fn with_binding(mut self, binding: Rc<Cell<f32>>) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Shape the interpolation with an easing curve
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Mark a node dirty on every advance while the animation runs
    ///
    /// May be chained to invalidate several nodes.
    pub fn invalidating(mut self, node: NodeRef) -> Self {
        self.invalidates.push(node);
        self
    }

    /// Current interpolated value
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Progress ratio in `[0, 1]`, where 1 is the end of the animation
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            utils::clamp(self.elapsed / self.duration, 0.0, 1.0)
        }
    }

    /// Whether the animation was ended early by cancellation
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Re-arm a finished animator with fresh endpoints and duration
    ///
    /// This is the one transition out of the done state. The binding and
    /// invalidation targets are kept.
    pub fn restart(&mut self, start: f32, end: f32, duration_seconds: f32) {
        self.start = start;
        self.end = end;
        self.duration = duration_seconds;
        self.elapsed = 0.0;
        self.value = start;
        self.done = false;
        self.cancelled = false;
    }
}

impl Animator for FloatAnimator {
    fn advance_frame(&mut self, dt_seconds: f32) {
        if self.done {
            return;
        }

        self.elapsed += dt_seconds;
        if self.elapsed >= self.duration {
            self.done = true;
        }

        self.value = utils::lerp(self.start, self.end, self.easing.evaluate(self.progress()));
        if let Some(binding) = &self.binding {
            binding.set(self.value);
        }
        for node in &self.invalidates {
            node.borrow_mut().set_dirty(true);
        }
    }

    fn is_animation_done(&self) -> bool {
        self.done
    }

    fn cancel_animation(&mut self) {
        if !self.done {
            self.cancelled = true;
            self.done = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::geometry::Rect;
    use crate::scene::quad_node::QuadNode;
    use crate::scene::renderable::node_ref;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_done_only_after_full_duration() {
        let mut animator = FloatAnimator::new(0.0, 10.0, 1.0);

        animator.advance_frame(0.25);
        animator.advance_frame(0.25);
        animator.advance_frame(0.25);
        assert!(!animator.is_animation_done());
        assert_relative_eq!(animator.value(), 7.5, epsilon = EPSILON);

        animator.advance_frame(0.25);
        assert!(animator.is_animation_done());
        assert_relative_eq!(animator.value(), 10.0, epsilon = EPSILON);

        // Done is terminal; further advances change nothing.
        animator.advance_frame(5.0);
        assert!(animator.is_animation_done());
        assert_relative_eq!(animator.value(), 10.0, epsilon = EPSILON);
    }

    #[test]
    fn test_overshoot_clamps_to_end() {
        let mut animator = FloatAnimator::new(2.0, 4.0, 0.5);

        animator.advance_frame(10.0);

        assert!(animator.is_animation_done());
        assert_relative_eq!(animator.value(), 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_binding_receives_each_sample() {
        let target = Rc::new(Cell::new(0.0_f32));
        let mut animator = FloatAnimator::new(0.0, 100.0, 1.0).with_binding(target.clone());

        animator.advance_frame(0.5);
        assert_relative_eq!(target.get(), 50.0, epsilon = EPSILON);

        animator.advance_frame(0.5);
        assert_relative_eq!(target.get(), 100.0, epsilon = EPSILON);
    }

    #[test]
    fn test_unbound_animator_still_advances() {
        let mut animator = FloatAnimator::new(0.0, 1.0, 0.2);

        animator.advance_frame(0.1);
        assert!(!animator.is_animation_done());
        animator.advance_frame(0.1);
        assert!(animator.is_animation_done());
    }

    #[test]
    fn test_cancel_freezes_value_and_binding() {
        let target = Rc::new(Cell::new(0.0_f32));
        let mut animator = FloatAnimator::new(0.0, 10.0, 1.0).with_binding(target.clone());

        animator.advance_frame(0.3);
        animator.cancel_animation();

        assert!(animator.is_animation_done());
        assert!(animator.is_cancelled());
        assert_relative_eq!(animator.value(), 3.0, epsilon = EPSILON);

        animator.advance_frame(0.7);
        assert_relative_eq!(animator.value(), 3.0, epsilon = EPSILON);
        assert_relative_eq!(target.get(), 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_zero_duration_completes_on_first_advance_with_one_write() {
        let target = Rc::new(Cell::new(-1.0_f32));
        let mut animator = FloatAnimator::new(0.0, 5.0, 0.0).with_binding(target.clone());

        assert!(!animator.is_animation_done());
        animator.advance_frame(0.016);

        assert!(animator.is_animation_done());
        assert_relative_eq!(target.get(), 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_negative_duration_behaves_like_zero() {
        let mut animator = FloatAnimator::new(0.0, 5.0, -2.0);

        animator.advance_frame(0.016);

        assert!(animator.is_animation_done());
        assert_relative_eq!(animator.value(), 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_restart_rearms_a_finished_animator() {
        let mut animator = FloatAnimator::new(0.0, 1.0, 0.1);
        animator.advance_frame(1.0);
        assert!(animator.is_animation_done());

        animator.restart(10.0, 20.0, 1.0);

        assert!(!animator.is_animation_done());
        assert_relative_eq!(animator.value(), 10.0, epsilon = EPSILON);
        animator.advance_frame(0.5);
        assert_relative_eq!(animator.value(), 15.0, epsilon = EPSILON);
    }

    #[test]
    fn test_advance_marks_dependent_nodes_dirty() {
        let node = node_ref(QuadNode::new(Rect::from_size(10.0, 10.0), [1.0; 4]));
        node.borrow_mut().set_dirty(false);
        let mut animator = FloatAnimator::new(0.0, 1.0, 1.0).invalidating(node.clone());

        animator.advance_frame(0.1);

        assert!(node.borrow().is_dirty());
    }

    #[test]
    fn test_easing_shapes_the_value() {
        let mut eased = FloatAnimator::new(0.0, 100.0, 1.0).with_easing(Easing::EaseIn);

        eased.advance_frame(0.5);

        assert_relative_eq!(eased.value(), 25.0, epsilon = EPSILON);
    }
}
