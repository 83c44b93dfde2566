//! Frame-driven animation subsystem
//!
//! Animators advance once per frame with the elapsed delta, write their
//! interpolated values into bound targets, and mark the affected nodes
//! dirty so the scene repaints. Ticking and drawing stay decoupled: an
//! animator never draws, it only moves values and raises dirty flags.
//!
//! Lifecycle is a one-way street from running to done. Completion and
//! cancellation both end in done; once there, an animator ignores
//! further advances and never touches its target again.

use std::cell::RefCell;
use std::rc::Rc;

pub mod float_animator;
pub mod screen_transition;

pub use float_animator::FloatAnimator;
pub use screen_transition::ScreenTransition;

/// Trait for objects advanced by the frame loop
pub trait Animator {
    /// Advance by the elapsed frame time in seconds
    ///
    /// Does nothing once the animator is done.
    fn advance_frame(&mut self, dt_seconds: f32);

    /// Whether the animator has finished or been cancelled
    ///
    /// Once true, stays true until an explicit restart.
    fn is_animation_done(&self) -> bool;

    /// Stop the animation where it stands
    ///
    /// The animated value stays frozen at whatever it last was; it does
    /// not jump to the end.
    fn cancel_animation(&mut self);
}

/// Shared, mutable reference to an animator
pub type AnimatorRef = Rc<RefCell<dyn Animator>>;

/// Wrap an animator for spawning into an [`AnimationSet`]
pub fn animator_ref<T: Animator + 'static>(animator: T) -> AnimatorRef {
    Rc::new(RefCell::new(animator))
}

/// Easing curve applied to animation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed
    Linear,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Slow start and end, fast middle
    EaseInOut,
}

impl Easing {
    /// Evaluate the curve at progress `t` in `[0, 1]`
    pub fn evaluate(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Collection of active animators advanced together each frame
///
/// Finished animators are detached automatically after the advance that
/// completed them; the set only ever holds running work.
#[derive(Default)]
pub struct AnimationSet {
    animators: Vec<AnimatorRef>,
}

impl AnimationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an animator to the frame loop
    pub fn spawn(&mut self, animator: AnimatorRef) {
        self.animators.push(animator);
        log::debug!("Animator spawned, {} active", self.animators.len());
    }

    /// Advance every attached animator and detach the finished ones
    pub fn advance_all(&mut self, dt_seconds: f32) {
        for animator in &self.animators {
            animator.borrow_mut().advance_frame(dt_seconds);
        }

        let before = self.animators.len();
        self.animators
            .retain(|animator| !animator.borrow().is_animation_done());
        let finished = before - self.animators.len();
        if finished > 0 {
            log::trace!(
                "Detached {} finished animator(s), {} still active",
                finished,
                self.animators.len()
            );
        }
    }

    /// Cancel every attached animator and detach them all
    pub fn cancel_all(&mut self) {
        for animator in &self.animators {
            animator.borrow_mut().cancel_animation();
        }
        self.animators.clear();
    }

    /// Number of running animators
    pub fn len(&self) -> usize {
        self.animators.len()
    }

    /// Whether no animators are running
    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }
}
