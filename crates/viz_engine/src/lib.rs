//! # Viz Engine
//!
//! A retained-mode scene graph engine for real-time visualization surfaces.
//!
//! ## Features
//!
//! - **Dirty-Driven Rendering**: frames draw only when something changed
//! - **Two-Pass Clipping**: mask fill then clipped draw, per subtree
//! - **Surface Abstraction**: the same scene renders to a GPU surface or
//!   a recording surface for tests and headless runs
//! - **Typed Update Queue**: cross-thread notifications drained per frame
//! - **Declarative Models**: RON descriptors instantiated into node subtrees
//! - **Frame Animation**: bound-parameter animators and screen crossfades
//!
//! ## Quick Start
//!
//! ```rust
//! use viz_engine::prelude::*;
//!
//! let mut surface = RecordingSurface::new(640, 480);
//!
//! let mut scene = Scene::with_background([0.08, 0.09, 0.11, 1.0]);
//! scene.add(node_ref(QuadNode::new(
//!     Rect::new(20.0, 20.0, 200.0, 120.0),
//!     [0.9, 0.3, 0.2, 1.0],
//! )));
//!
//! let mut driver = FrameDriver::new();
//! let stats = driver.step(1.0 / 60.0, &mut scene, &mut surface, None)?;
//! assert!(stats.rendered);
//!
//! // Nothing changed, so the next frame draws nothing.
//! let stats = driver.step(1.0 / 60.0, &mut scene, &mut surface, None)?;
//! assert!(!stats.rendered);
//! # Ok::<(), viz_engine::render::RenderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;

mod config;
mod driver;

pub use config::{Config, ConfigError, ViewerConfig};
pub use driver::{FrameDriver, FrameStats};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{
            animator_ref, AnimationSet, Animator, AnimatorRef, Easing, FloatAnimator,
            ScreenTransition,
        },
        assets::{
            instantiate, DescriptorError, DescriptorLoader, MeshDescriptor, ModelDescriptor,
            TransformDescriptor,
        },
        events::{UpdateError, UpdateEvent, UpdateListener, UpdatePayload, UpdateQueue},
        foundation::{
            geometry::Rect,
            math::{Mat4, Quat, Transform, Vec2, Vec3},
            time::FrameClock,
        },
        render::{
            DrawingSurface, Mesh, PickId, ProgramDescriptor, ProgramRegistry, RecordingSurface,
            RenderError, RenderResult, SharedProgramRegistry, SurfaceExtent, SurfaceOp, Vertex,
        },
        scene::{
            node_ref, Clippable, Dolly, DollyRef, MeshNode, NodeRef, Pickable, QuadNode,
            RenderList, Renderable, Resizeable, Scene, Trackball, TrackballRef, TransformNode,
        },
        Config, ConfigError, FrameDriver, FrameStats, ViewerConfig,
    };
}
