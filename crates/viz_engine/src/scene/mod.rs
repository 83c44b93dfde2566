//! Retained scene graph
//!
//! Provides the node hierarchy an application builds once and mutates
//! incrementally. Rendering is dirty-driven: nodes flag themselves when
//! they change, and the scene redraws only when something actually did.
//!
//! ## Architecture
//!
//! ```text
//! Scene (root, dirty gate, background)
//!      ↓
//! RenderList (paint order, two-pass clipping)
//!      ↓
//! TransformNode / MeshNode / QuadNode / leaves
//! ```
//!
//! Capabilities beyond plain rendering (clipping, layout, picking) are
//! separate traits discovered at runtime through accessors on
//! [`Renderable`], so containers hold one node type and fan capability
//! calls out to whoever supports them.

pub mod clip;
pub mod mesh_node;
pub mod quad_node;
pub mod render_list;
pub mod renderable;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform_node;

pub use clip::{ClipState, Clippable, Dolly, DollyRef, Trackball, TrackballRef, ViewBinding};
pub use mesh_node::MeshNode;
pub use quad_node::QuadNode;
pub use render_list::RenderList;
pub use renderable::{node_ref, NodeRef, NodeState, Pickable, Renderable, Resizeable};
pub use scene::Scene;
pub use transform_node::TransformNode;
