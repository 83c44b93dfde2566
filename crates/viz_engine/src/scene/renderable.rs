//! Core node trait and shared node state
//!
//! Every object in the scene graph implements [`Renderable`]. Optional
//! capabilities (clipping, layout, picking) are separate traits reached
//! through runtime accessors, so containers can hold a single node type
//! and still fan capability calls out to the children that support them.

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

use crate::render::surface::DrawingSurface;
use crate::render::RenderResult;

bitflags! {
    /// Visibility and dirtiness bits shared by node implementations
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeState: u8 {
        /// Node takes part in rendering
        const VISIBLE = 1 << 0;
        /// Node changed since it was last drawn
        const DIRTY = 1 << 1;
    }
}

impl NodeState {
    /// State for a freshly created node
    ///
    /// Starts dirty to force the initial draw.
    pub fn new() -> Self {
        Self::VISIBLE | Self::DIRTY
    }

    /// Whether the node takes part in rendering
    pub fn visible(&self) -> bool {
        self.contains(Self::VISIBLE)
    }

    /// Whether the node changed since it was last drawn
    pub fn dirty(&self) -> bool {
        self.contains(Self::DIRTY)
    }

    /// Set or clear the dirty bit
    pub fn set_dirty(&mut self, dirty: bool) {
        self.set(Self::DIRTY, dirty);
    }

    /// Change visibility, marking the node dirty when it actually changes
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible() != visible {
            self.set(Self::VISIBLE, visible);
            self.insert(Self::DIRTY);
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, mutable reference to a scene node
///
/// Nodes are single-threaded; containers and animators share them through
/// reference counting and interior mutability.
pub type NodeRef = Rc<RefCell<dyn Renderable>>;

/// Wrap a node for insertion into the scene graph
pub fn node_ref<T: Renderable + 'static>(node: T) -> NodeRef {
    Rc::new(RefCell::new(node))
}

/// Base trait for every object in the scene graph
///
/// # Resource lifetime
/// Surface resources a node holds (compiled programs, offscreen buffers)
/// are freed only by [`release`](Self::release). Dropping a node without
/// releasing it leaks those resources; there is no implicit cleanup,
/// because freeing them requires the surface. Release is safe to call
/// more than once.
pub trait Renderable {
    /// Draw this node and any children onto the surface
    ///
    /// Implementations skip all work while invisible and leave the
    /// surface state exactly as they found it, on success and on error.
    fn render(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()>;

    /// Free surface resources held by this node and its children
    fn release(&mut self, surface: &mut dyn DrawingSurface);

    /// Whether this node needs to be drawn again
    fn is_dirty(&self) -> bool;

    /// Propagate a dirty flag change
    ///
    /// Containers forward the flag to all children.
    fn set_dirty(&mut self, dirty: bool);

    /// Whether this node takes part in rendering
    fn is_visible(&self) -> bool;

    /// Show or hide this node
    ///
    /// A change in visibility changes the rendered output, so it marks
    /// the node dirty.
    fn set_visible(&mut self, visible: bool);

    /// Access the clipping capability, if this node supports it
    fn as_clippable(&mut self) -> Option<&mut dyn crate::scene::clip::Clippable> {
        None
    }

    /// Access the layout capability, if this node supports it
    fn as_resizeable(&mut self) -> Option<&mut dyn Resizeable> {
        None
    }

    /// Access the picking capability, if this node supports it
    fn as_pickable(&mut self) -> Option<&mut dyn Pickable> {
        None
    }
}

/// Capability for nodes that recompute geometry from surface dimensions
pub trait Resizeable {
    /// Recompute layout for the current surface dimensions
    ///
    /// Called whenever the surface changes size, before the next render.
    fn do_layout(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()>;
}

/// Capability for nodes that participate in pick rendering
pub trait Pickable {
    /// Re-issue this node's geometry with its pick identifier
    ///
    /// Runs the same drawing calls as a normal render but with a pick id
    /// active, so hit testing can read back node identity per pixel. Must
    /// not change any node state, dirty and visibility flags included.
    fn render_pickable(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()>;
}
