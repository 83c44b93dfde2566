//! Ordered composite node
//!
//! A `RenderList` draws its children in insertion order, so list position
//! is paint order: later children cover earlier ones. Capability calls
//! fan out to the children that support them, and dirtiness is derived
//! from the children rather than stored.

use std::rc::Rc;

use crate::foundation::geometry::Rect;
use crate::render::surface::DrawingSurface;
use crate::render::RenderResult;
use crate::scene::clip::{ClipState, Clippable, DollyRef, TrackballRef};
use crate::scene::renderable::{NodeRef, NodeState, Pickable, Renderable, Resizeable};

/// Ordered collection of scene nodes rendered as a unit
#[derive(Default)]
pub struct RenderList {
    state: NodeState,
    clip: ClipState,
    children: Vec<NodeRef>,
}

impl RenderList {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            state: NodeState::new(),
            clip: ClipState::new(),
            children: Vec::new(),
        }
    }

    /// Append a child, which will paint over all earlier children
    pub fn add(&mut self, child: NodeRef) {
        self.children.push(child);
    }

    /// Detach a child, comparing by node identity
    ///
    /// Returns whether the child was present. Remaining children are
    /// marked dirty so the vacated pixels get repainted.
    pub fn remove(&mut self, child: &NodeRef) -> bool {
        let before = self.children.len();
        self.children.retain(|existing| !Rc::ptr_eq(existing, child));
        let removed = before != self.children.len();

        if removed {
            self.mark_children_dirty();
        }
        removed
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the list has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn mark_children_dirty(&mut self) {
        for child in &self.children {
            child.borrow_mut().set_dirty(true);
        }
    }

    /// Draw every child in insertion order
    ///
    /// Traversal works on a snapshot of the child vector, so a child that
    /// mutates list membership while rendering cannot invalidate the
    /// iteration. The first failing child aborts the pass.
    fn render_children(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        let snapshot: Vec<NodeRef> = self.children.clone();
        for child in snapshot {
            child.borrow_mut().render(surface)?;
        }
        Ok(())
    }
}

impl Renderable for RenderList {
    /// Render the children, applying two-pass clipping when a region is set
    ///
    /// With an active clip region the children are drawn twice. The first
    /// pass fills the clip mask with clip enforcement switched off across
    /// the subtree, so nested regions cannot carve holes in their own
    /// mask. The second pass draws normally against the finished mask.
    /// The enforcement flag is restored before any error propagates.
    fn render(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }

        match self.clip.region() {
            Some(region) if self.clip.is_clipped() => {
                self.set_clipped(false);
                surface.begin_mask_fill(region);
                let mask_pass = self.render_children(surface);
                surface.end_mask_fill();
                self.set_clipped(true);
                mask_pass?;

                surface.push_clip(region);
                let main_pass = self.render_children(surface);
                surface.pop_clip();
                main_pass
            }
            _ => self.render_children(surface),
        }
    }

    fn release(&mut self, surface: &mut dyn DrawingSurface) {
        for child in &self.children {
            child.borrow_mut().release(surface);
        }
    }

    /// A list is dirty exactly when at least one child is
    ///
    /// An empty list is never dirty; there is nothing to repaint.
    fn is_dirty(&self) -> bool {
        self.children.iter().any(|child| child.borrow().is_dirty())
    }

    fn set_dirty(&mut self, dirty: bool) {
        for child in &self.children {
            child.borrow_mut().set_dirty(dirty);
        }
    }

    fn is_visible(&self) -> bool {
        self.state.visible()
    }

    fn set_visible(&mut self, visible: bool) {
        if self.state.visible() != visible {
            self.state.set_visible(visible);
            // The subtree's pixels changed either way; force a repaint.
            self.mark_children_dirty();
        }
    }

    fn as_clippable(&mut self) -> Option<&mut dyn Clippable> {
        Some(self)
    }

    fn as_resizeable(&mut self) -> Option<&mut dyn Resizeable> {
        Some(self)
    }

    fn as_pickable(&mut self) -> Option<&mut dyn Pickable> {
        Some(self)
    }
}

impl Clippable for RenderList {
    fn clip_region(&self) -> Option<Rect> {
        self.clip.region()
    }

    fn set_clip_region(&mut self, region: Option<Rect>) {
        self.clip.set_region(region);
        self.mark_children_dirty();
    }

    fn is_clipped(&self) -> bool {
        self.clip.is_clipped()
    }

    fn set_clipped(&mut self, clipped: bool) {
        self.clip.set_clipped(clipped);
        for child in &self.children {
            if let Some(clippable) = child.borrow_mut().as_clippable() {
                clippable.set_clipped(clipped);
            }
        }
    }

    fn set_trackball(&mut self, trackball: Option<TrackballRef>) {
        for child in &self.children {
            if let Some(clippable) = child.borrow_mut().as_clippable() {
                clippable.set_trackball(trackball.clone());
            }
        }
    }

    fn set_dolly(&mut self, dolly: Option<DollyRef>) {
        for child in &self.children {
            if let Some(clippable) = child.borrow_mut().as_clippable() {
                clippable.set_dolly(dolly.clone());
            }
        }
    }
}

impl Resizeable for RenderList {
    fn do_layout(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        let snapshot: Vec<NodeRef> = self.children.clone();
        for child in snapshot {
            let mut node = child.borrow_mut();
            if let Some(resizeable) = node.as_resizeable() {
                resizeable.do_layout(surface)?;
            }
        }
        Ok(())
    }
}

impl Pickable for RenderList {
    fn render_pickable(&mut self, surface: &mut dyn DrawingSurface) -> RenderResult<()> {
        if !self.state.visible() {
            return Ok(());
        }

        let clip = self.clip.region().filter(|_| self.clip.is_clipped());
        if let Some(region) = clip {
            surface.push_clip(region);
        }

        let snapshot: Vec<NodeRef> = self.children.clone();
        let mut result = Ok(());
        for child in snapshot {
            let mut node = child.borrow_mut();
            if let Some(pickable) = node.as_pickable() {
                result = pickable.render_pickable(surface);
                if result.is_err() {
                    break;
                }
            }
        }

        if clip.is_some() {
            surface.pop_clip();
        }
        result
    }
}
