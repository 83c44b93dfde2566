//! Clipping capability and shared view manipulators
//!
//! Clip-capable nodes constrain their children to a rectangular region
//! using two-pass mask rendering, and accept shared trackball and dolly
//! manipulators so that one user gesture steers every view that opted in.

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::geometry::Rect;
use crate::foundation::math::{Mat4, Quat, Unit, Vec2, Vec3};
use crate::scene::renderable::Renderable;

/// Clip region and mode bits embedded in clip-capable nodes
#[derive(Debug, Clone)]
pub struct ClipState {
    region: Option<Rect>,
    clipped: bool,
}

impl Default for ClipState {
    fn default() -> Self {
        Self {
            region: None,
            // Clip tests are enforced except while a mask pass runs.
            clipped: true,
        }
    }
}

impl ClipState {
    /// Create a state with no clip region assigned
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigned clip region, if any
    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    /// Assign or remove the clip region
    pub fn set_region(&mut self, region: Option<Rect>) {
        self.region = region;
    }

    /// Whether clip tests are currently enforced
    pub fn is_clipped(&self) -> bool {
        self.clipped
    }

    /// Switch clip enforcement on or off
    pub fn set_clipped(&mut self, clipped: bool) {
        self.clipped = clipped;
    }

    /// Whether a region is assigned and enforcement is on
    pub fn is_active(&self) -> bool {
        self.region.is_some() && self.clipped
    }
}

/// Capability for nodes that clip their content to a rectangle
///
/// The `clipped` mode flag belongs to the render pass: the two-pass clip
/// renderer switches it off while filling the mask and back on for the
/// constrained pass, broadcasting the change through the subtree. Callers
/// configure clipping through the region alone and leave the flag to the
/// renderer.
pub trait Clippable: Renderable {
    /// Assigned clip region, if any
    fn clip_region(&self) -> Option<Rect>;

    /// Assign or remove the clip region
    ///
    /// Changing the region changes the rendered output, so the subtree is
    /// marked dirty.
    fn set_clip_region(&mut self, region: Option<Rect>);

    /// Whether clip tests are currently enforced
    fn is_clipped(&self) -> bool;

    /// Switch clip enforcement on or off, cascading to clip-capable children
    fn set_clipped(&mut self, clipped: bool);

    /// Attach or detach a shared trackball, cascading to clip-capable children
    fn set_trackball(&mut self, trackball: Option<TrackballRef>);

    /// Attach or detach a shared dolly, cascading to clip-capable children
    fn set_dolly(&mut self, dolly: Option<DollyRef>);
}

/// Shared handle to a trackball manipulator
pub type TrackballRef = Rc<RefCell<Trackball>>;

/// Orbit-style rotation manipulator
///
/// Accumulates incremental rotations by premultiplying, so each new
/// gesture rotates the already-oriented content rather than being folded
/// in underneath it.
#[derive(Debug, Clone)]
pub struct Trackball {
    rotation: Quat,
}

impl Default for Trackball {
    fn default() -> Self {
        Self::new()
    }
}

impl Trackball {
    /// Create a trackball at the identity orientation
    pub fn new() -> Self {
        Self {
            rotation: Quat::identity(),
        }
    }

    /// Create a trackball already wrapped for sharing between nodes
    pub fn new_shared() -> TrackballRef {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Current accumulated orientation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Replace the accumulated orientation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Apply an incremental rotation on top of the current orientation
    pub fn rotate_by(&mut self, rotation: Quat) {
        self.rotation = rotation * self.rotation;
    }

    /// Apply an incremental axis-angle rotation
    pub fn rotate(&mut self, axis: &Unit<Vec3>, angle: f32) {
        self.rotate_by(Quat::from_axis_angle(axis, angle));
    }

    /// Orientation as a homogeneous matrix
    pub fn to_matrix(&self) -> Mat4 {
        self.rotation.to_homogeneous()
    }
}

/// Shared handle to a dolly manipulator
pub type DollyRef = Rc<RefCell<Dolly>>;

/// Zoom and pan manipulator
#[derive(Debug, Clone)]
pub struct Dolly {
    zoom: f32,
    pan: Vec2,
}

impl Default for Dolly {
    fn default() -> Self {
        Self::new()
    }
}

impl Dolly {
    /// Smallest zoom factor the dolly will accept
    pub const MIN_ZOOM: f32 = 1e-3;

    /// Create a dolly at unit zoom with no pan
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::zeros(),
        }
    }

    /// Create a dolly already wrapped for sharing between nodes
    pub fn new_shared() -> DollyRef {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Replace the zoom factor, clamped away from zero
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(Self::MIN_ZOOM);
    }

    /// Scale the zoom factor
    pub fn zoom_by(&mut self, factor: f32) {
        self.set_zoom(self.zoom * factor);
    }

    /// Current pan offset
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Replace the pan offset
    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Shift the pan offset
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom and pan as a homogeneous matrix, zoom applied first
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&Vec3::new(self.pan.x, self.pan.y, 0.0))
            * Mat4::new_scaling(self.zoom)
    }
}

/// Manipulators a leaf applies when drawing its content
///
/// Leaves compose the dolly on top of the trackball, so content is
/// orbited first and the result is zoomed and panned in view space.
#[derive(Debug, Clone, Default)]
pub struct ViewBinding {
    /// Shared orbit rotation, if attached
    pub trackball: Option<TrackballRef>,
    /// Shared zoom and pan, if attached
    pub dolly: Option<DollyRef>,
}

impl ViewBinding {
    /// Combined view matrix of the attached manipulators
    pub fn compose(&self) -> Mat4 {
        let trackball = self
            .trackball
            .as_ref()
            .map_or_else(Mat4::identity, |t| t.borrow().to_matrix());
        let dolly = self
            .dolly
            .as_ref()
            .map_or_else(Mat4::identity, |d| d.borrow().to_matrix());

        dolly * trackball
    }

    /// Whether any manipulator is attached
    pub fn is_bound(&self) -> bool {
        self.trackball.is_some() || self.dolly.is_some()
    }
}
