//! Shading program descriptors and the shared program registry
//!
//! Several leaf nodes typically shade with the same program. The registry
//! compiles each distinct descriptor once, hands out reference-counted
//! handles, and destroys the backend program when the last holder releases
//! it. Nodes never own compiled programs directly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::collections::{Handle, HandleMap};
use crate::render::surface::{DrawingSurface, ProgramId};
use crate::render::RenderResult;

/// Description of a shading program to compile
///
/// Two descriptors with the same `name` are treated as the same program;
/// the registry compiles the first one it sees and shares the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramDescriptor {
    /// Registry identity for sharing
    pub name: String,
    /// Vertex stage source
    pub vertex_source: String,
    /// Fragment stage source
    pub fragment_source: String,
}

impl ProgramDescriptor {
    /// Create a new program descriptor
    pub fn new(
        name: impl Into<String>,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
        }
    }

    /// Descriptor for the standard lit mesh program
    ///
    /// This is the program model instantiation assigns to every mesh node,
    /// so all models in a scene share one compiled copy.
    pub fn standard_mesh() -> Self {
        Self::new("standard_mesh", "mesh.vert", "mesh.frag")
    }

    /// Descriptor for the flat color program used by overlay quads
    pub fn flat_color() -> Self {
        Self::new("flat_color", "flat.vert", "flat.frag")
    }
}

/// Handle to a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(Handle);

/// Registry shared between every node that needs a compiled program
pub type SharedProgramRegistry = Rc<RefCell<ProgramRegistry>>;

struct ProgramEntry {
    descriptor: ProgramDescriptor,
    id: ProgramId,
    refs: usize,
}

/// Reference-counted store of compiled shading programs
///
/// Acquire and release are explicit. Callers acquire during resource
/// setup, keep the handle for the node's lifetime, and release when the
/// node releases its surface resources. The backend program is destroyed
/// when the count returns to zero.
#[derive(Default)]
pub struct ProgramRegistry {
    entries: HandleMap<ProgramEntry>,
    by_name: HashMap<String, Handle>,
}

impl ProgramRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry already wrapped for sharing
    pub fn new_shared() -> SharedProgramRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Acquire a handle to the program described by `descriptor`
    ///
    /// Compiles through the surface on first acquisition; later calls for
    /// the same descriptor name only bump the reference count.
    pub fn acquire(
        &mut self,
        descriptor: &ProgramDescriptor,
        surface: &mut dyn DrawingSurface,
    ) -> RenderResult<ProgramHandle> {
        if let Some(&key) = self.by_name.get(&descriptor.name) {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.refs += 1;
                log::trace!(
                    "Program '{}' acquired, refs={}",
                    descriptor.name,
                    entry.refs
                );
                return Ok(ProgramHandle(key));
            }
        }

        let id = surface.compile_program(descriptor)?;
        let key = self.entries.insert(ProgramEntry {
            descriptor: descriptor.clone(),
            id,
            refs: 1,
        });
        self.by_name.insert(descriptor.name.clone(), key);
        log::debug!("Compiled program '{}' as {:?}", descriptor.name, id);

        Ok(ProgramHandle(key))
    }

    /// Release one reference to a program
    ///
    /// The backend program is destroyed when the last reference goes away.
    /// Releasing a handle that is no longer live logs a warning and does
    /// nothing else.
    pub fn release(&mut self, handle: ProgramHandle, surface: &mut dyn DrawingSurface) {
        let Some(entry) = self.entries.get_mut(handle.0) else {
            log::warn!("Release of stale program handle {:?}", handle);
            return;
        };

        entry.refs -= 1;
        log::trace!("Program '{}' released, refs={}", entry.descriptor.name, entry.refs);

        if entry.refs == 0 {
            surface.destroy_program(entry.id);
            self.by_name.remove(&entry.descriptor.name);
            if let Some(removed) = self.entries.remove(handle.0) {
                log::debug!("Destroyed program '{}'", removed.descriptor.name);
            }
        }
    }

    /// Backend id for a handle, if the program is still live
    pub fn program_id(&self, handle: ProgramHandle) -> Option<ProgramId> {
        self.entries.get(handle.0).map(|entry| entry.id)
    }

    /// Current reference count for a handle, zero once destroyed
    pub fn ref_count(&self, handle: ProgramHandle) -> usize {
        self.entries.get(handle.0).map_or(0, |entry| entry.refs)
    }

    /// Number of live compiled programs
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}
