//! Model descriptors and loading
//!
//! Models enter the engine as declarative descriptors: named mesh data
//! plus a placement transform, serialized as RON. Loading parses and
//! validates a descriptor without touching the scene graph; only a
//! successful [`instantiate`](descriptor::instantiate) call produces
//! nodes.

pub mod descriptor;
pub mod descriptor_loader;

pub use descriptor::{instantiate, MeshDescriptor, ModelDescriptor, TransformDescriptor};
pub use descriptor_loader::DescriptorLoader;

use thiserror::Error;

/// Errors that can occur while loading model descriptors
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Contents are not valid RON for a model descriptor
    #[error("Parse error: {0}")]
    Parse(String),

    /// Descriptor parsed but describes an unusable model
    #[error("Invalid descriptor: {0}")]
    Validation(String),
}
