//! # Rendering Abstraction
//!
//! This module provides the drawing layer the scene graph renders into.
//! It is deliberately backend-agnostic: nodes speak to a [`DrawingSurface`]
//! trait object and never to a graphics API, so the same scene can target
//! a GPU surface in production and a recording surface in tests.
//!
//! ## Architecture
//!
//! - **DrawingSurface**: transform/attribute stacks, clipping, mask fills,
//!   and resource management behind one trait
//! - **Mesh**: backend-free geometry containers
//! - **ProgramRegistry**: reference-counted sharing of compiled programs
//! - **RecordingSurface**: records drawing calls for tests and headless use

use thiserror::Error;

pub mod mesh;
pub mod program;
pub mod recording;
pub mod surface;

pub use mesh::{Mesh, Vertex};
pub use program::{ProgramDescriptor, ProgramHandle, ProgramRegistry, SharedProgramRegistry};
pub use recording::{RecordingSurface, SurfaceOp};
pub use surface::{DrawingSurface, OffscreenId, PickId, ProgramId, SurfaceExtent};

/// High-level rendering error types
///
/// Represents errors that can occur during rendering operations, abstracted
/// from specific graphics API error types so node code stays backend-free.
/// Backend-specific detail goes into the message strings and the log.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Surface initialization failed during setup
    ///
    /// Raised by surface implementations that cannot bring up their
    /// backing graphics context or window system integration.
    #[error("Surface initialization failed: {0}")]
    InitializationFailed(String),

    /// A drawing operation failed during execution
    ///
    /// Indicates failure while the scene graph was actively rendering,
    /// such as a rejected draw call or a failed offscreen composite.
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    ///
    /// Occurs when surface resources (programs, offscreen buffers) cannot
    /// be created, typically due to memory pressure or invalid sources.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    ///
    /// Wraps backend-specific failures in a generic form for consistent
    /// handling across different surface implementations.
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
