//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - 2D geometry primitives
//! - Collections and data structures
//! - Time management
//! - Logging utilities

pub mod math;
pub mod geometry;
pub mod collections;
pub mod time;
pub mod logging;
