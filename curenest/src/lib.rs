//!
//! Layout engine for nesting tools into autoclaves.
//!
//! Provides the integer geometry kernel, the entities of an autoclave loading problem
//! (tools, autoclaves with optional raised stands, per-bin layouts and solutions)
//! and the external JSON representation used to talk to the outside world.
//!
//! Feature flags:
#![doc = document_features::document_features!()]

/// Integer axis-aligned geometry and interference checks
pub mod geometry;

/// Entities to model autoclave loading problems
pub mod entities;

/// Importing problem instances into and exporting solutions out of this library
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;

/// Length in millimetres. All internal geometry is integral to avoid drift in repeated overlap checks.
pub type Mm = i64;

/// Area in square millimetres.
pub type Mm2 = i64;
