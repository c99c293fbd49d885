#![warn(missing_docs)]

//! Common crate for Strata: geometry, type codes and tiling helpers shared by the runtime
//! and the task libraries built on top of it.

extern crate alloc;

/// Points, intervals and domains.
pub mod geometry;
/// Type codes, reduction operators and the type system.
pub mod types;

mod tiling;

pub use geometry::*;
pub use tiling::*;
pub use types::{ReductionOp, TypeCode, TypeError};
