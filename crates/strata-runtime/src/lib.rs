#![warn(missing_docs)]

//! Strata runtime crate: registers task libraries and runs their launches over partitioned
//! stores, combining the reductions of every point task.

extern crate alloc;

#[macro_use]
extern crate derive_new;

/// Runtime configuration module.
pub mod config;
/// Reduction operators module.
pub mod reduction;
/// Task registry module.
pub mod registry;
/// Stores and accessors module.
pub mod store;
/// Task definition module.
pub mod task;

mod element;
mod error;
mod launcher;
mod runtime;

pub use element::*;
pub use error::*;
pub use launcher::*;
pub use runtime::*;

pub use strata_common::{Coord, Domain, Rect, ReductionOp, TypeCode, TypeError};
