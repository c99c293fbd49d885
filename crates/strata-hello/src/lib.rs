#![warn(missing_docs)]

//! Hello library for Strata.
//!
//! The library must be registered explicitly before its tasks can be launched:
//!
//! ```ignore
//! let mut runtime = Runtime::new();
//! let hello = strata_hello::register_tasks(&mut runtime)?;
//! let input = runtime.create_store_from_slice(&[1.0f32, 2.0, 3.0, 4.0]);
//! assert_eq!(strata_hello::sum(&runtime, &hello, &input, None)?, 10.0);
//! ```

mod sum;

pub use sum::*;

use strata_runtime::{
    Runtime, RuntimeError,
    task::{Library, Task},
};

/// Name the library registers under.
pub const LIBRARY_NAME: &str = "hello";

/// Local task ids of the hello library.
///
/// Only [Sum](HelloOpCode::Sum) is implemented, the other ids are reserved and launching them
/// fails with [RuntimeError::TaskNotFound].
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelloOpCode {
    /// Reserved, no task is registered under this id.
    HelloWorld = 0,
    /// [SumTask]: sums a partitioned `float32` array.
    Sum = 1,
    /// Reserved, no task is registered under this id.
    Square = 2,
    /// Reserved, no task is registered under this id.
    Iota = 3,
}

/// Number of task ids reserved by the library.
pub const MAX_TASKS: u32 = 4;

/// Register the library and every task it implements.
pub fn register_tasks(runtime: &mut Runtime) -> Result<Library, RuntimeError> {
    let library = runtime.register_library(LIBRARY_NAME, MAX_TASKS)?;
    SumTask::register_variants(runtime.registry_mut(), &library)?;

    Ok(library)
}
