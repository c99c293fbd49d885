use alloc::vec::Vec;
use strata_common::ReductionOp;

use crate::{store::Store, task::Library};

/// Describes one launch of a task over a set of point tasks.
#[derive(Debug, Clone)]
pub struct TaskLauncher {
    pub(crate) library: Library,
    pub(crate) local_id: u32,
    pub(crate) inputs: Vec<Store>,
    pub(crate) reductions: Vec<(Store, ReductionOp)>,
    pub(crate) launch_domain: Option<usize>,
}

impl TaskLauncher {
    /// Launch the task with local id `local_id` of `library`.
    pub fn new(library: &Library, local_id: u32) -> Self {
        Self {
            library: library.clone(),
            local_id,
            inputs: Vec::new(),
            reductions: Vec::new(),
            launch_domain: None,
        }
    }

    /// Add a read-only input.
    ///
    /// One dimensional inputs are partitioned across the point tasks, other inputs are handed
    /// whole to every point task.
    pub fn add_input(mut self, store: Store) -> Self {
        self.inputs.push(store);
        self
    }

    /// Add a store every point task reduces into with `op`.
    pub fn add_reduction(mut self, store: Store, op: ReductionOp) -> Self {
        self.reductions.push((store, op));
        self
    }

    /// Set the number of point tasks.
    pub fn with_launch_domain(mut self, points: usize) -> Self {
        self.launch_domain = Some(points);
        self
    }
}
