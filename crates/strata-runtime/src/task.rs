use alloc::{string::String, vec::Vec};
use derive_more::Display;
use strata_common::{Coord, Rect};

use crate::{error::RuntimeError, registry::TaskRegistry, store::Store};

/// Global identifier of a task, unique across libraries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct TaskId(pub u32);

/// Kind of processor a task variant targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum VariantKind {
    /// General purpose processor.
    #[display("cpu")]
    Cpu,
    /// Processor group running OpenMP.
    #[display("omp")]
    Omp,
    /// Accelerator.
    #[display("gpu")]
    Gpu,
}

/// Entry point of a task variant.
pub type TaskBody = fn(&mut TaskContext);

/// A task implemented by a library.
///
/// ```ignore
/// struct Fill;
///
/// impl Task for Fill {
///     const TASK_ID: u32 = 0;
///     const NAME: &'static str = "fill";
///
///     fn cpu_variant(context: &mut TaskContext) {
///         // ...
///     }
/// }
/// ```
pub trait Task: 'static {
    /// Task id local to the library.
    const TASK_ID: u32;
    /// Name of the task for logging.
    const NAME: &'static str;

    /// Body executed when the task runs on a general purpose processor.
    fn cpu_variant(context: &mut TaskContext);

    /// Register every variant of the task in `library`.
    fn register_variants(
        registry: &mut TaskRegistry,
        library: &Library,
    ) -> Result<(), RuntimeError> {
        registry.register_variant(
            library,
            Self::TASK_ID,
            Self::NAME,
            VariantKind::Cpu,
            Self::cpu_variant,
        )
    }
}

/// A block of task ids owned by one library.
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct Library {
    name: String,
    task_id_base: u32,
    max_tasks: u32,
}

impl Library {
    /// Name of the library.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First global task id of the library.
    pub fn task_id_base(&self) -> u32 {
        self.task_id_base
    }

    /// Number of task ids reserved by the library.
    pub fn max_tasks(&self) -> u32 {
        self.max_tasks
    }

    /// Global id of the task with the given local id.
    pub fn task_id(&self, local_id: u32) -> Result<TaskId, RuntimeError> {
        if local_id >= self.max_tasks {
            return Err(RuntimeError::TaskIdOutOfRange {
                library: self.name.clone(),
                local_id,
                max_tasks: self.max_tasks,
            });
        }

        Ok(TaskId(self.task_id_base + local_id))
    }
}

/// Everything a point task can see while it runs.
#[derive(Debug, new)]
pub struct TaskContext {
    task_index: Coord,
    launch_domain: Rect,
    inputs: Vec<Store>,
    reductions: Vec<Store>,
}

impl TaskContext {
    /// Index of this point task in the launch domain.
    pub fn task_index(&self) -> Coord {
        self.task_index
    }

    /// Every point of the launch.
    pub fn launch_domain(&self) -> Rect {
        self.launch_domain
    }

    /// Read-only inputs, in the order they were added to the launcher.
    pub fn inputs(&self) -> &[Store] {
        &self.inputs
    }

    /// Local reduction accumulators, in the order they were added to the launcher.
    pub fn reductions(&self) -> &[Store] {
        &self.reductions
    }

    /// Exclusive access to the local reduction accumulators.
    pub fn reductions_mut(&mut self) -> &mut [Store] {
        &mut self.reductions
    }

    pub(crate) fn into_reductions(self) -> Vec<Store> {
        self.reductions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_offsets_local_ids() {
        let library = Library::new("hello".into(), 10, 4);

        assert_eq!(library.task_id(1), Ok(TaskId(11)));
        assert_eq!(
            library.task_id(4),
            Err(RuntimeError::TaskIdOutOfRange {
                library: "hello".into(),
                local_id: 4,
                max_tasks: 4,
            })
        );
    }
}
