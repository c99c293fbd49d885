use alloc::string::{String, ToString};
use hashbrown::HashMap;

use crate::{
    error::RuntimeError,
    task::{Library, TaskBody, TaskId, VariantKind},
};

/// A registered task and its variants.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    name: &'static str,
    variants: HashMap<VariantKind, TaskBody>,
}

impl TaskInfo {
    /// Name of the task.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the task provides the variant.
    pub fn has_variant(&self, kind: VariantKind) -> bool {
        self.variants.contains_key(&kind)
    }
}

/// Maps task ids to their implementations.
///
/// The registry is populated explicitly, usually by a `register_tasks` function exposed by each
/// task library and called once during initialization.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    libraries: HashMap<String, Library>,
    tasks: HashMap<TaskId, TaskInfo>,
    next_task_id: u32,
}

impl TaskRegistry {
    /// Reserve a block of `max_tasks` task ids for a new library.
    pub fn register_library(
        &mut self,
        name: &str,
        max_tasks: u32,
    ) -> Result<Library, RuntimeError> {
        if self.libraries.contains_key(name) {
            return Err(RuntimeError::DuplicateLibrary(name.to_string()));
        }

        let library = Library::new(name.to_string(), self.next_task_id, max_tasks);
        self.next_task_id += max_tasks;
        self.libraries.insert(name.to_string(), library.clone());
        log::debug!(
            "Registered library {name} with task ids [{}, {})",
            library.task_id_base(),
            self.next_task_id
        );

        Ok(library)
    }

    /// Find a registered library by name.
    pub fn find_library(&self, name: &str) -> Option<&Library> {
        self.libraries.get(name)
    }

    /// Register `body` as the `kind` variant of a task of `library`.
    pub fn register_variant(
        &mut self,
        library: &Library,
        local_id: u32,
        name: &'static str,
        kind: VariantKind,
        body: TaskBody,
    ) -> Result<(), RuntimeError> {
        let task = library.task_id(local_id)?;
        let info = self.tasks.entry(task).or_insert_with(|| TaskInfo {
            name,
            variants: HashMap::new(),
        });

        if info.variants.contains_key(&kind) {
            return Err(RuntimeError::DuplicateVariant {
                task,
                variant: kind,
            });
        }

        info.variants.insert(kind, body);
        log::debug!("Registered {kind} variant of {}.{name} as task {task}", library.name());

        Ok(())
    }

    /// Find a registered task.
    pub fn find(&self, task: TaskId) -> Option<&TaskInfo> {
        self.tasks.get(&task)
    }

    /// The body of the `kind` variant of `task`.
    pub fn variant(&self, task: TaskId, kind: VariantKind) -> Result<TaskBody, RuntimeError> {
        let info = self.find(task).ok_or(RuntimeError::TaskNotFound(task))?;
        info.variants
            .get(&kind)
            .copied()
            .ok_or(RuntimeError::VariantNotFound {
                task,
                variant: kind,
            })
    }

    /// Number of registered tasks.
    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }
}
