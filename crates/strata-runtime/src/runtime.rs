use alloc::{format, vec, vec::Vec};
use strata_common::{Domain, Rect, ReductionOp, TypeCode, shard_of};

use crate::{
    config::{
        GlobalConfig, LaunchLogger, LoggerConfig,
        launch::{LaunchLogLevel, RuntimeConfig},
    },
    element::Element,
    error::RuntimeError,
    launcher::TaskLauncher,
    reduction::{ReductionImpl, ReductionTable},
    registry::TaskRegistry,
    store::Store,
    task::{Library, TaskBody, TaskContext, VariantKind},
};

/// Hosts task libraries and runs their launches on a pool of scoped worker threads.
///
/// Every launch is split into point tasks. One dimensional inputs are tiled across the points,
/// each point reduces into its own local accumulators, and once every point is done the
/// accumulators are folded into the reduction targets in ascending point order. The result of
/// a launch therefore doesn't depend on the number of workers.
#[derive(Debug)]
pub struct Runtime {
    registry: TaskRegistry,
    reductions: ReductionTable,
    config: RuntimeConfig,
    logger: spin::Mutex<LaunchLogger>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Create a runtime configured from [GlobalConfig].
    pub fn new() -> Self {
        let config = GlobalConfig::get();
        Self::with_config(config.runtime.clone()).with_logger(LaunchLogger::new(config))
    }

    /// Create a runtime with the given scheduler configuration and launch logging disabled.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            registry: TaskRegistry::default(),
            reductions: ReductionTable::with_builtins(),
            config,
            logger: spin::Mutex::new(LaunchLogger::from_config(&LoggerConfig::default())),
        }
    }

    /// Replace the launch logger.
    pub fn with_logger(mut self, logger: LaunchLogger) -> Self {
        self.logger = spin::Mutex::new(logger);
        self
    }

    /// The scheduler configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Registered tasks.
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Registered tasks, for libraries to register themselves.
    pub fn registry_mut(&mut self) -> &mut TaskRegistry {
        &mut self.registry
    }

    /// Registered reductions.
    pub fn reductions(&self) -> &ReductionTable {
        &self.reductions
    }

    /// Registered reductions, to add custom ones.
    pub fn reductions_mut(&mut self) -> &mut ReductionTable {
        &mut self.reductions
    }

    /// Reserve a block of task ids for a new library.
    pub fn register_library(
        &mut self,
        name: &str,
        max_tasks: u32,
    ) -> Result<Library, RuntimeError> {
        self.registry.register_library(name, max_tasks)
    }

    /// Create a zero-filled store with the given extents.
    pub fn create_store(&self, code: TypeCode, extents: &[usize]) -> Result<Store, RuntimeError> {
        Store::zeros(code, Domain::from_extents(extents))
    }

    /// Create a one dimensional store holding a copy of `values`.
    pub fn create_store_from_slice<T: Element>(&self, values: &[T]) -> Store {
        Store::from_slice(values)
    }

    /// Create a store where every element is `value`.
    pub fn create_store_filled<T: Element>(&self, extents: &[usize], value: T) -> Store {
        Store::filled(Domain::from_extents(extents), value)
    }

    /// Create a store filled with the identity of the `op` reduction over `code`.
    pub fn create_reduction_target(
        &self,
        code: TypeCode,
        extents: &[usize],
        op: ReductionOp,
    ) -> Result<Store, RuntimeError> {
        let reduction = self.reductions.get(op, code)?;
        let store = self.create_store(code, extents)?;
        store.with_bytes_mut(|bytes| reduction.fill_identity(bytes));

        Ok(store)
    }

    /// Run every point task of the launch and combine their reductions.
    ///
    /// # Panics
    ///
    /// A panic in a point task, such as a failed assertion, is propagated once every worker has
    /// stopped.
    pub fn execute(&self, launcher: TaskLauncher) -> Result<(), RuntimeError> {
        let task = launcher.library.task_id(launcher.local_id)?;
        let body = self.registry.variant(task, VariantKind::Cpu)?;
        let name = self
            .registry
            .find(task)
            .map(|info| info.name())
            .ok_or(RuntimeError::TaskNotFound(task))?;

        let points = launcher
            .launch_domain
            .unwrap_or_else(|| self.config.launch_domain());
        if points == 0 {
            return Err(RuntimeError::EmptyLaunchDomain);
        }

        let reductions = launcher
            .reductions
            .iter()
            .map(|(store, op)| self.reductions.get(*op, store.code()).copied())
            .collect::<Result<Vec<_>, _>>()?;

        let launch_domain = Rect::with_len(points);
        let workers = self.config.workers().min(points);
        self.log(LaunchLogLevel::Basic, || {
            format!("Launching {name} (task {task}) over {points} points on {workers} workers")
        });

        let partitions: Vec<Vec<Store>> = launcher
            .inputs
            .iter()
            .map(|store| match store.dim() {
                1 => store.partition(points),
                _ => vec![store.clone(); points],
            })
            .collect();

        let mut shards: Vec<Vec<TaskContext>> = (0..workers).map(|_| Vec::new()).collect();
        for point in launch_domain.points() {
            let inputs: Vec<Store> = partitions
                .iter()
                .map(|parts| parts[point as usize].clone())
                .collect();
            let accumulators = launcher
                .reductions
                .iter()
                .zip(reductions.iter())
                .map(|((target, _), reduction)| local_accumulator(target, reduction))
                .collect::<Result<Vec<_>, _>>()?;

            self.log(LaunchLogLevel::Full, || {
                let domains: Vec<_> = inputs
                    .iter()
                    .map(|input| format!("{}", input.domain()))
                    .collect();
                format!("  point {point} inputs {domains:?}")
            });

            let shard = shard_of(point, launch_domain, workers);
            shards[shard].push(TaskContext::new(point, launch_domain, inputs, accumulators));
        }

        let mut contexts = run_shards(body, shards);
        contexts.sort_by_key(TaskContext::task_index);

        for context in contexts {
            for ((target, _), (reduction, local)) in launcher
                .reductions
                .iter()
                .zip(reductions.iter().zip(context.into_reductions()))
            {
                local.with_bytes(|local| {
                    target.with_bytes_mut(|target| reduction.fold(target, local))
                });
            }
        }

        self.log(LaunchLogLevel::Full, || {
            format!(
                "  folded {points} accumulators into {} reduction targets",
                reductions.len()
            )
        });

        Ok(())
    }

    fn log<F: FnOnce() -> alloc::string::String>(&self, level: LaunchLogLevel, msg: F) {
        let mut logger = self.logger.lock();
        if logger.level() >= level {
            logger.log_launch(level, &msg());
        }
    }
}

// A fresh accumulator covering the same global bounds as the reduction target.
fn local_accumulator(target: &Store, reduction: &ReductionImpl) -> Result<Store, RuntimeError> {
    let store = Store::zeros(target.code(), target.domain().clone())?;
    store.with_bytes_mut(|bytes| reduction.fill_identity(bytes));
    Ok(store)
}

fn run_shards(body: TaskBody, shards: Vec<Vec<TaskContext>>) -> Vec<TaskContext> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = shards
            .into_iter()
            .enumerate()
            .map(|(shard, mut contexts)| {
                scope.spawn(move || {
                    log::trace!("Shard {shard} started with {} point tasks", contexts.len());
                    for context in contexts.iter_mut() {
                        body(context);
                    }
                    log::trace!("Shard {shard} stopped");
                    contexts
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(contexts) => contexts,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}
