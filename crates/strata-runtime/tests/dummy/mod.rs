use strata_runtime::{
    ReductionOp, Runtime, RuntimeError, TypeCode,
    config::launch::RuntimeConfig,
    reduction::{MaxReduction, SumReduction},
    store::Store,
    task::{Library, Task, TaskContext},
};

pub const DUMMY_MAX_TASKS: u32 = 8;

/// Counts the elements of its input partition.
pub struct CountTask;

impl Task for CountTask {
    const TASK_ID: u32 = 0;
    const NAME: &'static str = "count";

    fn cpu_variant(context: &mut TaskContext) {
        let volume = context.inputs()[0].volume() as i64;
        let mut count = context.reductions_mut()[0].reduce_accessor::<SumReduction<i64>>();
        count.reduce(0, volume);
    }
}

/// Largest element of its input partition.
pub struct MaxTask;

impl Task for MaxTask {
    const TASK_ID: u32 = 1;
    const NAME: &'static str = "max";

    fn cpu_variant(context: &mut TaskContext) {
        let max = {
            let input = context.inputs()[0].read_accessor::<f64>();
            input
                .shape()
                .points()
                .map(|i| input.get(i))
                .fold(f64::MIN, f64::max)
        };
        let mut output = context.reductions_mut()[0].reduce_accessor::<MaxReduction<f64>>();
        output.reduce(0, max);
    }
}

/// Reduces the index of every point task, and the launch volume once per point.
pub struct PointTask;

impl Task for PointTask {
    const TASK_ID: u32 = 2;
    const NAME: &'static str = "point";

    fn cpu_variant(context: &mut TaskContext) {
        let index = context.task_index() as u64;
        let points = context.launch_domain().volume() as u64;
        let reductions = context.reductions_mut();
        reductions[0]
            .reduce_accessor::<SumReduction<u64>>()
            .reduce(0, index);
        reductions[1]
            .reduce_accessor::<SumReduction<u64>>()
            .reduce(0, points);
    }
}

/// Asserts that its partition starts before index 2.
pub struct CheckedTask;

impl Task for CheckedTask {
    const TASK_ID: u32 = 3;
    const NAME: &'static str = "checked";

    fn cpu_variant(context: &mut TaskContext) {
        let shape = context.inputs()[0].shape();
        assert!(shape.lo < 2, "partition {shape} starts too late");
    }
}

/// Local id reserved by the dummy library but never registered.
pub const MISSING_TASK_ID: u32 = 7;

pub fn dummy_runtime(workers: usize) -> (Runtime, Library) {
    let mut runtime = Runtime::with_config(RuntimeConfig {
        workers: Some(workers),
        launch_domain: None,
    });
    let library = register_tasks(&mut runtime).expect("Dummy tasks should register");
    (runtime, library)
}

pub fn register_tasks(runtime: &mut Runtime) -> Result<Library, RuntimeError> {
    let library = runtime.register_library("dummy", DUMMY_MAX_TASKS)?;
    let registry = runtime.registry_mut();
    CountTask::register_variants(registry, &library)?;
    MaxTask::register_variants(registry, &library)?;
    PointTask::register_variants(registry, &library)?;
    CheckedTask::register_variants(registry, &library)?;
    Ok(library)
}

pub fn scalar(runtime: &Runtime, code: TypeCode, op: ReductionOp) -> Store {
    runtime
        .create_reduction_target(code, &[1], op)
        .expect("Scalar target should be created")
}

