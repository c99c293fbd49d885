use strata_runtime::{
    Rect, ReductionOp, Runtime, RuntimeError, TaskLauncher, TypeCode,
    reduction::SumReduction,
    store::{ReadAccessor, Store},
    task::{Library, Task, TaskContext},
};

use crate::HelloOpCode;

/// Sums a one dimensional partition of `float32` values into a scalar reduction.
pub struct SumTask;

impl Task for SumTask {
    const TASK_ID: u32 = HelloOpCode::Sum as u32;
    const NAME: &'static str = "sum";

    fn cpu_variant(context: &mut TaskContext) {
        let total = {
            let input = &context.inputs()[0];
            // Partitions are one dimensional, `shape` asserts it.
            let input_shape = input.shape();
            let input = input.read_accessor::<f32>();

            log::info!("Sum {input_shape}");

            sum_partition(&input, input_shape)
        };

        // Every point task gets its own accumulator, already initialized by the runtime, to
        // reduce into. The runtime folds them into the launch result once all points are done.
        let output = &mut context.reductions_mut()[0];
        assert_eq!(output.code(), TypeCode::Float32);
        assert_eq!(output.dim(), 1);
        assert_eq!(output.shape(), Rect::new(0, 0));

        let mut sum = output.reduce_accessor::<SumReduction<f32>>();
        sum.reduce(0, total);
    }
}

/// Sum of the elements of `input` in `shape`, in increasing global index order.
pub fn sum_partition(input: &ReadAccessor<'_, f32>, shape: Rect) -> f32 {
    let mut total = 0.0;
    for i in shape.points() {
        total += input.get(i);
    }
    total
}

/// Launch [SumTask] over `input` and return the sum of all its elements.
///
/// `points` sets the number of point tasks, the runtime default is used when `None`.
pub fn sum(
    runtime: &Runtime,
    library: &Library,
    input: &Store,
    points: Option<usize>,
) -> Result<f32, RuntimeError> {
    let output = runtime.create_reduction_target(TypeCode::Float32, &[1], ReductionOp::Add)?;

    let mut launcher = TaskLauncher::new(library, SumTask::TASK_ID)
        .add_input(input.clone())
        .add_reduction(output.clone(), ReductionOp::Add);
    if let Some(points) = points {
        launcher = launcher.with_launch_domain(points);
    }
    runtime.execute(launcher)?;

    Ok(output.to_vec::<f32>()[0])
}
