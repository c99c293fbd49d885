use strata_hello::{register_tasks, sum};
use strata_runtime::{Runtime, RuntimeError};

fn main() -> Result<(), RuntimeError> {
    env_logger::init();

    let mut runtime = Runtime::new();
    let hello = register_tasks(&mut runtime)?;

    let values: Vec<f32> = (1..=1000).map(|i| i as f32).collect();
    let input = runtime.create_store_from_slice(&values);
    let total = sum(&runtime, &hello, &input, None)?;

    println!(
        "Sum of 1..=1000 over {} points: {total}",
        runtime.config().launch_domain()
    );

    Ok(())
}
