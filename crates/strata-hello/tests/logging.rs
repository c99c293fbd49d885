use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use strata_hello::{register_tasks, sum};
use strata_runtime::{Runtime, config::launch::RuntimeConfig};

/// Keeps the info lines emitted by the hello library.
struct Recorder {
    lines: Mutex<Vec<String>>,
}

impl Log for Recorder {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info && metadata.target().starts_with("strata_hello")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut lines = self.lines.lock().unwrap();
            lines.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder {
    lines: Mutex::new(Vec::new()),
};

// The logger is global to the process, this binary only holds this test.
#[test]
fn every_point_task_logs_its_partition() {
    log::set_logger(&RECORDER).unwrap();
    log::set_max_level(LevelFilter::Info);

    let mut runtime = Runtime::with_config(RuntimeConfig {
        workers: Some(3),
        launch_domain: None,
    });
    let hello = register_tasks(&mut runtime).unwrap();
    let input = runtime.create_store_from_slice(&[1.0f32, 2.0, 3.0, 4.0]);

    let total = sum(&runtime, &hello, &input, Some(6)).unwrap();

    let mut lines = RECORDER.lines.lock().unwrap().clone();
    lines.sort();
    assert_eq!(total, 10.0);
    assert_eq!(
        lines,
        vec![
            "Sum [0,0]",
            "Sum [1,1]",
            "Sum [2,2]",
            "Sum [3,3]",
            "Sum [4,3]",
            "Sum [4,3]",
        ]
    );
}
