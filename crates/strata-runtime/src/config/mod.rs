/// Scheduler and launch logging config module.
pub mod launch;

mod base;
mod logger;

pub use base::*;
pub use logger::{LaunchLogger, LogCrateLevel, LogLevel, LoggerConfig};
