use super::{GlobalConfig, launch::LaunchLogLevel};
use alloc::{string::ToString, sync::Arc, vec::Vec};
use core::fmt::Display;
use hashbrown::HashMap;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
};

/// Configuration for logging in Strata, parameterized by a log level type.
///
/// Note that you can use multiple sinks at the same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional crate-level logging configuration (e.g., info, debug, trace).
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// The log level for this logger, determining verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

/// Log levels using the `log` crate.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

fn append_default() -> bool {
    true
}

/// Trait for types that can be used as log levels in `LoggerConfig`.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Writes launch events to every sink configured in [GlobalConfig].
#[derive(Debug)]
pub struct LaunchLogger {
    sinks: Vec<LoggerKind>,
    level: LaunchLogLevel,
}

impl LaunchLogger {
    /// Creates a new launch logger from the logger section of the global configuration.
    ///
    /// Sinks pointing at the same target are only opened once.
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        Self::from_config(&config.logger)
    }

    /// Creates a new launch logger from a logger configuration.
    pub fn from_config(config: &LoggerConfig<LaunchLogLevel>) -> Self {
        let mut sinks = Vec::new();

        #[derive(Hash, PartialEq, Eq)]
        enum SinkId {
            File(PathBuf),
            Stdout,
            Stderr,
            LogCrate(LogCrateLevel),
        }

        let mut registered = HashMap::<SinkId, usize>::new();
        let mut register = |id: SinkId, sink: &dyn Fn() -> LoggerKind| {
            if !registered.contains_key(&id) {
                registered.insert(id, sinks.len());
                sinks.push(sink());
            }
        };

        if let LaunchLogLevel::Disabled = config.level {
        } else {
            if let Some(file) = &config.file {
                register(SinkId::File(file.clone()), &|| {
                    FileLogger::new(file, config.append)
                        .map(LoggerKind::File)
                        .unwrap_or_else(|err| {
                            log::warn!("Can't open log file {}: {err}", file.display());
                            LoggerKind::Log(LogCrateLevel::Info)
                        })
                });
            }
            if config.stdout {
                register(SinkId::Stdout, &|| LoggerKind::Stdout);
            }
            if config.stderr {
                register(SinkId::Stderr, &|| LoggerKind::Stderr);
            }
            if let Some(level) = config.log {
                register(SinkId::LogCrate(level), &|| LoggerKind::Log(level));
            }
        }

        Self {
            sinks,
            level: config.level,
        }
    }

    /// The configured launch log level.
    pub fn level(&self) -> LaunchLogLevel {
        self.level
    }

    /// Number of distinct sinks receiving messages.
    pub fn num_sinks(&self) -> usize {
        self.sinks.len()
    }

    /// Log a message when the configured level is at least `level`.
    pub fn log_launch<S: Display>(&mut self, level: LaunchLogLevel, msg: &S) {
        if self.level < level || level == LaunchLogLevel::Disabled {
            return;
        }

        match self.sinks.len() {
            0 => {}
            1 => self.sinks[0].log(msg),
            _ => {
                let msg = msg.to_string();
                for sink in self.sinks.iter_mut() {
                    sink.log(&msg);
                }
            }
        }
    }
}

/// Represents different types of sinks.
#[derive(Debug)]
enum LoggerKind {
    /// Logs to a file.
    File(FileLogger),

    /// Logs to standard output.
    Stdout,

    /// Logs to standard error.
    Stderr,

    /// Logs using the `log` crate with a specified level.
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

/// Logger that writes messages to a file.
#[derive(Debug)]
struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    fn new(path: &PathBuf, append: bool) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    // Logs a message to the file, flushing the buffer to ensure immediate write.
    fn log<S: Display>(&mut self, msg: &S) {
        if let Err(err) = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush()) {
            log::warn!("Can't write to log file: {err}");
        }
    }
}
