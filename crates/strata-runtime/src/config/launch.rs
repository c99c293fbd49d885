use super::logger::LogLevel;

/// Configuration of the local scheduler.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Number of worker threads running point tasks, the available parallelism when unset.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Number of point tasks of a launch that doesn't set its own, the number of workers when
    /// unset.
    #[serde(default)]
    pub launch_domain: Option<usize>,
}

impl RuntimeConfig {
    /// Number of worker threads, never zero.
    pub fn workers(&self) -> usize {
        match self.workers {
            Some(workers) => workers.max(1),
            None => std::thread::available_parallelism()
                .map(|workers| workers.get())
                .unwrap_or(1),
        }
    }

    /// Default number of point tasks per launch, never zero.
    pub fn launch_domain(&self) -> usize {
        self.launch_domain
            .map(|points| points.max(1))
            .unwrap_or_else(|| self.workers())
    }
}

/// Verbosity of launch logging.
#[derive(
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum LaunchLogLevel {
    /// Launch logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// One line per launch.
    #[serde(rename = "basic")]
    Basic,

    /// Every point task and the combined reductions.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LaunchLogLevel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers_never_zero() {
        let config = RuntimeConfig {
            workers: Some(0),
            launch_domain: None,
        };

        assert_eq!(config.workers(), 1);
        assert_eq!(config.launch_domain(), 1);
    }

    #[test]
    fn launch_domain_defaults_to_workers() {
        let config = RuntimeConfig {
            workers: Some(3),
            launch_domain: None,
        };

        assert_eq!(config.launch_domain(), 3);
    }
}
