use super::{
    launch::{LaunchLogLevel, RuntimeConfig},
    logger::LoggerConfig,
};
use alloc::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static STRATA_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration for Strata, combining scheduling and logging settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration for the local scheduler.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Configuration for launch logging.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not
    /// set.
    ///
    /// If no configuration is set, it attempts to load one from `strata.toml` or `Strata.toml` in
    /// the current directory or its parents. If no file is found, a default configuration is used.
    /// Environment variables are applied on top of the loaded configuration.
    ///
    /// # Notes
    ///
    /// Calling this function takes a global lock, read the values once during initialization
    /// rather than on every launch.
    pub fn get() -> Arc<Self> {
        let mut state = STRATA_GLOBAL_CONFIG.lock();
        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
        use std::io::Write;

        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`.
    pub fn set(config: Self) {
        let mut state = STRATA_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("STRATA_DEBUG_LOG") {
            self.logger.level = LaunchLogLevel::Full;

            match val.as_str() {
                "stdout" => self.logger.stdout = true,
                "stderr" => self.logger.stderr = true,
                "1" | "true" => self.logger.file = Some("/tmp/strata.log".into()),
                "0" | "false" => self.logger.level = LaunchLogLevel::Disabled,
                file_path => self.logger.file = Some(file_path.into()),
            }
        }

        if let Some(workers) = parse_env("STRATA_WORKERS") {
            self.runtime.workers = Some(workers);
        }

        if let Some(points) = parse_env("STRATA_LAUNCH_DOMAIN") {
            self.runtime.launch_domain = Some(points);
        }

        self
    }

    /// Parse a configuration from its toml representation.
    ///
    /// # Panics
    ///
    /// If the content doesn't have the right format.
    pub fn from_toml(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(val) => val,
            Err(err) => panic!("The file provided doesn't have the right format => {err:?}"),
        }
    }

    // Loads configuration from `strata.toml` or `Strata.toml` in the current directory or its
    // parents.
    //
    // Traverses up the directory tree until a valid configuration file is found or the root is
    // reached.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            if let Ok(content) = Self::from_file_path(dir.join("strata.toml")) {
                return content;
            }

            if let Ok(content) = Self::from_file_path(dir.join("Strata.toml")) {
                return content;
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content))
    }
}

fn parse_env(name: &str) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    match val.trim().parse() {
        Ok(val) => Some(val),
        Err(err) => {
            log::warn!("Ignoring {name}={val}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogCrateLevel;
    use serial_test::serial;

    #[test]
    fn parses_partial_toml() {
        let config = GlobalConfig::from_toml(
            r#"
            [runtime]
            workers = 4

            [logger]
            level = "basic"
            log = "debug"
            "#,
        );

        assert_eq!(config.runtime.workers, Some(4));
        assert_eq!(config.runtime.launch_domain, None);
        assert_eq!(config.logger.level, LaunchLogLevel::Basic);
        assert_eq!(config.logger.log, Some(LogCrateLevel::Debug));
        assert!(config.logger.append);
    }

    #[test]
    #[should_panic]
    fn malformed_toml_panics() {
        GlobalConfig::from_toml("[runtime]\nworkers = \"many\"");
    }

    #[test]
    fn default_round_trips_through_toml() {
        let content = toml::to_string_pretty(&GlobalConfig::default()).unwrap();
        let config = GlobalConfig::from_toml(&content);

        assert_eq!(config.runtime, RuntimeConfig::default());
        assert_eq!(config.logger.level, LaunchLogLevel::Disabled);
    }

    // The only test touching the global configuration, it can be set once per process.
    #[test]
    #[serial]
    fn set_config_is_returned_and_saved() {
        GlobalConfig::set(GlobalConfig {
            runtime: RuntimeConfig {
                workers: Some(6),
                launch_domain: Some(12),
            },
            logger: LoggerConfig {
                stdout: true,
                level: LaunchLogLevel::Full,
                ..Default::default()
            },
        });

        let current = GlobalConfig::get();
        assert_eq!(current.runtime.workers, Some(6));
        assert!(std::panic::catch_unwind(|| GlobalConfig::set(GlobalConfig::default())).is_err());

        let path = std::env::temp_dir().join(format!("strata-config-{}.toml", std::process::id()));
        GlobalConfig::save_default(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let saved = GlobalConfig::from_toml(&content);
        assert_eq!(saved.runtime, current.runtime);
        assert_eq!(saved.logger.level, LaunchLogLevel::Full);
        assert!(saved.logger.stdout);
        assert!(!saved.logger.stderr);
    }

    #[test]
    #[serial]
    fn env_overrides_runtime_and_logger() {
        // SAFETY: serialized with every other test touching the environment.
        unsafe {
            std::env::set_var("STRATA_WORKERS", "3");
            std::env::set_var("STRATA_LAUNCH_DOMAIN", "not-a-number");
            std::env::set_var("STRATA_DEBUG_LOG", "stderr");
        }

        let config = GlobalConfig::default().override_from_env();

        unsafe {
            std::env::remove_var("STRATA_WORKERS");
            std::env::remove_var("STRATA_LAUNCH_DOMAIN");
            std::env::remove_var("STRATA_DEBUG_LOG");
        }

        assert_eq!(config.runtime.workers, Some(3));
        assert_eq!(config.runtime.launch_domain, None);
        assert_eq!(config.logger.level, LaunchLogLevel::Full);
        assert!(config.logger.stderr);
    }

    #[test]
    #[serial]
    fn env_can_disable_logging() {
        unsafe {
            std::env::set_var("STRATA_DEBUG_LOG", "0");
        }

        let config = GlobalConfig::default().override_from_env();

        unsafe {
            std::env::remove_var("STRATA_DEBUG_LOG");
        }

        assert_eq!(config.logger.level, LaunchLogLevel::Disabled);
    }
}
