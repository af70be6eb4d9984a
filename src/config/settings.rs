use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CONTROL_HOST: &str = "control";
pub const DEFAULT_REMOTE_DIR: &str = "remote/onedotzero";
pub const DEFAULT_LOGIN_USER: &str = "compute";
pub const SETTINGS_FILE: &str = "cluster.yml";

/// Settings for one invocation of the tool.
///
/// Every field has a default; `cluster.yml` at the project root may override
/// any subset of them and command-line flags override the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Staging directory on the control host, relative to the login home.
    pub remote_dir: String,
    /// Control host used when a hardware profile does not name one.
    pub default_control_host: String,
    /// Login identity written into the inventory group vars.
    pub login_user: String,
    /// Paths never synchronised to the control host.
    pub stage_excludes: Vec<String>,
    /// Per-node timeout of the batched reachability check.
    pub probe_timeout_secs: u64,
    pub wait: WaitPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    pub max_attempts: u32,
    #[serde(with = "serde_duration", rename = "delay_secs")]
    pub delay: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            remote_dir: DEFAULT_REMOTE_DIR.to_string(),
            default_control_host: DEFAULT_CONTROL_HOST.to_string(),
            login_user: DEFAULT_LOGIN_USER.to_string(),
            stage_excludes: vec![".git".to_string(), ".venv".to_string()],
            probe_timeout_secs: 3,
            wait: WaitPolicy::default(),
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            delay: Duration::from_secs(1),
        }
    }
}

impl WaitPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl ClusterConfig {
    /// Load `cluster.yml` from the project root, falling back to defaults when
    /// the file does not exist.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join(SETTINGS_FILE);
        if !path.exists() {
            debug!("No {} at {}, using defaults", SETTINGS_FILE, path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let mut config: ClusterConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidSettings {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        config.normalize();
        config.validate()?;

        debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// The staging directory is quoted for the remote shell, which would
    /// leave a `~/` prefix unexpanded; it is relative to the login home anyway.
    fn normalize(&mut self) {
        if let Some(relative) = self.remote_dir.strip_prefix("~/") {
            self.remote_dir = relative.trim_start_matches('/').to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wait.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "wait.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.remote_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote_dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.remote_dir.starts_with('~') {
            return Err(ConfigError::InvalidValue {
                field: "remote_dir".to_string(),
                reason: "must be relative to the login home, not start with '~'".to_string(),
            });
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

mod serde_duration {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
