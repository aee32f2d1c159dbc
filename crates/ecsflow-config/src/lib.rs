pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points directly at a config file
pub const CONFIG_PATH_ENV: &str = "ECSFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["config.json", "ecsflow.json"];

/// Locate the config file
///
/// Search order:
/// 1. `ECSFLOW_CONFIG_PATH` (direct path)
/// 2. current directory: config.json, ecsflow.json
/// 3. ./.ecsflow/config.json
/// 4. ~/.config/ecsflow/config.json (global)
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local = current_dir.join(".ecsflow").join("config.json");
    if local.exists() {
        return Ok(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("ecsflow").join("config.json");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Static provisioning configuration, read once at start
#[derive(Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub region_id: String,
    pub vpc_id: String,
    pub vswitch_id: String,
    pub security_group_id: String,

    #[serde(default)]
    pub instance: InstanceOverrides,

    #[serde(default)]
    pub wait: WaitSettings,
}

impl std::fmt::Debug for ProvisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"***")
            .field("region_id", &self.region_id)
            .field("vpc_id", &self.vpc_id)
            .field("vswitch_id", &self.vswitch_id)
            .field("security_group_id", &self.security_group_id)
            .field("instance", &self.instance)
            .field("wait", &self.wait)
            .finish()
    }
}

/// Optional overrides of the default instance template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceOverrides {
    pub name: Option<String>,
    pub image_id: Option<String>,
    pub instance_type: Option<String>,
    pub system_disk_size_gb: Option<u32>,
    pub data_disk_size_gb: Option<u32>,
    pub bandwidth_in_mbps: Option<u32>,
    pub bandwidth_out_mbps: Option<u32>,
    pub interface_name: Option<String>,
    /// Built-in script name, path to a script file, or "none"
    pub user_data: Option<String>,
}

/// Poll settings for the stop/start waits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_interval_secs() -> u64 {
    10
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl ProvisionConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ProvisionConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or discover one with [`find_config_file`]
    pub fn load_or_discover(path: Option<&Path>) -> Result<(Self, PathBuf)> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => find_config_file()?,
        };
        let config = Self::load(&path)?;
        Ok((config, path))
    }

    /// Reject empty required values
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("access_key_id", &self.access_key_id),
            ("access_key_secret", &self.access_key_secret),
            ("region_id", &self.region_id),
            ("vpc_id", &self.vpc_id),
            ("vswitch_id", &self.vswitch_id),
            ("security_group_id", &self.security_group_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field));
            }
        }

        for (field, size) in [
            ("instance.system_disk_size_gb", self.instance.system_disk_size_gb),
            ("instance.data_disk_size_gb", self.instance.data_disk_size_gb),
        ] {
            if size == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "disk size must be at least 1 GB".to_string(),
                });
            }
        }
        Ok(())
    }
}
