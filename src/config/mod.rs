//! Exporter configuration: the TOML modules file and process-wide settings.
//!
//! The modules file maps module names to credentials and collector
//! selections. It can be reloaded at runtime; scrapes only ever see an
//! owned snapshot of the module they resolved.

pub mod module;

pub use module::{ModuleConfig, DEFAULT_COLLECTORS};

use crate::error::{ExporterError, Result};
use crate::metrics::collector::target_name;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Name of the module used when a scrape does not ask for one.
pub const DEFAULT_MODULE: &str = "default";

/// Default location of the FreeIPMI SDR cache.
pub const DEFAULT_SDR_CACHE_DIR: &str = "/root/.freeipmi/sdr-cache/";

/// Modules whose credentials may come from the environment, with the
/// user and password variable names.
pub const ENV_CREDENTIALS: [(&str, &str, &str); 2] = [
    ("baremetal/ironic", "IPMI_USER", "IPMI_PASSWORD"),
    ("cp/netbox", "NETBOX_CP_USER", "NETBOX_CP_PASSWORD"),
];

/// Parsed modules file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default)]
    pub modules: HashMap<String, ModuleConfig>,
}

impl ExporterConfig {
    /// Parse and validate a modules file.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: ExporterConfig = toml::from_str(content)
            .map_err(|e| ExporterError::config_error(format!("failed to parse config: {}", e)))?;
        for (name, module) in config.modules.iter_mut() {
            module.validate(name)?;
        }
        Ok(config)
    }

    /// Read and parse a modules file from disk, then apply credentials
    /// found in the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExporterError::config_error(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_credentials(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Create or update the [`ENV_CREDENTIALS`] modules with the user and
    /// password returned by `lookup`. A module is only touched when both
    /// values are present and non-empty.
    pub fn apply_env_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|value| !value.is_empty());
        for (module, user_var, pass_var) in ENV_CREDENTIALS {
            let (Some(user), Some(pass)) = (present(user_var), present(pass_var)) else {
                continue;
            };
            let entry = self.modules.entry(module.to_string()).or_default();
            entry.user = user;
            entry.pass = pass;
            info!(module, user_var, "Using credentials from environment");
        }
    }
}

/// Settings fixed at startup and shared by every scrape.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Directory holding the FreeIPMI binaries; empty means `$PATH` lookup.
    pub executables_path: PathBuf,
    /// Directory where FreeIPMI keeps its SDR cache files.
    pub sdr_cache_dir: PathBuf,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            executables_path: PathBuf::new(),
            sdr_cache_dir: PathBuf::from(DEFAULT_SDR_CACHE_DIR),
        }
    }
}

impl ScrapeSettings {
    pub fn with_executables_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executables_path = path.into();
        self
    }

    pub fn with_sdr_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sdr_cache_dir = path.into();
        self
    }

    /// Full path of a FreeIPMI binary.
    pub fn command_path(&self, command: &str) -> String {
        self.executables_path.join(command).to_string_lossy().into_owned()
    }
}

/// Hot-reloadable configuration guarded by a read/write lock.
#[derive(Debug, Clone, Default)]
pub struct SafeConfig {
    inner: Arc<RwLock<ExporterConfig>>,
}

impl SafeConfig {
    pub fn new(config: ExporterConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the configuration with the contents of `path`.
    ///
    /// The file is parsed before the lock is taken; on error the current
    /// configuration stays in place.
    pub async fn reload(&self, path: &Path) -> Result<()> {
        let config = match ExporterConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, path = %path.display(), "Error loading config file");
                return Err(e);
            }
        };
        let modules = config.modules.len();
        *self.inner.write().await = config;
        info!(path = %path.display(), modules, "Loaded config file");
        Ok(())
    }

    /// Resolve the module to use for a scrape of `target`.
    ///
    /// An explicitly requested module that does not exist is an error. A
    /// missing `default` module falls back to FreeIPMI defaults.
    pub async fn config_for_target(&self, target: &str, module: &str) -> Result<ModuleConfig> {
        let config = self.inner.read().await;
        if module != DEFAULT_MODULE {
            return config.modules.get(module).cloned().ok_or_else(|| {
                ExporterError::config_error(format!(
                    "unknown module {} requested for target {}",
                    module,
                    target_name(target)
                ))
            });
        }
        match config.modules.get(DEFAULT_MODULE) {
            Some(found) => Ok(found.clone()),
            None => {
                debug!(
                    host = target_name(target),
                    "No default module configured, using FreeIPMI defaults"
                );
                Ok(ModuleConfig::default())
            }
        }
    }

    /// Names of the configured modules, sorted.
    pub async fn module_names(&self) -> Vec<String> {
        let config = self.inner.read().await;
        let mut names: Vec<String> = config.modules.keys().cloned().collect();
        names.sort();
        names
    }
}
