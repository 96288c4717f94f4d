//! Per-module scrape configuration.

use crate::error::{ExporterError, Result};
use crate::freeipmi::escape_password;
use crate::metrics::collector::CollectorName;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Collectors run when a module does not list any.
pub const DEFAULT_COLLECTORS: [CollectorName; 4] = [
    CollectorName::Ipmi,
    CollectorName::Dcmi,
    CollectorName::Bmc,
    CollectorName::Chassis,
];

/// Credentials, FreeIPMI session options and collector selection for one module.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    pub user: String,
    pub pass: String,
    /// FreeIPMI `privilege-level` (e.g. `user`, `operator`, `admin`)
    pub privilege: String,
    /// FreeIPMI `driver-type` (e.g. `LAN`, `LAN_2_0`)
    pub driver: String,
    /// Session timeout in milliseconds, 0 for the FreeIPMI default
    pub timeout: u32,
    pub workaround_flags: Vec<String>,
    pub collectors: Vec<CollectorName>,
    pub exclude_sensor_ids: Vec<i64>,
    pub exclude_sensor_types: Vec<String>,
    /// Replacement binary per collector name
    pub collector_cmd: HashMap<String, String>,
    /// Replacement argument list per collector name
    pub custom_args: HashMap<String, Vec<String>>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            pass: String::new(),
            privilege: String::new(),
            driver: String::new(),
            timeout: 0,
            workaround_flags: Vec::new(),
            collectors: DEFAULT_COLLECTORS.to_vec(),
            exclude_sensor_ids: Vec::new(),
            exclude_sensor_types: Vec::new(),
            collector_cmd: HashMap::new(),
            custom_args: HashMap::new(),
        }
    }
}

impl fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("user", &self.user)
            .field("pass", &if self.pass.is_empty() { "" } else { "<secret>" })
            .field("privilege", &self.privilege)
            .field("driver", &self.driver)
            .field("timeout", &self.timeout)
            .field("workaround_flags", &self.workaround_flags)
            .field("collectors", &self.collectors)
            .field("exclude_sensor_ids", &self.exclude_sensor_ids)
            .field("exclude_sensor_types", &self.exclude_sensor_types)
            .field("collector_cmd", &self.collector_cmd)
            .field("custom_args", &self.custom_args)
            .finish()
    }
}

impl ModuleConfig {
    /// Check override keys and fill in default collectors.
    pub(crate) fn validate(&mut self, module: &str) -> Result<()> {
        if self.collectors.is_empty() {
            self.collectors = DEFAULT_COLLECTORS.to_vec();
        }
        for key in self.collector_cmd.keys().chain(self.custom_args.keys()) {
            CollectorName::from_str(key).map_err(|e| {
                ExporterError::config_error(format!("module {}: {}", module, e))
            })?;
        }
        Ok(())
    }

    /// Render the FreeIPMI config-file blob for this module.
    pub fn freeipmi_config(&self) -> String {
        let mut config = String::new();
        if !self.driver.is_empty() {
            config.push_str(&format!("driver-type {}\n", self.driver));
        }
        if !self.privilege.is_empty() {
            config.push_str(&format!("privilege-level {}\n", self.privilege));
        }
        if !self.user.is_empty() {
            config.push_str(&format!("username {}\n", self.user));
        }
        if !self.pass.is_empty() {
            config.push_str(&format!("password {}\n", escape_password(&self.pass)));
        }
        if self.timeout != 0 {
            config.push_str(&format!("session-timeout {}\n", self.timeout));
        }
        if !self.workaround_flags.is_empty() {
            config.push_str("workaround-flags");
            for flag in &self.workaround_flags {
                config.push(' ');
                config.push_str(flag);
            }
            config.push('\n');
        }
        config
    }

    pub fn exclude_sensor_id_set(&self) -> HashSet<i64> {
        self.exclude_sensor_ids.iter().copied().collect()
    }

    /// Binary override for a collector, if configured.
    pub fn command_override(&self, name: CollectorName) -> Option<&str> {
        self.collector_cmd.get(name.as_str()).map(String::as_str)
    }

    /// Argument override for a collector, if configured.
    pub fn args_override(&self, name: CollectorName) -> Option<&[String]> {
        self.custom_args.get(name.as_str()).map(Vec::as_slice)
    }
}
