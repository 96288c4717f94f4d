//! The closed set of collectors sharing the scrape loop.
//!
//! Each collector knows which FreeIPMI binary to run, with which arguments,
//! and how to turn the tool output into samples. Configuration refers to
//! collectors by [`CollectorName`]; a scrape resolves those names into
//! [`Collector`] values carrying whatever module settings they need.

use super::collectors::{bmc, chassis, dcmi, sel, sensors, sm_lan_mode};
use super::sink::MetricSink;
use crate::config::ModuleConfig;
use crate::error::{ExporterError, Result};
use crate::freeipmi::ToolOutput;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Identifier of a collector in configuration and in the `collector` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectorName {
    /// Sensor readings from `ipmi-sensors`
    Ipmi,
    Dcmi,
    Bmc,
    Chassis,
    Sel,
    SmLanMode,
}

impl CollectorName {
    pub const ALL: [CollectorName; 6] = [
        CollectorName::Ipmi,
        CollectorName::Dcmi,
        CollectorName::Bmc,
        CollectorName::Chassis,
        CollectorName::Sel,
        CollectorName::SmLanMode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectorName::Ipmi => "ipmi",
            CollectorName::Dcmi => "dcmi",
            CollectorName::Bmc => "bmc",
            CollectorName::Chassis => "chassis",
            CollectorName::Sel => "sel",
            CollectorName::SmLanMode => "sm-lan-mode",
        }
    }
}

impl fmt::Display for CollectorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectorName {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self> {
        CollectorName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ExporterError::config_error(format!("unknown collector {:?}", s)))
    }
}

/// Display name of a target host for logs.
pub fn target_name(host: &str) -> &str {
    if host.is_empty() {
        "[local]"
    } else {
        host
    }
}

/// The BMC being scraped and the module resolved for it.
#[derive(Debug, Clone)]
pub struct Target {
    /// Remote host, or empty for the local BMC
    pub host: String,
    pub config: ModuleConfig,
}

impl Target {
    pub fn new(host: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            host: host.into(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        target_name(&self.host)
    }

    pub fn is_local(&self) -> bool {
        self.host.is_empty()
    }
}

/// A collector ready to run against one target.
#[derive(Debug, Clone, PartialEq)]
pub enum Collector {
    Sensors {
        exclude_ids: HashSet<i64>,
        exclude_types: Vec<String>,
    },
    Dcmi,
    Bmc,
    Chassis,
    Sel,
    SmLanMode,
}

impl Collector {
    /// Build the collector behind `name` with the settings of `config`.
    pub fn resolve(name: CollectorName, config: &ModuleConfig) -> Self {
        match name {
            CollectorName::Ipmi => Collector::Sensors {
                exclude_ids: config.exclude_sensor_id_set(),
                exclude_types: config.exclude_sensor_types.clone(),
            },
            CollectorName::Dcmi => Collector::Dcmi,
            CollectorName::Bmc => Collector::Bmc,
            CollectorName::Chassis => Collector::Chassis,
            CollectorName::Sel => Collector::Sel,
            CollectorName::SmLanMode => Collector::SmLanMode,
        }
    }

    pub fn name(&self) -> CollectorName {
        match self {
            Collector::Sensors { .. } => CollectorName::Ipmi,
            Collector::Dcmi => CollectorName::Dcmi,
            Collector::Bmc => CollectorName::Bmc,
            Collector::Chassis => CollectorName::Chassis,
            Collector::Sel => CollectorName::Sel,
            Collector::SmLanMode => CollectorName::SmLanMode,
        }
    }

    /// FreeIPMI binary this collector runs.
    pub fn command(&self) -> &'static str {
        match self {
            Collector::Sensors { .. } => sensors::COMMAND,
            Collector::Dcmi => dcmi::COMMAND,
            Collector::Bmc => bmc::COMMAND,
            Collector::Chassis => chassis::COMMAND,
            Collector::Sel => sel::COMMAND,
            Collector::SmLanMode => sm_lan_mode::COMMAND,
        }
    }

    pub fn arguments(&self) -> Vec<String> {
        match self {
            Collector::Sensors { exclude_types, .. } => sensors::arguments(exclude_types),
            Collector::Dcmi => to_args(dcmi::ARGS),
            Collector::Bmc => to_args(bmc::ARGS),
            Collector::Chassis => to_args(chassis::ARGS),
            Collector::Sel => to_args(sel::ARGS),
            Collector::SmLanMode => to_args(sm_lan_mode::ARGS),
        }
    }

    /// Turn the tool output into samples.
    ///
    /// On error nothing has been emitted and the error has been logged.
    pub fn collect(&self, result: &ToolOutput, sink: &MetricSink, target: &Target) -> Result<()> {
        match self {
            Collector::Sensors {
                exclude_ids,
                exclude_types,
            } => sensors::collect(result, sink, target, exclude_ids, exclude_types),
            Collector::Dcmi => dcmi::collect(result, sink, target),
            Collector::Bmc => bmc::collect(result, sink, target),
            Collector::Chassis => chassis::collect(result, sink, target),
            Collector::Sel => sel::collect(result, sink, target),
            Collector::SmLanMode => sm_lan_mode::collect(result, sink, target),
        }
    }
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}
