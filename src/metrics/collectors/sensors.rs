//! Sensor readings from `ipmi-sensors`.

use crate::error::Result;
use crate::freeipmi::{get_sensor_data, SensorData, SensorState, ToolOutput};
use crate::metrics::collector::Target;
use crate::metrics::descriptors::*;
use crate::metrics::sink::{MetricDesc, MetricSink};
use std::collections::HashSet;
use tracing::{debug, error, warn};

pub const COMMAND: &str = "ipmi-sensors";

const ARGS: [&str; 5] = [
    "-Q",
    "--ignore-unrecognized-events",
    "--comma-separated-output",
    "--no-header-output",
    "--output-sensor-state",
];

/// Listing arguments, with excluded sensor types folded into one flag.
pub fn arguments(exclude_types: &[String]) -> Vec<String> {
    let mut args: Vec<String> = ARGS.iter().map(|arg| arg.to_string()).collect();
    if !exclude_types.is_empty() {
        args.push(format!("--exclude-sensor-types={}", exclude_types.join(",")));
    }
    args
}

pub fn collect(
    result: &ToolOutput,
    sink: &MetricSink,
    target: &Target,
    exclude_ids: &HashSet<i64>,
    exclude_types: &[String],
) -> Result<()> {
    let sensors = get_sensor_data(result, exclude_ids).map_err(|e| {
        error!(host = target.name(), error = %e, "Failed to collect sensor data");
        e
    })?;

    for data in sensors {
        if type_excluded(&data.sensor_type, exclude_types) {
            debug!(host = target.name(), sensor = %data.name, "Skipping excluded sensor type");
            continue;
        }

        let state = match &data.state {
            SensorState::Unknown(raw) => {
                warn!(
                    host = target.name(),
                    sensor = %data.name,
                    state = %raw,
                    "Unknown sensor state"
                );
                f64::NAN
            }
            known => known.severity(),
        };

        match data.unit.as_str() {
            "RPM" => typed(sink, &FAN_SPEED, &FAN_SPEED_STATE, state, &data),
            "C" => typed(sink, &TEMPERATURE, &TEMPERATURE_STATE, state, &data),
            "A" => typed(sink, &CURRENT, &CURRENT_STATE, state, &data),
            "V" => typed(sink, &VOLTAGE, &VOLTAGE_STATE, state, &data),
            "W" => typed(sink, &POWER, &POWER_STATE, state, &data),
            _ => generic(sink, state, &data),
        }
    }
    Ok(())
}

fn typed(
    sink: &MetricSink,
    value_desc: &'static MetricDesc,
    state_desc: &'static MetricDesc,
    state: f64,
    data: &SensorData,
) {
    let id = data.id.to_string();
    sink.emit(value_desc, data.value, &[id.as_str(), data.name.as_str()]);
    sink.emit(state_desc, state, &[id.as_str(), data.name.as_str()]);
}

fn generic(sink: &MetricSink, state: f64, data: &SensorData) {
    let id = data.id.to_string();
    sink.emit(&SENSOR_VALUE, data.value, &[id.as_str(), data.name.as_str(), data.sensor_type.as_str()]);
    sink.emit(&SENSOR_STATE, state, &[id.as_str(), data.name.as_str(), data.sensor_type.as_str()]);
}

/// FreeIPMI accepts type names with `_` or `-` for spaces, in any case.
fn type_excluded(sensor_type: &str, exclude_types: &[String]) -> bool {
    let normalize = |s: &str| s.to_lowercase().replace(['_', '-'], " ");
    let sensor_type = normalize(sensor_type);
    exclude_types.iter().any(|t| normalize(t) == sensor_type)
}
