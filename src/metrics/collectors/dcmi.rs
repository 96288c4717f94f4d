//! DCMI power draw from `ipmi-dcmi`.

use crate::error::Result;
use crate::freeipmi::{get_current_power_consumption, get_power_measurement_state, ToolOutput};
use crate::metrics::collector::Target;
use crate::metrics::descriptors::{DCMI_POWER_CONSUMPTION, DCMI_POWER_MEASUREMENT_ACTIVE};
use crate::metrics::sink::MetricSink;
use tracing::error;

pub const COMMAND: &str = "ipmi-dcmi";
pub const ARGS: &[&str] = &["--get-system-power-statistics"];

pub fn collect(result: &ToolOutput, sink: &MetricSink, target: &Target) -> Result<()> {
    let extracted = get_current_power_consumption(result)
        .and_then(|watts| Ok((watts, get_power_measurement_state(result)?)));
    let (watts, measurement) = extracted.map_err(|e| {
        error!(host = target.name(), error = %e, "Failed to collect DCMI data");
        e
    })?;

    sink.emit(&DCMI_POWER_CONSUMPTION, watts, &[]);
    if let Some(active) = measurement {
        sink.emit(&DCMI_POWER_MEASUREMENT_ACTIVE, active, &[]);
    }
    Ok(())
}
