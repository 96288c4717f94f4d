//! Chassis status from `ipmi-chassis`.

use crate::error::Result;
use crate::freeipmi::{
    get_chassis_cooling_fault, get_chassis_drive_fault, get_chassis_power_state, ToolOutput,
};
use crate::metrics::collector::Target;
use crate::metrics::descriptors::{
    CHASSIS_COOLING_FAULT_STATE, CHASSIS_DRIVE_FAULT_STATE, CHASSIS_POWER_STATE,
};
use crate::metrics::sink::MetricSink;
use tracing::error;

pub const COMMAND: &str = "ipmi-chassis";
pub const ARGS: &[&str] = &["--get-chassis-status"];

pub fn collect(result: &ToolOutput, sink: &MetricSink, target: &Target) -> Result<()> {
    let extracted = get_chassis_power_state(result).and_then(|power| {
        Ok((
            power,
            get_chassis_drive_fault(result)?,
            get_chassis_cooling_fault(result)?,
        ))
    });
    let (power, drive_fault, cooling_fault) = extracted.map_err(|e| {
        error!(host = target.name(), error = %e, "Failed to collect chassis data");
        e
    })?;

    sink.emit(&CHASSIS_POWER_STATE, power, &[]);
    // Older BMCs omit the fault lines.
    if let Some(value) = drive_fault {
        sink.emit(&CHASSIS_DRIVE_FAULT_STATE, value, &[]);
    }
    if let Some(value) = cooling_fault {
        sink.emit(&CHASSIS_COOLING_FAULT_STATE, value, &[]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleConfig;
    use crate::error::ExporterError;
    use crate::metrics::sink::drain;

    #[test]
    fn test_chassis_power_and_faults() {
        let (sink, mut rx) = MetricSink::channel();
        let output = "\
System Power                        : on
Power overload                      : false
Drive Fault                         : false
Cooling/fan fault                   : true
";
        collect(&ToolOutput::success(output), &sink, &Target::new("bmc-01", ModuleConfig::default())).unwrap();
        let samples = drain(&mut rx);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].desc, &CHASSIS_POWER_STATE);
        assert_eq!(samples[0].value, 1.0);
        assert_eq!(samples[1].value, 0.0);
        assert_eq!(samples[2].value, 1.0);
    }

    #[test]
    fn test_chassis_off_without_faults() {
        let (sink, mut rx) = MetricSink::channel();
        collect(&ToolOutput::success("System Power : off\n"), &sink, &Target::new("", ModuleConfig::default())).unwrap();
        let samples = drain(&mut rx);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 0.0);
    }

    #[test]
    fn test_chassis_command_failure() {
        let (sink, mut rx) = MetricSink::channel();
        let result = ToolOutput::failure(
            "System Power : on\n",
            ExporterError::command_error("ipmi-chassis", "exit status: 1"),
        );
        assert!(collect(&result, &sink, &Target::new("bmc-01", ModuleConfig::default())).is_err());
        assert!(drain(&mut rx).is_empty());
    }
}
