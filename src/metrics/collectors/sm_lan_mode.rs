//! Supermicro LAN mode, read with a raw IPMI request.

use crate::error::{ExporterError, Result};
use crate::freeipmi::{get_raw_octets, ToolOutput};
use crate::metrics::collector::Target;
use crate::metrics::descriptors::LAN_MODE;
use crate::metrics::sink::MetricSink;
use tracing::error;

pub const COMMAND: &str = "ipmi-raw";
pub const ARGS: &[&str] = &["0x0", "0x30", "0x70", "0x0c", "0"];

pub fn collect(result: &ToolOutput, sink: &MetricSink, target: &Target) -> Result<()> {
    let mode = lan_mode(result).map_err(|e| {
        error!(host = target.name(), error = %e, "Failed to collect LAN mode data");
        e
    })?;
    sink.emit(&LAN_MODE, mode, &[]);
    Ok(())
}

/// Decode `30 70 <mode>`: 0 dedicated, 1 shared, 2 failover.
fn lan_mode(result: &ToolOutput) -> Result<f64> {
    let octets = get_raw_octets(result)?;
    if octets.len() != 3 {
        return Err(ExporterError::parse_error(format!(
            "unexpected number of octets in LAN mode response: {:?}",
            octets
        )));
    }
    if octets[0] != "30" || octets[1] != "70" {
        return Err(ExporterError::parse_error(format!(
            "unexpected LAN mode response: {:?}",
            octets
        )));
    }
    let mode = u8::from_str_radix(&octets[2], 16).map_err(|e| {
        ExporterError::parse_error(format!("invalid LAN mode octet {:?}: {}", octets[2], e))
    })?;
    Ok(f64::from(mode))
}
