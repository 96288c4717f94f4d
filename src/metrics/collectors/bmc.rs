//! BMC identity from `bmc-info`.

use crate::error::Result;
use crate::freeipmi::{
    get_bmc_info_firmware_revision, get_bmc_info_manufacturer_id,
    get_bmc_info_system_firmware_version, ToolOutput,
};
use crate::metrics::collector::Target;
use crate::metrics::descriptors::BMC_INFO;
use crate::metrics::sink::MetricSink;
use tracing::{debug, error};

pub const COMMAND: &str = "bmc-info";
pub const ARGS: &[&str] = &[];

const NOT_AVAILABLE: &str = "N/A";

pub fn collect(result: &ToolOutput, sink: &MetricSink, target: &Target) -> Result<()> {
    let identity = get_bmc_info_firmware_revision(result)
        .and_then(|revision| Ok((revision, get_bmc_info_manufacturer_id(result)?)));
    let (firmware_revision, manufacturer_id) = identity.map_err(|e| {
        error!(host = target.name(), error = %e, "Failed to collect BMC data");
        e
    })?;

    let system_firmware_version = match get_bmc_info_system_firmware_version(result) {
        Ok(version) => version,
        Err(e) => {
            // Not every BMC reports it.
            debug!(host = target.name(), error = %e, "Failed to parse system firmware version");
            NOT_AVAILABLE.to_string()
        }
    };

    sink.emit(
        &BMC_INFO,
        1.0,
        &[
            firmware_revision.as_str(),
            manufacturer_id.as_str(),
            system_firmware_version.as_str(),
        ],
    );
    Ok(())
}
