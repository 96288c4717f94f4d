//! Extraction of values from FreeIPMI tool output.
//!
//! All functions are pure. Line-oriented values are found with labeled
//! regular expressions; the sensor listing is decoded as CSV.

use super::{SensorData, SensorState, ToolOutput};
use crate::error::{ExporterError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;

/// Number of columns in `ipmi-sensors --comma-separated-output --output-sensor-state`.
const SENSOR_FIELDS: usize = 7;

const RAW_RESPONSE_PREFIX: &str = "rcvd: ";

lazy_static! {
    static ref DCMI_CURRENT_POWER: Regex =
        pattern(r"^Current Power\s*:\s*(?P<value>[0-9.]*)\s*Watts.*");
    static ref DCMI_POWER_MEASUREMENT: Regex =
        pattern(r"^Power Measurement\s*:\s*(?P<value>Active|Not\sAvailable).*");
    static ref CHASSIS_POWER: Regex = pattern(r"^System Power\s*:\s(?P<value>.*)");
    static ref CHASSIS_DRIVE_FAULT: Regex = pattern(r"^Drive Fault\s*:\s(?P<value>.*)");
    static ref CHASSIS_COOLING_FAULT: Regex = pattern(r"^Cooling/fan fault\s*:\s(?P<value>.*)");
    static ref SEL_ENTRIES: Regex = pattern(r"^Number of log entries\s*:\s(?P<value>[0-9.]*)");
    static ref SEL_FREE_SPACE: Regex =
        pattern(r"^Free space remaining\s*:\s(?P<value>[0-9.]*)\s*bytes.*");
    static ref BMC_FIRMWARE_REVISION: Regex =
        pattern(r"^Firmware Revision\s*:\s*(?P<value>[0-9.]*).*");
    static ref BMC_SYSTEM_FIRMWARE_VERSION: Regex =
        pattern(r"^System Firmware Version\s*:\s*(?P<value>[0-9.]*).*");
    static ref BMC_MANUFACTURER_ID: Regex = pattern(r"^Manufacturer ID\s*:\s*(?P<value>.*)");
}

fn pattern(re: &str) -> Regex {
    match Regex::new(re) {
        Ok(regex) => regex,
        Err(e) => panic!("invalid output pattern {}: {}", re, e),
    }
}

/// First `value` capture of `regex` over the lines of `output`.
fn find_value(output: &str, regex: &Regex) -> Option<String> {
    output.lines().find_map(|line| {
        regex
            .captures(line)
            .and_then(|caps| caps.name("value"))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Like [`find_value`], but a missing value is an error carrying the raw output.
pub fn get_value(output: &str, regex: &Regex) -> Result<String> {
    find_value(output, regex)
        .ok_or_else(|| ExporterError::parse_error(format!("could not find value in output: {}", output)))
}

/// The output of a successful invocation, or its error.
fn checked_output(result: &ToolOutput) -> Result<Cow<'_, str>> {
    match result.error_with_output() {
        Some(err) => Err(err),
        None => Ok(result.output_str()),
    }
}

fn parse_float(value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|e| ExporterError::parse_error(format!("invalid number {:?}: {}", value, e)))
}

/// Decode the CSV sensor listing, dropping rows whose ID is excluded.
///
/// Columns are `id, name, type, state, value, unit, event`. A value of
/// `N/A` becomes NaN. Any malformed row fails the whole table.
pub fn get_sensor_data(result: &ToolOutput, exclude_ids: &HashSet<i64>) -> Result<Vec<SensorData>> {
    checked_output(result)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(result.output());

    let mut sensors = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != SENSOR_FIELDS {
            return Err(ExporterError::parse_error(format!(
                "expected {} fields in sensor row, got {}: {:?}",
                SENSOR_FIELDS,
                record.len(),
                record
            )));
        }

        let id = record[0]
            .parse::<i64>()
            .map_err(|e| ExporterError::parse_error(format!("invalid sensor id {:?}: {}", &record[0], e)))?;
        if exclude_ids.contains(&id) {
            continue;
        }

        let value = match &record[4] {
            "N/A" => f64::NAN,
            raw => parse_float(raw)?,
        };

        sensors.push(SensorData {
            id,
            name: record[1].to_string(),
            sensor_type: record[2].to_string(),
            state: SensorState::from(&record[3]),
            value,
            unit: record[5].to_string(),
            event: record[6].trim_matches('\'').to_string(),
        });
    }

    Ok(sensors)
}

/// Current power draw in watts from `ipmi-dcmi --get-system-power-statistics`.
pub fn get_current_power_consumption(result: &ToolOutput) -> Result<f64> {
    let output = checked_output(result)?;
    parse_float(&get_value(&output, &DCMI_CURRENT_POWER)?)
}

/// Whether DCMI power measurement is active; `None` if the tool did not say.
pub fn get_power_measurement_state(result: &ToolOutput) -> Result<Option<f64>> {
    let output = checked_output(result)?;
    Ok(find_value(&output, &DCMI_POWER_MEASUREMENT).map(|v| if v == "Active" { 1.0 } else { 0.0 }))
}

/// System power state: 1 when on, 0 otherwise.
pub fn get_chassis_power_state(result: &ToolOutput) -> Result<f64> {
    let output = checked_output(result)?;
    let value = get_value(&output, &CHASSIS_POWER)?;
    Ok(if value == "on" { 1.0 } else { 0.0 })
}

/// Drive fault flag; `None` when the BMC does not report it.
pub fn get_chassis_drive_fault(result: &ToolOutput) -> Result<Option<f64>> {
    chassis_flag(result, &CHASSIS_DRIVE_FAULT)
}

/// Cooling/fan fault flag; `None` when the BMC does not report it.
pub fn get_chassis_cooling_fault(result: &ToolOutput) -> Result<Option<f64>> {
    chassis_flag(result, &CHASSIS_COOLING_FAULT)
}

fn chassis_flag(result: &ToolOutput, regex: &Regex) -> Result<Option<f64>> {
    let output = checked_output(result)?;
    Ok(find_value(&output, regex).map(|v| if v == "true" { 1.0 } else { 0.0 }))
}

/// Identity fields survive a failed `bmc-info`: the value is looked up first
/// and the command error only surfaces when the lookup fails too.
fn recover_value(result: &ToolOutput, regex: &Regex) -> Result<String> {
    let output = result.output_str();
    match get_value(&output, regex) {
        Ok(value) => Ok(value),
        Err(parse_err) => Err(result.error_with_output().unwrap_or(parse_err)),
    }
}

/// BMC firmware revision, recovered from partial output when possible.
pub fn get_bmc_info_firmware_revision(result: &ToolOutput) -> Result<String> {
    recover_value(result, &BMC_FIRMWARE_REVISION)
}

/// BMC manufacturer ID, recovered from partial output when possible.
pub fn get_bmc_info_manufacturer_id(result: &ToolOutput) -> Result<String> {
    recover_value(result, &BMC_MANUFACTURER_ID)
}

pub fn get_bmc_info_system_firmware_version(result: &ToolOutput) -> Result<String> {
    let output = checked_output(result)?;
    get_value(&output, &BMC_SYSTEM_FIRMWARE_VERSION)
}

/// Number of entries in the system event log.
pub fn get_sel_info_entries_count(result: &ToolOutput) -> Result<f64> {
    let output = checked_output(result)?;
    parse_float(&get_value(&output, &SEL_ENTRIES)?)
}

/// Free space left in the system event log, in bytes.
pub fn get_sel_info_free_space(result: &ToolOutput) -> Result<f64> {
    let output = checked_output(result)?;
    parse_float(&get_value(&output, &SEL_FREE_SPACE)?)
}

/// Hex octets of an `ipmi-raw` response (`rcvd: 30 70 01`).
pub fn get_raw_octets(result: &ToolOutput) -> Result<Vec<String>> {
    let output = checked_output(result)?;
    let trimmed = output.trim_matches(|c| c == ' ' || c == '\r' || c == '\n');
    let octets = trimmed
        .strip_prefix(RAW_RESPONSE_PREFIX)
        .ok_or_else(|| ExporterError::parse_error(format!("unexpected raw response: {}", trimmed)))?;
    Ok(octets.split_whitespace().map(str::to_string).collect())
}
