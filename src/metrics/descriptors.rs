//! Metric families exported by the collectors.

use super::sink::MetricDesc;

const ID_NAME: &[&str] = &["id", "name"];
const ID_NAME_TYPE: &[&str] = &["id", "name", "type"];

pub static UP: MetricDesc = MetricDesc {
    name: "ipmi_up",
    help: "'1' if a scrape of the IPMI device was successful, '0' otherwise.",
    labels: &["collector"],
};

pub static SCRAPE_DURATION: MetricDesc = MetricDesc {
    name: "ipmi_scrape_duration_seconds",
    help: "Returns how long the scrape took to complete in seconds.",
    labels: &[],
};

pub static FAN_SPEED: MetricDesc = MetricDesc {
    name: "ipmi_fan_speed_rpm",
    help: "Fan speed in rotations per minute.",
    labels: ID_NAME,
};

pub static FAN_SPEED_STATE: MetricDesc = MetricDesc {
    name: "ipmi_fan_speed_state",
    help: "Reported state of a fan speed sensor (0=nominal, 1=warning, 2=critical).",
    labels: ID_NAME,
};

pub static TEMPERATURE: MetricDesc = MetricDesc {
    name: "ipmi_temperature_celsius",
    help: "Temperature reading in degree Celsius.",
    labels: ID_NAME,
};

pub static TEMPERATURE_STATE: MetricDesc = MetricDesc {
    name: "ipmi_temperature_state",
    help: "Reported state of a temperature sensor (0=nominal, 1=warning, 2=critical).",
    labels: ID_NAME,
};

pub static CURRENT: MetricDesc = MetricDesc {
    name: "ipmi_current_amperes",
    help: "Current reading in Amperes.",
    labels: ID_NAME,
};

pub static CURRENT_STATE: MetricDesc = MetricDesc {
    name: "ipmi_current_state",
    help: "Reported state of a current sensor (0=nominal, 1=warning, 2=critical).",
    labels: ID_NAME,
};

pub static VOLTAGE: MetricDesc = MetricDesc {
    name: "ipmi_voltage_volts",
    help: "Voltage reading in Volts.",
    labels: ID_NAME,
};

pub static VOLTAGE_STATE: MetricDesc = MetricDesc {
    name: "ipmi_voltage_state",
    help: "Reported state of a voltage sensor (0=nominal, 1=warning, 2=critical).",
    labels: ID_NAME,
};

pub static POWER: MetricDesc = MetricDesc {
    name: "ipmi_power_watts",
    help: "Power reading in Watts.",
    labels: ID_NAME,
};

pub static POWER_STATE: MetricDesc = MetricDesc {
    name: "ipmi_power_state",
    help: "Reported state of a power sensor (0=nominal, 1=warning, 2=critical).",
    labels: ID_NAME,
};

pub static SENSOR_VALUE: MetricDesc = MetricDesc {
    name: "ipmi_sensor_value",
    help: "Generic data read from an IPMI sensor of unknown type, relying on labels for context.",
    labels: ID_NAME_TYPE,
};

pub static SENSOR_STATE: MetricDesc = MetricDesc {
    name: "ipmi_sensor_state",
    help: "Indicates the severity of the state reported by an IPMI sensor (0=nominal, 1=warning, 2=critical).",
    labels: ID_NAME_TYPE,
};

pub static CHASSIS_POWER_STATE: MetricDesc = MetricDesc {
    name: "ipmi_chassis_power_state",
    help: "Current power state (1=on, 0=off).",
    labels: &[],
};

pub static CHASSIS_DRIVE_FAULT_STATE: MetricDesc = MetricDesc {
    name: "ipmi_chassis_drive_fault_state",
    help: "Current drive fault state (1=true, 0=false).",
    labels: &[],
};

pub static CHASSIS_COOLING_FAULT_STATE: MetricDesc = MetricDesc {
    name: "ipmi_chassis_cooling_fault_state",
    help: "Current cooling/fan fault state (1=true, 0=false).",
    labels: &[],
};

pub static DCMI_POWER_CONSUMPTION: MetricDesc = MetricDesc {
    name: "ipmi_dcmi_power_consumption_watts",
    help: "Current power consumption in Watts.",
    labels: &[],
};

pub static DCMI_POWER_MEASUREMENT_ACTIVE: MetricDesc = MetricDesc {
    name: "ipmi_dcmi_power_measurement_active",
    help: "Whether DCMI power measurement is active (1=active, 0=not available).",
    labels: &[],
};

pub static BMC_INFO: MetricDesc = MetricDesc {
    name: "ipmi_bmc_info",
    help: "Constant metric with value '1' providing details about the BMC.",
    labels: &["firmware_revision", "manufacturer_id", "system_firmware_version"],
};

pub static SEL_ENTRIES_COUNT: MetricDesc = MetricDesc {
    name: "ipmi_sel_logs_count",
    help: "Current number of log entries in the SEL.",
    labels: &[],
};

pub static SEL_FREE_SPACE: MetricDesc = MetricDesc {
    name: "ipmi_sel_free_space_bytes",
    help: "Current free space remaining for new SEL entries.",
    labels: &[],
};

pub static LAN_MODE: MetricDesc = MetricDesc {
    name: "ipmi_config_lan_mode",
    help: "Returns configured LAN mode (0=dedicated, 1=shared, 2=failover).",
    labels: &[],
};
