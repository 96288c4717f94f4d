//! Per-family collectors: command, arguments and output-to-metrics mapping.

pub mod bmc;
pub mod chassis;
pub mod dcmi;
pub mod sel;
pub mod sensors;
pub mod sm_lan_mode;
