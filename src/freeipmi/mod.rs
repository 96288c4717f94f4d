//! Invocation of the FreeIPMI command-line tools and parsing of their output.
//!
//! The tools are treated as black boxes: [`execute`] runs one of them with a
//! credentials blob delivered through a named pipe, and the functions in
//! [`parse`] turn the captured text into typed values.

pub mod execute;
pub mod parse;

pub use execute::{execute, FreeipmiExecutor};
pub use parse::*;

use crate::error::ExporterError;
use std::borrow::Cow;

/// Outcome of a single FreeIPMI tool invocation.
///
/// Output and error are kept together: a failed command may still have
/// printed data that callers can recover.
#[derive(Debug)]
pub struct ToolOutput {
    output: Vec<u8>,
    error: Option<ExporterError>,
}

impl ToolOutput {
    /// Create a result from captured output and an optional failure.
    pub fn new(output: Vec<u8>, error: Option<ExporterError>) -> Self {
        Self { output, error }
    }

    /// A successful invocation.
    pub fn success(output: impl Into<Vec<u8>>) -> Self {
        Self::new(output.into(), None)
    }

    /// A failed invocation, possibly with partial output.
    pub fn failure(output: impl Into<Vec<u8>>, error: ExporterError) -> Self {
        Self::new(output.into(), Some(error))
    }

    /// Raw captured bytes (stdout followed by stderr).
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Captured output as text, lossily decoded.
    pub fn output_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    /// The failure recorded for this invocation, if any.
    pub fn error(&self) -> Option<&ExporterError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The recorded failure annotated with the captured output.
    pub(crate) fn error_with_output(&self) -> Option<ExporterError> {
        let output = self.output_str();
        let output = output.trim();
        self.error.as_ref().map(|err| match err {
            ExporterError::Command { command, reason } => {
                ExporterError::command_error(command.clone(), format!("{}: {}", reason, output))
            }
            ExporterError::Transport(msg) => ExporterError::transport_error(msg.clone()),
            other => ExporterError::command_error("freeipmi", format!("{}: {}", other, output)),
        })
    }
}

/// Health state of a sensor as printed by `ipmi-sensors --output-sensor-state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorState {
    Nominal,
    Warning,
    Critical,
    NotAvailable,
    /// A state string the exporter does not recognize, kept verbatim.
    Unknown(String),
}

impl SensorState {
    /// Numeric severity: 0 nominal, 1 warning, 2 critical, NaN otherwise.
    pub fn severity(&self) -> f64 {
        match self {
            SensorState::Nominal => 0.0,
            SensorState::Warning => 1.0,
            SensorState::Critical => 2.0,
            SensorState::NotAvailable | SensorState::Unknown(_) => f64::NAN,
        }
    }
}

impl From<&str> for SensorState {
    fn from(state: &str) -> Self {
        match state {
            "Nominal" => SensorState::Nominal,
            "Warning" => SensorState::Warning,
            "Critical" => SensorState::Critical,
            "N/A" => SensorState::NotAvailable,
            other => SensorState::Unknown(other.to_string()),
        }
    }
}

/// The reading of a single sensor.
#[derive(Debug, Clone)]
pub struct SensorData {
    pub id: i64,
    pub name: String,
    pub sensor_type: String,
    pub state: SensorState,
    /// NaN when the tool reports the reading as unavailable.
    pub value: f64,
    pub unit: String,
    pub event: String,
}

/// Escape a password for use in a FreeIPMI config file, where `#` starts a comment.
pub fn escape_password(password: &str) -> String {
    password.replace('#', "\\#")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_password() {
        assert_eq!(escape_password("plain"), "plain");
        assert_eq!(escape_password("pa#ss#"), "pa\\#ss\\#");
    }

    #[test]
    fn test_sensor_state_severity() {
        assert_eq!(SensorState::from("Nominal").severity(), 0.0);
        assert_eq!(SensorState::from("Warning").severity(), 1.0);
        assert_eq!(SensorState::from("Critical").severity(), 2.0);
        assert!(SensorState::from("N/A").severity().is_nan());

        let unknown = SensorState::from("Degraded");
        assert_eq!(unknown, SensorState::Unknown("Degraded".to_string()));
        assert!(unknown.severity().is_nan());
    }

    #[test]
    fn test_error_with_output() {
        let result = ToolOutput::failure(
            "partial output\n",
            ExporterError::command_error("bmc-info", "exit status: 1"),
        );
        match result.error_with_output() {
            Some(ExporterError::Command { command, reason }) => {
                assert_eq!(command, "bmc-info");
                assert_eq!(reason, "exit status: 1: partial output");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(ToolOutput::success("ok").error_with_output().is_none());
    }
}
