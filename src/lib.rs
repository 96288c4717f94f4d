//! # ipmi_exporter
//!
//! Prometheus exporter for server management controllers (BMCs), built on
//! top of the FreeIPMI command-line tools.
//!
//! ## Features
//!
//! - **Sensor readings**: fans, temperatures, currents, voltages and power
//! - **Chassis, DCMI, BMC info and SEL** collectors, plus the Supermicro LAN mode
//! - **Credential safety**: passwords reach FreeIPMI through a named pipe,
//!   never through process arguments or files on disk
//! - **Multi-target**: scrape the local BMC or remote ones over LAN
//! - **Library + Binary**: use as a crate or standalone exporter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ipmi_exporter::{FreeipmiExecutor, SafeConfig, ScrapeSettings, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = Scraper::new(FreeipmiExecutor, ScrapeSettings::default(), SafeConfig::default());
//!     let text = scraper.scrape_text("10.0.0.42", "default").await?;
//!     print!("{}", text);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod freeipmi;
pub mod metrics;
pub mod sdr_cache;
pub mod web;

// Re-export public API
pub use config::{ExporterConfig, ModuleConfig, SafeConfig, ScrapeSettings, DEFAULT_MODULE};
pub use error::{ExporterError, Result};
pub use freeipmi::{FreeipmiExecutor, SensorData, SensorState, ToolOutput};
pub use metrics::{Collector, CollectorName, Executor, MetricSink, Scraper, Target};
pub use web::{start_web_server, WebConfig};

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 9290;
