//! Collectors, scrape orchestration and metric exposition.
//!
//! A scrape resolves a module, runs each enabled [`collector::Collector`]
//! through an [`traits::Executor`], and funnels the resulting samples through
//! a [`sink::MetricSink`] into the Prometheus text format.

pub mod collector;
pub mod collectors;
pub mod descriptors;
pub mod exposition;
pub mod scrape;
pub mod sink;
pub mod traits;

// Re-export commonly used items
pub use collector::{Collector, CollectorName, Target};
pub use scrape::Scraper;
pub use sink::{MetricDesc, MetricSink, Sample};
pub use traits::Executor;
