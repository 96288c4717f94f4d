//! Output channel for metric samples produced during a scrape.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Static description of a metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

/// One gauge value with its label values, in `desc.labels` order.
#[derive(Debug, Clone)]
pub struct Sample {
    pub desc: &'static MetricDesc,
    pub value: f64,
    pub labels: Vec<String>,
}

/// Producer side of the sample channel. Emitting never blocks.
#[derive(Debug, Clone)]
pub struct MetricSink {
    tx: UnboundedSender<Sample>,
}

impl MetricSink {
    /// Create a sink and the receiver that drains it.
    pub fn channel() -> (Self, UnboundedReceiver<Sample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, desc: &'static MetricDesc, value: f64, labels: &[&str]) {
        debug_assert_eq!(desc.labels.len(), labels.len(), "label count for {}", desc.name);
        let sample = Sample {
            desc,
            value,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        };
        if self.tx.send(sample).is_err() {
            debug!(metric = desc.name, "Metric receiver dropped, discarding sample");
        }
    }
}

/// Take every sample currently queued.
pub fn drain(rx: &mut UnboundedReceiver<Sample>) -> Vec<Sample> {
    let mut samples = Vec::new();
    while let Ok(sample) = rx.try_recv() {
        samples.push(sample);
    }
    samples
}
