//! Prometheus text encoding of scrape samples.

use super::sink::Sample;
use crate::error::Result;
use prometheus::{GaugeVec, Opts, Registry, TextEncoder};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Encode samples in the Prometheus text exposition format.
///
/// A fresh registry is built for every call, so families only appear when
/// a collector emitted them during this scrape.
pub fn encode(samples: &[Sample]) -> Result<String> {
    let registry = Registry::new();
    let mut families: HashMap<&'static str, GaugeVec> = HashMap::new();

    for sample in samples {
        let gauge = match families.entry(sample.desc.name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let desc = sample.desc;
                let family = GaugeVec::new(Opts::new(desc.name, desc.help), desc.labels)?;
                registry.register(Box::new(family.clone()))?;
                entry.insert(family)
            }
        };
        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
        gauge.get_metric_with_label_values(&labels)?.set(sample.value);
    }

    let mut buffer = String::new();
    TextEncoder::new().encode_utf8(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}
