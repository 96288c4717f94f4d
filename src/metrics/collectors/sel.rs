//! System event log usage from `ipmi-sel`.

use crate::error::Result;
use crate::freeipmi::{get_sel_info_entries_count, get_sel_info_free_space, ToolOutput};
use crate::metrics::collector::Target;
use crate::metrics::descriptors::{SEL_ENTRIES_COUNT, SEL_FREE_SPACE};
use crate::metrics::sink::MetricSink;
use tracing::error;

pub const COMMAND: &str = "ipmi-sel";
pub const ARGS: &[&str] = &["--info"];

pub fn collect(result: &ToolOutput, sink: &MetricSink, target: &Target) -> Result<()> {
    let extracted = get_sel_info_entries_count(result)
        .and_then(|entries| Ok((entries, get_sel_info_free_space(result)?)));
    let (entries, free_space) = extracted.map_err(|e| {
        error!(host = target.name(), error = %e, "Failed to collect SEL data");
        e
    })?;

    sink.emit(&SEL_ENTRIES_COUNT, entries, &[]);
    sink.emit(&SEL_FREE_SPACE, free_space, &[]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleConfig;
    use crate::metrics::sink::drain;

    #[test]
    fn test_sel_info() {
        let (sink, mut rx) = MetricSink::channel();
        let output = "\
SEL version                                      : 1.5
Number of log entries                            : 312
Free space remaining                             : 9840 bytes
Recent erase timestamp                           : 01/01/1970 - 00:00:00
";
        collect(&ToolOutput::success(output), &sink, &Target::new("bmc-01", ModuleConfig::default())).unwrap();
        let samples = drain(&mut rx);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 312.0);
        assert_eq!(samples[1].value, 9840.0);
    }

    #[test]
    fn test_sel_missing_free_space() {
        let (sink, mut rx) = MetricSink::channel();
        let result = ToolOutput::success("Number of log entries : 3\n");
        assert!(collect(&result, &sink, &Target::new("bmc-01", ModuleConfig::default())).is_err());
        assert!(drain(&mut rx).is_empty());
    }
}
