//! Scrape orchestration: one target, one module, every enabled collector.

use super::collector::{target_name, Collector, Target};
use super::descriptors::{SCRAPE_DURATION, UP};
use super::exposition;
use super::sink::{drain, MetricSink};
use super::traits::Executor;
use crate::config::{SafeConfig, ScrapeSettings};
use crate::error::Result;
use crate::sdr_cache;
use std::time::Instant;
use tracing::{debug, error};

/// Value of the `collector` label when the module could not be resolved.
const CONFIG_COLLECTOR: &str = "config";

/// Runs scrapes against BMCs with a shared executor and configuration.
///
/// Holds no per-target state; concurrent scrapes of different targets only
/// share the configuration lock.
pub struct Scraper<E: Executor> {
    executor: E,
    settings: ScrapeSettings,
    config: SafeConfig,
}

impl<E: Executor> Scraper<E> {
    pub fn new(executor: E, settings: ScrapeSettings, config: SafeConfig) -> Self {
        Self {
            executor,
            settings,
            config,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn config(&self) -> &SafeConfig {
        &self.config
    }

    pub fn settings(&self) -> &ScrapeSettings {
        &self.settings
    }

    /// Scrape `host` (empty for the local BMC) with `module`, emitting
    /// samples into `sink`.
    ///
    /// Collectors run one after another in configuration order; a failing
    /// collector is reported down and the next one still runs. Only an
    /// unresolvable module marks the whole scrape down.
    pub async fn scrape(&self, host: &str, module: &str, sink: &MetricSink) {
        let start = Instant::now();

        match self.config.config_for_target(host, module).await {
            Ok(config) => self.run_collectors(Target::new(host, config), sink).await,
            Err(e) => {
                error!(host = target_name(host), module, error = %e, "Failed to resolve module");
                sink.emit(&UP, 0.0, &[CONFIG_COLLECTOR]);
            }
        }

        let duration = start.elapsed().as_secs_f64();
        debug!(host = target_name(host), duration, "Scrape duration");
        sink.emit(&SCRAPE_DURATION, duration, &[]);
    }

    /// Scrape and render the result in the Prometheus text format.
    pub async fn scrape_text(&self, host: &str, module: &str) -> Result<String> {
        let (sink, mut rx) = MetricSink::channel();
        self.scrape(host, module, &sink).await;
        drop(sink);
        exposition::encode(&drain(&mut rx))
    }

    async fn run_collectors(&self, target: Target, sink: &MetricSink) {
        let freeipmi_config = target.config.freeipmi_config();
        sdr_cache::flush_if_stale(&self.executor, &self.settings, &target, &freeipmi_config).await;

        for name in &target.config.collectors {
            let collector = Collector::resolve(*name, &target.config);
            debug!(host = target.name(), collector = %name, "Running collector");

            let command = match target.config.command_override(*name) {
                Some(command) => command.to_string(),
                None => self.settings.command_path(collector.command()),
            };
            let args = match target.config.args_override(*name) {
                Some(args) => args.to_vec(),
                None => collector.arguments(),
            };

            let result = self
                .executor
                .execute(&command, &args, &freeipmi_config, &target.host)
                .await;
            let up = match collector.collect(&result, sink, &target) {
                Ok(()) => 1.0,
                Err(_) => 0.0,
            };
            sink.emit(&UP, up, &[name.as_str()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExporterConfig;
    use crate::metrics::sink::Sample;
    use crate::metrics::traits::testing::RecordingExecutor;

    const SENSORS: &str = "12,Fan1,Fan,Nominal,3200,RPM,'OK'\n20,CPU Temp,Temperature,Nominal,45,C,'OK'\n";
    const CHASSIS: &str = "System Power : on\n";
    const SEL: &str = "Number of log entries : 4\nFree space remaining : 16000 bytes\n";

    const CONFIG: &str = r#"
[modules.default]
user = "admin"
pass = "pa#ss"
collectors = ["ipmi", "dcmi", "chassis", "sel"]

[modules.custom]
collectors = ["dcmi"]

[modules.custom.collector_cmd]
dcmi = "/opt/bin/dcmi-wrapper"

[modules.custom.custom_args]
dcmi = ["--get-enhanced-system-power-statistics"]
"#;

    fn scraper(executor: RecordingExecutor) -> Scraper<RecordingExecutor> {
        let dir = std::env::temp_dir().join("ipmi-exporter-test-no-cache");
        let settings = ScrapeSettings::default()
            .with_executables_path("/usr/sbin")
            .with_sdr_cache_dir(dir);
        let config = SafeConfig::new(ExporterConfig::from_toml(CONFIG).unwrap());
        Scraper::new(executor, settings, config)
    }

    fn up(samples: &[Sample], collector: &str) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.desc.name == "ipmi_up" && s.labels == [collector])
            .map(|s| s.value)
    }

    #[tokio::test]
    async fn test_failing_collector_does_not_stop_others() {
        let executor = RecordingExecutor::default()
            .with_output("ipmi-sensors", SENSORS)
            .with_output("ipmi-dcmi", "garbage")
            .with_output("ipmi-chassis", CHASSIS)
            .with_output("ipmi-sel", SEL);
        let scraper = scraper(executor);
        let (sink, mut rx) = MetricSink::channel();
        scraper.scrape("bmc-01", "default", &sink).await;
        let samples = drain(&mut rx);

        assert_eq!(up(&samples, "ipmi"), Some(1.0));
        assert_eq!(up(&samples, "dcmi"), Some(0.0));
        assert_eq!(up(&samples, "chassis"), Some(1.0));
        assert_eq!(up(&samples, "sel"), Some(1.0));
        assert!(samples.iter().any(|s| s.desc.name == "ipmi_chassis_power_state"));
        assert_eq!(samples.last().unwrap().desc.name, "ipmi_scrape_duration_seconds");

        let calls = scraper.executor.calls();
        let commands: Vec<&str> = calls.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(
            commands,
            vec!["/usr/sbin/ipmi-sensors", "/usr/sbin/ipmi-dcmi", "/usr/sbin/ipmi-chassis", "/usr/sbin/ipmi-sel"]
        );
        assert!(calls.iter().all(|c| c.target == "bmc-01"));
        assert!(calls[0].config.contains("password pa\\#ss"));
    }

    #[tokio::test]
    async fn test_unknown_module_marks_scrape_down() {
        let scraper = scraper(RecordingExecutor::default());
        let (sink, mut rx) = MetricSink::channel();
        scraper.scrape("bmc-01", "missing", &sink).await;
        let samples = drain(&mut rx);

        assert_eq!(samples.len(), 2);
        assert_eq!(up(&samples, "config"), Some(0.0));
        assert_eq!(samples[1].desc.name, "ipmi_scrape_duration_seconds");
        assert!(scraper.executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_command_and_argument_overrides() {
        let executor = RecordingExecutor::default()
            .with_output("dcmi-wrapper", "Current Power : 120 Watts\n");
        let scraper = scraper(executor);
        let text = scraper.scrape_text("", "custom").await.unwrap();

        assert!(text.contains("ipmi_up{collector=\"dcmi\"} 1"));
        assert!(text.contains("ipmi_dcmi_power_consumption_watts 120"));
        let calls = scraper.executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "/opt/bin/dcmi-wrapper");
        assert_eq!(calls[0].args, vec!["--get-enhanced-system-power-statistics"]);
        assert_eq!(calls[0].target, "");
        assert_eq!(calls[0].config, "");
    }

    #[tokio::test]
    async fn test_command_failure_marks_collector_down() {
        let executor = RecordingExecutor::default()
            .with_output("ipmi-sensors", SENSORS)
            .with_failure("ipmi-chassis", "");
        let scraper = scraper(executor);
        let text = scraper.scrape_text("bmc-01", "default").await.unwrap();

        assert!(text.contains("ipmi_up{collector=\"ipmi\"} 1"));
        assert!(text.contains("ipmi_up{collector=\"chassis\"} 0"));
        assert!(text.contains("ipmi_fan_speed_rpm{id=\"12\",name=\"Fan1\"} 3200"));
        assert!(!text.contains("ipmi_chassis_power_state"));
    }
}
