use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ipmi_exporter::freeipmi::{get_chassis_power_state, get_sensor_data, ToolOutput};
use ipmi_exporter::metrics::collectors::sensors;
use ipmi_exporter::metrics::exposition;
use ipmi_exporter::metrics::sink::drain;
use ipmi_exporter::{MetricSink, ModuleConfig, Target};
use std::collections::HashSet;

/// A sensor listing with `rows` rows cycling through the common units
fn sensor_table(rows: usize) -> String {
    let kinds = [
        ("Fan", "Nominal", "4200", "RPM"),
        ("Temperature", "Warning", "71.00", "C"),
        ("Voltage", "Nominal", "12.10", "V"),
        ("Current", "Nominal", "0.80", "A"),
        ("Power Supply", "Critical", "N/A", "N/A"),
    ];
    (0..rows)
        .map(|i| {
            let (kind, state, value, unit) = kinds[i % kinds.len()];
            format!("{},Sensor {},{},{},{},{},'OK'\n", i, i, kind, state, value, unit)
        })
        .collect()
}

/// Benchmark CSV decoding of sensor listings
fn bench_sensor_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sensor_parsing");
    for rows in [10, 100, 500] {
        let output = ToolOutput::success(sensor_table(rows));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &output, |b, output| {
            b.iter(|| get_sensor_data(output, &HashSet::new()).expect("Should parse"))
        });
    }
    group.finish();
}

/// Benchmark single-value extraction
fn bench_value_extraction(c: &mut Criterion) {
    let output = ToolOutput::success(
        "System Power                        : on\n\
         Power overload                      : false\n\
         Drive Fault                         : false\n\
         Cooling/fan fault                   : false\n",
    );
    c.bench_function("chassis_power_state", |b| {
        b.iter(|| get_chassis_power_state(&output).expect("Should extract"))
    });
}

/// Benchmark a sensor collection through the text encoder
fn bench_collect_and_encode(c: &mut Criterion) {
    let output = ToolOutput::success(sensor_table(100));
    let target = Target::new("bmc-01", ModuleConfig::default());
    c.bench_function("collect_and_encode_100_sensors", |b| {
        b.iter(|| {
            let (sink, mut rx) = MetricSink::channel();
            sensors::collect(&output, &sink, &target, &HashSet::new(), &[]).expect("Should collect");
            exposition::encode(&drain(&mut rx)).expect("Should encode")
        })
    });
}

criterion_group!(
    benches,
    bench_sensor_parsing,
    bench_value_extraction,
    bench_collect_and_encode
);
criterion_main!(benches);
