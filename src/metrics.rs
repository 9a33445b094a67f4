use once_cell::sync::Lazy;
use opentelemetry::{
    metrics::{Counter, Histogram, MeterProvider},
    KeyValue,
};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};

use crate::migration::{MigrationAction, UnitStatus};

pub static METRICS: Lazy<TidemarkMetrics> = Lazy::new(TidemarkMetrics::init);

pub struct TidemarkMetrics {
    pub registry: Registry,
    pub provider: SdkMeterProvider,
    pub units_total: Counter<u64>,
    pub unit_duration: Histogram<f64>,
    pub runs_total: Counter<u64>,
}

impl TidemarkMetrics {
    pub fn init() -> Self {
        let registry = Registry::new();
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
            .expect("failed to build prometheus exporter");
        let provider = SdkMeterProvider::builder().with_reader(exporter).build();
        let meter = provider.meter("tidemark");

        let units_total = meter.u64_counter("tidemark_migration_units_total")
            .with_description("Migration units processed, by action and outcome").build();

        let unit_duration = meter.f64_histogram("tidemark_migration_unit_duration_seconds")
            .with_description("Duration of migration unit execution").build();

        let runs_total = meter.u64_counter("tidemark_migration_runs_total")
            .with_description("Migration runs started").build();

        Self {
            registry,
            provider,
            units_total,
            unit_duration,
            runs_total,
        }
    }

    pub fn record_run(&self, action: MigrationAction) {
        self.runs_total.add(1, &[KeyValue::new("action", action.as_str())]);
    }

    pub fn record_unit(
        &self,
        action: MigrationAction,
        status: &UnitStatus,
        elapsed: std::time::Duration,
    ) {
        let outcome = match status {
            UnitStatus::Applied => "applied",
            UnitStatus::Skipped => "skipped",
            UnitStatus::Failed { .. } => "failed",
        };
        let attributes = [
            KeyValue::new("action", action.as_str()),
            KeyValue::new("outcome", outcome),
        ];
        self.units_total.add(1, &attributes);
        self.unit_duration.record(elapsed.as_secs_f64(), &attributes);
    }

    /// Prometheus text exposition of everything recorded so far
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            log::warn!("Failed to encode migration metrics: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_outcomes_are_exported() {
        METRICS.record_run(MigrationAction::Up);
        METRICS.record_unit(
            MigrationAction::Up,
            &UnitStatus::Applied,
            std::time::Duration::from_millis(5),
        );
        let text = METRICS.render();
        assert!(text.contains("tidemark_migration_units_total"));
        assert!(text.contains("outcome=\"applied\""));
    }
}
