use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_assignment_pair(level: &'static str, outcome: &'static str) {
    metrics::counter!("assignment_pairs_total", "level" => level, "outcome" => outcome)
        .increment(1);
}

pub(crate) fn record_parent_cascade(kind: &'static str) {
    metrics::counter!("cascade_parent_updates_total", "kind" => kind).increment(1);
}

pub(crate) fn record_date_pair(outcome: &'static str) {
    metrics::counter!("date_pairs_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_report_created() {
    metrics::counter!("reports_created_total").increment(1);
}
