use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static MEMBERS_ENROLLED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PAYMENTS_RECORDED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PAYMENT_AMOUNT_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        return;
    }

    let registry = Registry::new();

    let enrolled_counter = IntCounterVec::new(
        Opts::new(
            "members_enrolled_total",
            "Total members enrolled, by plan",
        ),
        &["plan"],
    )
    .expect("Failed to create members_enrolled_total metric");

    let payments_counter = IntCounterVec::new(
        Opts::new(
            "payments_recorded_total",
            "Total payments recorded, by method",
        ),
        &["method"],
    )
    .expect("Failed to create payments_recorded_total metric");

    let amount_counter = IntCounterVec::new(
        Opts::new(
            "payment_amount_rupees_total",
            "Total settled payment amount in whole rupees, by method",
        ),
        &["method"],
    )
    .expect("Failed to create payment_amount_rupees_total metric");

    registry
        .register(Box::new(enrolled_counter.clone()))
        .expect("Failed to register members_enrolled_total");
    registry
        .register(Box::new(payments_counter.clone()))
        .expect("Failed to register payments_recorded_total");
    registry
        .register(Box::new(amount_counter.clone()))
        .expect("Failed to register payment_amount_rupees_total");

    PROMETHEUS_REGISTRY
        .set(registry)
        .expect("Failed to set prometheus registry");
    MEMBERS_ENROLLED_TOTAL
        .set(enrolled_counter)
        .expect("Failed to set members_enrolled_total");
    PAYMENTS_RECORDED_TOTAL
        .set(payments_counter)
        .expect("Failed to set payments_recorded_total");
    PAYMENT_AMOUNT_TOTAL
        .set(amount_counter)
        .expect("Failed to set payment_amount_rupees_total");
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record an enrollment for dashboard/billing metering.
pub fn record_enrollment(plan: &str) {
    if let Some(counter) = MEMBERS_ENROLLED_TOTAL.get() {
        counter.with_label_values(&[plan]).inc();
    }
}

/// Record a settled payment.
pub fn record_payment(method: &str, amount_rupees: u64) {
    if let Some(counter) = PAYMENTS_RECORDED_TOTAL.get() {
        counter.with_label_values(&[method]).inc();
    }
    if let Some(counter) = PAYMENT_AMOUNT_TOTAL.get() {
        counter.with_label_values(&[method]).inc_by(amount_rupees);
    }
}
