use once_cell::sync::Lazy;
use prometheus::{
    opts, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Registry, TextEncoder,
};

macro_rules! counter_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| IntCounterVec::new(opts!($name, $help), $labels).unwrap())
    };
}
macro_rules! histogram_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            HistogramVec::new(HistogramOpts::new($name, $help).buckets(LATENCY_BUCKETS.to_vec()), $labels)
                .unwrap()
        })
    };
}
macro_rules! gauge {
    ($name:expr, $help:expr) => {
        Lazy::new(|| IntGauge::new($name, $help).unwrap())
    };
}

const LATENCY_BUCKETS: [f64; 12] = [
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

// ── HTTP ────────────────────────────────────────────────────────────────────
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> =
    counter_vec!("http_requests_total", "Total HTTP requests", &["method", "path", "status"]);
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> =
    histogram_vec!("http_request_duration_seconds", "HTTP request latency", &["method", "path"]);
pub static HTTP_IN_FLIGHT: Lazy<IntGauge> = gauge!("http_requests_in_flight", "In-flight HTTP requests");

// ── Registration ────────────────────────────────────────────────────────────
pub static REGISTRATIONS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "registrations_total",
    "Registration attempts by outcome",
    &["outcome"]
);
pub static FIELD_VALIDATIONS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "field_validations_total",
    "Interactive field checks",
    &["field", "valid"]
);

// ── Locations ───────────────────────────────────────────────────────────────
pub static GEO_LOOKUPS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "geo_lookups_total",
    "Location lookups by resource and source",
    &["resource", "source"]
);

// ── Admin ───────────────────────────────────────────────────────────────────
pub static ADMIN_LOGINS_TOTAL: Lazy<IntCounterVec> =
    counter_vec!("admin_logins_total", "Admin login attempts", &["outcome"]);

pub fn register_all(r: &Registry) -> prometheus::Result<()> {
    r.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    r.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    r.register(Box::new(HTTP_IN_FLIGHT.clone()))?;
    r.register(Box::new(REGISTRATIONS_TOTAL.clone()))?;
    r.register(Box::new(FIELD_VALIDATIONS_TOTAL.clone()))?;
    r.register(Box::new(GEO_LOOKUPS_TOTAL.clone()))?;
    r.register(Box::new(ADMIN_LOGINS_TOTAL.clone()))?;
    Ok(())
}

pub fn gather_metrics(r: &Registry) -> String {
    let encoder = TextEncoder::new();
    let families = r.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}

pub fn observe_http(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn observe_registration(outcome: &str) {
    REGISTRATIONS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn observe_field_validation(field: &str, valid: bool) {
    let valid = if valid { "true" } else { "false" };
    FIELD_VALIDATIONS_TOTAL.with_label_values(&[field, valid]).inc();
}

pub fn observe_geo_lookup(resource: &str, source: &str) {
    GEO_LOOKUPS_TOTAL.with_label_values(&[resource, source]).inc();
}

pub fn observe_admin_login(outcome: &str) {
    ADMIN_LOGINS_TOTAL.with_label_values(&[outcome]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_registry() -> Registry {
        let r = Registry::new_custom(Some("test".into()), None).unwrap();
        register_all(&r).unwrap();
        r
    }

    #[test]
    fn test_http_request_counter() {
        let r = fresh_registry();
        observe_http("GET", "/health", 200, 0.002);
        let out = gather_metrics(&r);
        assert!(out.contains("test_http_requests_total"));
        assert!(out.contains("test_http_request_duration_seconds"));
    }

    #[test]
    fn test_registration_outcomes_are_labelled() {
        let r = fresh_registry();
        observe_registration("created");
        observe_registration("underage");
        let out = gather_metrics(&r);
        assert!(out.contains(r#"outcome="created""#));
        assert!(out.contains(r#"outcome="underage""#));
    }

    #[test]
    fn test_field_validation_counter() {
        let r = fresh_registry();
        observe_field_validation("email", false);
        let out = gather_metrics(&r);
        assert!(out.contains(r#"field="email""#));
        assert!(out.contains(r#"valid="false""#));
    }
}
