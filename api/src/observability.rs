use std::time::Instant;

use anyhow::Result;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::metrics;

pub struct Observability {
    pub registry: Registry,
}

impl Observability {
    /// Install the tracing subscriber and build the metrics registry.
    ///
    /// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the
    /// default filter.
    pub fn init() -> Result<Self> {
        let registry = Self::registry()?;

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "api=debug,registration_api=debug,tower_http=info".into());

        let json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }

        tracing::info!(json_logs = json, "observability initialized");
        Ok(Self { registry })
    }

    /// Registry with every service metric, prefixed `registration_`
    pub fn registry() -> Result<Registry> {
        let registry = Registry::new_custom(Some("registration".into()), None)?;
        metrics::register_all(&registry)?;
        Ok(registry)
    }
}

pub async fn request_logger(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    metrics::HTTP_IN_FLIGHT.inc();
    let response = next.run(req).await;
    metrics::HTTP_IN_FLIGHT.dec();

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::observe_http(method.as_str(), &path, status, elapsed.as_secs_f64());

    tracing::info!("{method} {uri} {status} {}ms", elapsed.as_millis());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_prefixed() {
        let registry = Observability::registry().unwrap();
        metrics::observe_registration("created");
        let families = registry.gather();
        assert!(!families.is_empty());
        for fam in &families {
            assert!(
                fam.get_name().starts_with("registration_"),
                "metric {} missing prefix",
                fam.get_name()
            );
        }
    }
}
