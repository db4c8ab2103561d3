use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{admin, config::HttpConfig, handlers, observability, state::AppState};

pub fn registration_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/api/validate", post(handlers::validate_field))
}

pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/api/countries", get(handlers::list_countries))
        .route("/api/states/:country_id", get(handlers::list_states))
        .route("/api/cities/:country_id/:state_id", get(handlers::list_cities))
}

pub fn admin_routes(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/admin/registrations", get(admin::handlers::list_registrations))
        .route(
            "/admin/registrations/:id",
            get(admin::handlers::get_registration).delete(admin::handlers::delete_registration),
        )
        .route("/admin/export.csv", get(admin::handlers::export_csv))
        .route_layer(middleware::from_fn_with_state(state, admin::require_admin));

    Router::new()
        .route("/admin/login", post(admin::handlers::login))
        .route("/admin/logout", post(admin::handlers::logout))
        .merge(guarded)
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

pub fn observability_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(handlers::metrics_endpoint))
}

fn cors_layer(http: &HttpConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = if http.cors_origins.is_empty() {
        vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5000"),
        ]
    } else {
        http.cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect()
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Complete application router with middleware
pub fn app(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .merge(registration_routes())
        .merge(location_routes())
        .merge(admin_routes(state.clone()))
        .merge(health_routes())
        .merge(observability_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(observability::request_logger))
        .layer(DefaultBodyLimit::max(http.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(http))
        .with_state(state)
}
