use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod geo;
pub mod models;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod services;
pub mod store;

use config::AppConfig;
use geo::Geocoder;
use store::BloodBankStore;

pub struct AppState {
    pub store: Arc<dyn BloodBankStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub config: AppConfig,
    /// `None` when no Prometheus recorder is installed (tests).
    pub metrics_handle: Option<PrometheusHandle>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route(
            "/profile",
            get(routes::profile::get_profile)
                .post(routes::profile::register_profile)
                .patch(routes::profile::edit_profile),
        )
        .route("/profile/toggle-availability", post(routes::profile::toggle_availability))
        .route("/donors", get(routes::donors::search_donors))
        .route("/donors/nearby", get(routes::donors::nearby_donors))
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/requests",
            get(routes::requests::request_history).post(routes::requests::create_request),
        )
        .route("/requests/:id/accept", post(routes::requests::accept_request))
        .route("/admin/requests/:id/status", post(routes::admin::set_request_status))
        .route("/notifications", get(routes::notifications::list_notifications))
        .route("/notifications/unread-count", get(routes::notifications::unread_count))
        .route("/notifications/mark-all-read", post(routes::notifications::mark_all_read))
        .route("/notifications/:id/read", post(routes::notifications::mark_read))
        .route_layer(axum::middleware::from_fn(
            bloodbank_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
