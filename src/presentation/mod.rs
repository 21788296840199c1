// Presentation layer - HTTP and WebSocket surface
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod live;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    city_panel, classify, compare_panel, forecast_panel, health_check, history_panel,
    improving_panel, list_cities, overview_panel, stream_dashboard, train_panel, trends_panel,
};
use crate::presentation::live::live_handler;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Compression is done per response (or per frame when streaming), so no
/// CompressionLayer here
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/classify", get(classify))
        .route("/cities", get(list_cities))
        .route("/panels/city/:name", get(city_panel))
        .route("/panels/city/:name/history", get(history_panel))
        .route("/panels/overview", get(overview_panel))
        .route("/panels/compare", get(compare_panel))
        .route("/panels/improving", get(improving_panel))
        .route("/panels/forecast", post(forecast_panel))
        .route("/panels/forecast-trends", get(trends_panel))
        .route("/panels/train", post(train_panel))
        .route("/dashboards/:city", get(stream_dashboard))
        .route("/live", get(live_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
