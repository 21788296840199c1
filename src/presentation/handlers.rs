// HTTP request handlers
use crate::application::fetch_view::{settled, FetchState, FetchView};
use crate::domain::classifier::{AqiScale, Classification};
use crate::domain::panel::{PanelBody, ViewError, ViewErrorKind};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::config::{PanelConfig, PanelKind};
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

const TRAIN_PANEL_ID: &str = "train";
const TRAIN_PANEL_TITLE: &str = "Model Training";
const TRAIN_PANEL_ICON: &str = "cpu";

#[derive(Deserialize)]
pub struct ClassifyQuery {
    pub aqi: Option<String>,
    pub scale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub aqi: Option<f64>,
    pub scale: AqiScale,
    #[serde(flatten)]
    pub classification: Classification,
    pub advice: &'static str,
}

#[derive(Deserialize)]
pub struct ForecastRequest {
    pub city: String,
    pub days: Option<u32>,
}

/// One panel as the front end receives it: header plus its settled state
#[derive(Debug, Serialize)]
pub struct PanelView {
    pub id: String,
    pub title: String,
    pub icon: &'static str,
    pub state: FetchState<PanelBody>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn classify(
    Query(query): Query<ClassifyQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let aqi = parse_aqi(query.aqi.as_deref())?;
    let scale = match query.scale.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw.parse::<AqiScale>().map_err(ApiError::Validation)?,
        None => state.panel_service.scale(),
    };

    let classification = scale.classify(aqi);
    let body = ClassifyResponse {
        aqi,
        scale,
        classification,
        advice: scale.health_advice(&classification),
    };
    json_response(StatusCode::OK, &body, accepts_brotli(&headers))
        .await
        .map_err(|status| ApiError::Internal(status.to_string()))
}

/// Missing or blank means "no reading"; anything else must be a finite number
fn parse_aqi(raw: Option<&str>) -> Result<Option<f64>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ApiError::Validation(format!(
            "aqi must be a number, got '{}'",
            raw
        ))),
    }
}

pub async fn list_cities(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(&state.cities, accepts_brotli(&headers)).await
}

pub async fn city_panel(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let panel = state.panel_for(PanelKind::CurrentReading);
    let service = state.panel_service.clone();
    render_panel(&state, &panel, accepts_brotli(&headers), async move {
        service.city_card(&name).await
    })
    .await
}

pub async fn history_panel(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let panel = state.panel_for(PanelKind::History);
    let service = state.panel_service.clone();
    render_panel(&state, &panel, accepts_brotli(&headers), async move {
        service.history_chart(&name).await
    })
    .await
}

/// Panels that need no input beyond their config
pub async fn overview_panel(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    configured_panel(&state, PanelKind::CityOverview, &headers).await
}

pub async fn compare_panel(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    configured_panel(&state, PanelKind::Compare, &headers).await
}

pub async fn improving_panel(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    configured_panel(&state, PanelKind::Improving, &headers).await
}

pub async fn trends_panel(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    configured_panel(&state, PanelKind::ForecastTrends, &headers).await
}

pub async fn forecast_panel(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Response {
    let panel = state.panel_for(PanelKind::Forecast);
    let service = state.panel_service.clone();
    let days = request.days.or(panel.days);
    render_panel(&state, &panel, accepts_brotli(&headers), async move {
        service.forecast_chart(&request.city, days).await
    })
    .await
}

pub async fn train_panel(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let service = state.panel_service.clone();
    let panel_state = settle(&state, async move { service.training_report().await }).await;
    let view = PanelView {
        id: TRAIN_PANEL_ID.to_string(),
        title: TRAIN_PANEL_TITLE.to_string(),
        icon: TRAIN_PANEL_ICON,
        state: panel_state,
    };
    respond(&view, accepts_brotli(&headers)).await
}

/// Stream every configured panel for one city (progressive loading)
pub async fn stream_dashboard(
    Path(city): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let rx = state.streaming_service.stream_dashboard(&city).await;
    stream_from_receiver(rx, compress).await
}

async fn configured_panel(state: &AppState, kind: PanelKind, headers: &HeaderMap) -> Response {
    let panel = state.panel_for(kind);
    let service = state.panel_service.clone();
    let config = panel.clone();
    render_panel(state, &panel, accepts_brotli(headers), async move {
        service.load(&config, None).await
    })
    .await
}

async fn render_panel<F>(state: &AppState, panel: &PanelConfig, compress: bool, request: F) -> Response
where
    F: Future<Output = Result<PanelBody, ViewError>> + Send + 'static,
{
    let view = PanelView {
        id: panel.id.clone(),
        title: panel.title.clone(),
        icon: panel.kind.icon(),
        state: settle(state, request).await,
    };
    respond(&view, compress).await
}

/// Run one request through a fetch view and wait for its final state
async fn settle<F>(state: &AppState, request: F) -> FetchState<PanelBody>
where
    F: Future<Output = Result<PanelBody, ViewError>> + Send + 'static,
{
    let view = FetchView::new(state.view_timeout());
    view.load(request);
    let mut rx = view.subscribe();
    settled(&mut rx).await.unwrap_or_else(|| {
        FetchState::Error(ViewError::new(
            ViewErrorKind::Upstream,
            "Request was cancelled.",
        ))
    })
}

async fn respond<T: Serialize>(data: &T, compress: bool) -> Response {
    match json_response(StatusCode::OK, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
