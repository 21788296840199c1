// Application state for HTTP handlers
use crate::application::aqi_api::AqiApi;
use crate::application::panel_service::PanelService;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::{DashboardConfig, PanelConfig, PanelKind};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub panel_service: PanelService,
    pub streaming_service: StreamingDashboardService,
    pub cities: Vec<String>,
}

impl AppState {
    pub fn new(api: Arc<dyn AqiApi>, dashboard: &DashboardConfig) -> Self {
        let panel_service = PanelService::new(api, dashboard);
        let streaming_service = StreamingDashboardService::new(
            panel_service.clone(),
            dashboard.panels.clone(),
            Duration::from_secs(dashboard.view_timeout_secs),
        );
        Self {
            panel_service,
            streaming_service,
            cities: dashboard.cities.clone(),
        }
    }

    pub fn view_timeout(&self) -> Duration {
        self.streaming_service.view_timeout()
    }

    /// The configured panel of `kind`, or a bare one when the dashboard does
    /// not list it
    pub fn panel_for(&self, kind: PanelKind) -> PanelConfig {
        self.streaming_service
            .panels()
            .iter()
            .find(|p| p.kind == kind)
            .cloned()
            .unwrap_or_else(|| PanelConfig::for_kind(kind))
    }
}
