use crate::domain::classifier::AqiScale;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_city_path")]
    pub city_path: String,
    /// Tried in order; the next template is used when one answers 404
    #[serde(default = "default_history_paths")]
    pub history_paths: Vec<String>,
    #[serde(default = "default_compare_path")]
    pub compare_path: String,
    #[serde(default = "default_improving_path")]
    pub improving_path: String,
    #[serde(default = "default_forecast_path")]
    pub forecast_path: String,
    #[serde(default = "default_forecast_trends_path")]
    pub forecast_trends_path: String,
    #[serde(default = "default_train_paths")]
    pub train_paths: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub scale: AqiScale,
    #[serde(default = "default_view_timeout_secs")]
    pub view_timeout_secs: u64,
    #[serde(default = "default_forecast_days")]
    pub default_forecast_days: u32,
    #[serde(default = "default_max_forecast_days")]
    pub max_forecast_days: u32,
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
    #[serde(default = "default_panels")]
    pub panels: Vec<PanelConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    CurrentReading,
    CityOverview,
    History,
    Compare,
    Improving,
    Forecast,
    ForecastTrends,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PanelStyle {
    Card,
    Table,
    Chart,
    List,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PanelConfig {
    pub id: String,
    pub title: String,
    pub kind: PanelKind,
    pub style: Option<PanelStyle>,
    /// Forecast horizon for forecast panels
    pub days: Option<u32>,
    /// Row limit for table panels
    pub limit: Option<usize>,
}

impl PanelKind {
    /// Whether the panel needs a selected city
    pub fn is_city_scoped(self) -> bool {
        matches!(
            self,
            PanelKind::CurrentReading | PanelKind::History | PanelKind::Forecast
        )
    }

    pub fn default_style(self) -> PanelStyle {
        match self {
            PanelKind::CurrentReading | PanelKind::CityOverview => PanelStyle::Card,
            PanelKind::History | PanelKind::Forecast => PanelStyle::Chart,
            PanelKind::Compare => PanelStyle::Table,
            PanelKind::Improving | PanelKind::ForecastTrends => PanelStyle::List,
        }
    }

    /// Id used when a panel of this kind is built without configuration
    pub fn id(self) -> &'static str {
        match self {
            PanelKind::CurrentReading => "current",
            PanelKind::CityOverview => "overview",
            PanelKind::History => "history",
            PanelKind::Compare => "compare",
            PanelKind::Improving => "improving",
            PanelKind::Forecast => "forecast",
            PanelKind::ForecastTrends => "trends",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PanelKind::CurrentReading => "Current AQI",
            PanelKind::CityOverview => "Current AQI Across Cities",
            PanelKind::History => "AQI History",
            PanelKind::Compare => "Most Polluted Cities",
            PanelKind::Improving => "Cities with Improving Air Quality",
            PanelKind::Forecast => "AQI Forecast",
            PanelKind::ForecastTrends => "Future Trends",
        }
    }

    /// Feather icon name shown in the panel header
    pub fn icon(self) -> &'static str {
        match self {
            PanelKind::CurrentReading => "map-pin",
            PanelKind::CityOverview => "grid",
            PanelKind::History => "bar-chart-2",
            PanelKind::Compare => "list",
            PanelKind::Improving => "smile",
            PanelKind::Forecast => "cloud-drizzle",
            PanelKind::ForecastTrends => "trending-down",
        }
    }
}

impl PanelConfig {
    pub fn new(id: &str, title: &str, kind: PanelKind) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            style: None,
            days: None,
            limit: None,
        }
    }

    pub fn for_kind(kind: PanelKind) -> Self {
        Self::new(kind.id(), kind.title(), kind)
    }

    pub fn style(&self) -> PanelStyle {
        self.style.unwrap_or_else(|| self.kind.default_style())
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_city_path() -> String {
    "/api/city/{city}".to_string()
}

fn default_history_paths() -> Vec<String> {
    vec![
        "/api/city/{city}/history".to_string(),
        "/api/history/{city}".to_string(),
    ]
}

fn default_compare_path() -> String {
    "/api/compare".to_string()
}

fn default_improving_path() -> String {
    "/api/analytics/improving".to_string()
}

fn default_forecast_path() -> String {
    "/api/forecast".to_string()
}

fn default_forecast_trends_path() -> String {
    "/api/forecast-trends".to_string()
}

fn default_train_paths() -> Vec<String> {
    vec!["/api/train-model".to_string(), "/train".to_string()]
}

fn default_view_timeout_secs() -> u64 {
    15
}

fn default_forecast_days() -> u32 {
    30
}

fn default_max_forecast_days() -> u32 {
    90
}

fn default_cities() -> Vec<String> {
    [
        "Ahmedabad", "Aizawl", "Amaravati", "Amritsar", "Bengaluru", "Bhopal", "Chennai",
        "Coimbatore", "Delhi", "Ernakulam", "Gandhinagar", "Gurugram", "Guwahati", "Hyderabad",
        "Jaipur", "Jorapokhar", "Kochi", "Kolkata", "Lucknow", "Mumbai", "Patna", "Shillong",
        "Thiruvananthapuram", "Visakhapatnam",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_panels() -> Vec<PanelConfig> {
    vec![
        PanelConfig::for_kind(PanelKind::CurrentReading),
        PanelConfig::for_kind(PanelKind::History),
        PanelConfig {
            days: Some(default_forecast_days()),
            ..PanelConfig::for_kind(PanelKind::Forecast)
        },
        PanelConfig {
            limit: Some(5),
            ..PanelConfig::for_kind(PanelKind::Compare)
        },
        PanelConfig::for_kind(PanelKind::Improving),
        PanelConfig::for_kind(PanelKind::ForecastTrends),
        PanelConfig {
            limit: Some(6),
            ..PanelConfig::for_kind(PanelKind::CityOverview)
        },
    ]
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            city_path: default_city_path(),
            history_paths: default_history_paths(),
            compare_path: default_compare_path(),
            improving_path: default_improving_path(),
            forecast_path: default_forecast_path(),
            forecast_trends_path: default_forecast_trends_path(),
            train_paths: default_train_paths(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            scale: AqiScale::default(),
            view_timeout_secs: default_view_timeout_secs(),
            default_forecast_days: default_forecast_days(),
            max_forecast_days: default_max_forecast_days(),
            cities: default_cities(),
            panels: default_panels(),
        }
    }
}

/// Load `config/dashboard.toml` if present, overridden by `AQI_DASHBOARD__*`
/// environment variables (e.g. `AQI_DASHBOARD__UPSTREAM__BASE_URL`)
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("AQI_DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

fn validate(config: &AppConfig) -> anyhow::Result<()> {
    let dashboard = &config.dashboard;
    if dashboard.max_forecast_days == 0 {
        anyhow::bail!("dashboard.max_forecast_days must be at least 1");
    }
    if dashboard.default_forecast_days == 0 || dashboard.default_forecast_days > dashboard.max_forecast_days {
        anyhow::bail!(
            "dashboard.default_forecast_days must be between 1 and {}",
            dashboard.max_forecast_days
        );
    }
    if dashboard.view_timeout_secs == 0 {
        anyhow::bail!("dashboard.view_timeout_secs must be at least 1");
    }
    if config.upstream.timeout_secs == 0 {
        anyhow::bail!("upstream.timeout_secs must be at least 1");
    }
    let mut seen = std::collections::HashSet::new();
    for panel in &dashboard.panels {
        if !seen.insert(panel.id.as_str()) {
            anyhow::bail!("duplicate panel id '{}'", panel.id);
        }
        if panel.limit == Some(0) {
            anyhow::bail!("panel '{}' has limit 0; omit it or use at least 1", panel.id);
        }
    }
    if config.upstream.history_paths.is_empty() || config.upstream.train_paths.is_empty() {
        anyhow::bail!("upstream path lists must not be empty");
    }
    Ok(())
}

/// Replace template variables in an endpoint path. Values are percent-encoded
/// so free-text city names stay a single path segment.
pub fn prepare_path(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }
    result
}
