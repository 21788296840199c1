// Panel view models - what a front end renders for each dashboard view
use super::classifier::Classification;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewErrorKind {
    Network,
    Timeout,
    NotFound,
    Upstream,
    Domain,
    Validation,
}

/// Error a panel displays in place of its data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub kind: ViewErrorKind,
    pub message: String,
    /// Where the user can go to resolve the error, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ViewError {
    pub fn new(kind: ViewErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ViewErrorKind::Validation, message)
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ViewError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pollutants {
    pub pm2_5: String,
    pub pm10: String,
    pub no2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityCard {
    pub city: String,
    pub aqi: String,
    pub classification: Classification,
    pub advice: &'static str,
    pub date: String,
    pub pollutants: Pollutants,
}

/// Current cards for several cities at once, in configured city order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityOverview {
    pub cards: Vec<CityCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryChart {
    pub city: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRow {
    pub rank: usize,
    pub city: String,
    pub aqi: String,
    pub date: String,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareTable {
    pub rows: Vec<CompareRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovingEntry {
    pub city: String,
    pub slope_per_year: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovingList {
    pub entries: Vec<ImprovingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub text: String,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastChart {
    pub city: String,
    pub days: u32,
    pub points: Vec<ChartPoint>,
    pub lowest: ForecastSummary,
    pub highest: ForecastSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendCard {
    pub city: String,
    pub current: String,
    pub future: String,
    pub change: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendsBoard {
    pub improving: Vec<TrendCard>,
    pub worsening: Vec<TrendCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub status: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelBody {
    CityCard(CityCard),
    CityOverview(CityOverview),
    HistoryChart(HistoryChart),
    CompareTable(CompareTable),
    ImprovingList(ImprovingList),
    ForecastChart(ForecastChart),
    TrendsBoard(TrendsBoard),
    TrainingReport(TrainingReport),
    Empty { message: String },
}

impl PanelBody {
    pub fn empty(message: impl Into<String>) -> Self {
        PanelBody::Empty {
            message: message.into(),
        }
    }
}

/// AQI values are shown as whole numbers
pub fn format_aqi(aqi: Option<f64>) -> String {
    match aqi {
        Some(value) if value.is_finite() => format!("{}", value.round() as i64),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Pollutant concentrations keep one decimal place
pub fn format_pollutant(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Render an ISO date or timestamp as M/D/YYYY; anything unparsable is shown
/// as received
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%-m/%-d/%Y").to_string(),
        None => raw.to_string(),
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// Full timestamp for ordering; bare dates sort at midnight and zoned
/// timestamps are compared in UTC
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

pub fn format_change(change: f64) -> String {
    // Adding 0.0 turns a rounded -0.0 into 0.0
    let rounded = (change * 10.0).round() / 10.0 + 0.0;
    if rounded > 0.0 {
        format!("+{}", rounded)
    } else {
        format!("{}", rounded)
    }
}
