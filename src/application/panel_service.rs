// Panel service - loads one configured panel and turns it into a view model
use crate::application::aqi_api::{AqiApi, UpstreamError};
use crate::domain::classifier::AqiScale;
use crate::domain::panel::{
    format_aqi, format_change, format_date, format_pollutant, parse_timestamp, ChartPoint, CityCard,
    CityOverview,
    CompareRow, CompareTable, ForecastChart, ForecastSummary, HistoryChart, ImprovingEntry,
    ImprovingList, PanelBody, Pollutants, TrainingReport, TrendCard, TrendsBoard, ViewError,
    ViewErrorKind, NOT_AVAILABLE,
};
use crate::domain::reading::{AqiReading, ForecastTrend};
use crate::infrastructure::config::{DashboardConfig, PanelConfig, PanelKind};
use futures::future::join_all;
use std::cmp::Ordering;
use std::sync::Arc;

pub const CITY_NOT_FOUND: &str = "City not found or server error.";
pub const NO_DATA: &str = "No data to display.";
pub const NO_CURRENT_DATA: &str = "No current AQI data available.";
pub const NO_IMPROVING_CITIES: &str = "No cities with a consistent improving trend found.";
const DEFAULT_COMPARE_LIMIT: usize = 5;
const DEFAULT_OVERVIEW_LIMIT: usize = 6;

#[derive(Clone)]
pub struct PanelService {
    api: Arc<dyn AqiApi>,
    scale: AqiScale,
    default_forecast_days: u32,
    max_forecast_days: u32,
    cities: Arc<[String]>,
}

impl PanelService {
    pub fn new(api: Arc<dyn AqiApi>, dashboard: &DashboardConfig) -> Self {
        Self {
            api,
            scale: dashboard.scale,
            default_forecast_days: dashboard.default_forecast_days,
            max_forecast_days: dashboard.max_forecast_days,
            cities: dashboard.cities.iter().cloned().collect(),
        }
    }

    pub fn scale(&self) -> AqiScale {
        self.scale
    }

    /// Load any configured panel. City-scoped panels without a city render an
    /// empty prompt instead of calling the upstream.
    pub async fn load(&self, panel: &PanelConfig, city: Option<&str>) -> Result<PanelBody, ViewError> {
        let city = city.filter(|c| !c.trim().is_empty());
        match (panel.kind, city) {
            (kind, None) if kind.is_city_scoped() => Ok(PanelBody::empty(prompt_for(kind))),
            (PanelKind::CurrentReading, Some(city)) => self.city_card(city).await,
            (PanelKind::History, Some(city)) => self.history_chart(city).await,
            (PanelKind::Forecast, Some(city)) => {
                let days = panel.days.unwrap_or(self.default_forecast_days);
                self.forecast_chart(city, Some(days)).await
            }
            (PanelKind::CityOverview, _) => self.city_overview(panel.limit).await,
            (PanelKind::Compare, _) => self.compare_table(panel.limit).await,
            (PanelKind::Improving, _) => self.improving_list().await,
            (PanelKind::ForecastTrends, _) => self.trends_board().await,
            // Remaining city-scoped kinds were matched with a city above
            (_, None) => Ok(PanelBody::empty(NO_DATA)),
        }
    }

    pub async fn city_card(&self, city: &str) -> Result<PanelBody, ViewError> {
        require_city(city)?;
        let reading = match self.api.current_reading(city).await {
            Ok(reading) => reading,
            Err(e) => return recover(PanelKind::CurrentReading, e),
        };

        Ok(PanelBody::CityCard(self.card_for(reading)))
    }

    /// Current readings for every configured city, fetched concurrently.
    /// Cities that fail are left out; the first `limit` that load are shown.
    pub async fn city_overview(&self, limit: Option<usize>) -> Result<PanelBody, ViewError> {
        let requests = self.cities.iter().map(|city| self.api.current_reading(city));
        let results = join_all(requests).await;

        let cards: Vec<CityCard> = results
            .into_iter()
            .zip(self.cities.iter())
            .filter_map(|(result, city)| match result {
                Ok(reading) if !reading.city.trim().is_empty() => Some(reading),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(%city, error = %e, "Leaving city out of overview");
                    None
                }
            })
            .take(limit.unwrap_or(DEFAULT_OVERVIEW_LIMIT))
            .map(|reading| self.card_for(reading))
            .collect();

        if cards.is_empty() {
            return Ok(PanelBody::empty(NO_CURRENT_DATA));
        }
        Ok(PanelBody::CityOverview(CityOverview { cards }))
    }

    pub async fn history_chart(&self, city: &str) -> Result<PanelBody, ViewError> {
        require_city(city)?;
        let mut readings = match self.api.history(city).await {
            Ok(readings) => readings,
            Err(e) => return recover(PanelKind::History, e),
        };
        readings.retain(|r| r.aqi.is_some_and(|v| !v.is_nan()));
        if readings.is_empty() {
            return Ok(PanelBody::empty(NO_DATA));
        }

        // Undated readings sort first, in upstream order
        readings.sort_by_key(|r| r.reading_date.as_deref().and_then(parse_timestamp));
        let points = readings
            .iter()
            .map(|r| self.chart_point(display_date(r), r.aqi.unwrap_or_default()))
            .collect();

        Ok(PanelBody::HistoryChart(HistoryChart {
            city: city.to_string(),
            points,
        }))
    }

    pub async fn compare_table(&self, limit: Option<usize>) -> Result<PanelBody, ViewError> {
        let mut readings = match self.api.compare().await {
            Ok(readings) => readings,
            Err(e) => return recover(PanelKind::Compare, e),
        };
        if readings.is_empty() {
            return Ok(PanelBody::empty(NO_DATA));
        }

        readings.sort_by(|a, b| compare_aqi_desc(a.aqi, b.aqi));
        readings.truncate(limit.unwrap_or(DEFAULT_COMPARE_LIMIT));

        let rows = readings
            .into_iter()
            .enumerate()
            .map(|(index, reading)| CompareRow {
                rank: index + 1,
                aqi: format_aqi(reading.aqi),
                date: display_date(&reading),
                classification: self.scale.classify(reading.aqi),
                city: reading.city,
            })
            .collect();
        Ok(PanelBody::CompareTable(CompareTable { rows }))
    }

    pub async fn improving_list(&self) -> Result<PanelBody, ViewError> {
        let mut cities = match self.api.improving_cities().await {
            Ok(cities) => cities,
            Err(e) => return recover(PanelKind::Improving, e),
        };
        cities.retain(|c| c.slope_per_year < 0.0);
        if cities.is_empty() {
            return Ok(PanelBody::empty(NO_IMPROVING_CITIES));
        }

        cities.sort_by(|a, b| a.slope_per_year.total_cmp(&b.slope_per_year));
        let entries = cities
            .into_iter()
            .map(|c| ImprovingEntry {
                text: format!(
                    "{} (Improving by ~{:.1} AQI points per year)",
                    c.city,
                    c.slope_per_year.abs()
                ),
                city: c.city,
                slope_per_year: c.slope_per_year,
            })
            .collect();
        Ok(PanelBody::ImprovingList(ImprovingList { entries }))
    }

    pub async fn forecast_chart(&self, city: &str, days: Option<u32>) -> Result<PanelBody, ViewError> {
        require_city(city)?;
        let days = days.unwrap_or(self.default_forecast_days);
        if days == 0 || days > self.max_forecast_days {
            return Err(ViewError::validation(format!(
                "Forecast period must be between 1 and {} days.",
                self.max_forecast_days
            )));
        }

        let series = match self.api.forecast(city, days).await {
            Ok(series) => series,
            Err(e) => return recover(PanelKind::Forecast, e),
        };

        let points = series
            .predictions
            .iter()
            .map(|p| self.chart_point(format_date(&p.date), p.predicted_aqi))
            .collect();
        Ok(PanelBody::ForecastChart(ForecastChart {
            city: city.to_string(),
            days,
            points,
            lowest: self.summary("Lowest", series.lowest_aqi),
            highest: self.summary("Highest", series.highest_aqi),
        }))
    }

    pub async fn trends_board(&self) -> Result<PanelBody, ViewError> {
        let trends = match self.api.forecast_trends().await {
            Ok(trends) => trends,
            Err(e) => return recover(PanelKind::ForecastTrends, e),
        };
        Ok(PanelBody::TrendsBoard(TrendsBoard {
            improving: trends.improving.iter().map(trend_card).collect(),
            worsening: trends.worsening.iter().map(trend_card).collect(),
        }))
    }

    pub async fn training_report(&self) -> Result<PanelBody, ViewError> {
        let outcome = match self.api.train_model().await {
            Ok(outcome) => outcome,
            Err(UpstreamError::Shape { endpoint, detail }) => {
                tracing::warn!(%endpoint, %detail, "Unexpected training response");
                return Err(ViewError::new(
                    ViewErrorKind::Upstream,
                    "An error occurred during training.",
                ));
            }
            Err(e) => return Err(to_view_error(None, e)),
        };

        let summary = if !outcome.is_success() {
            format!("Error: {}", outcome.message.as_deref().unwrap_or("Unknown error"))
        } else if !outcome.trained_models.is_empty() {
            format!(
                "Models trained for {} cities: {}",
                outcome.trained_models.len(),
                outcome.trained_models.join(", ")
            )
        } else if let Some(mse) = outcome.mean_squared_error {
            format!("Model trained. Mean squared error: {:.2}", mse)
        } else {
            outcome
                .message
                .clone()
                .unwrap_or_else(|| "Training completed.".to_string())
        };

        Ok(PanelBody::TrainingReport(TrainingReport {
            status: outcome.status,
            summary,
        }))
    }

    fn card_for(&self, reading: AqiReading) -> CityCard {
        let classification = self.scale.classify(reading.aqi);
        CityCard {
            aqi: format_aqi(reading.aqi),
            advice: self.scale.health_advice(&classification),
            classification,
            date: display_date(&reading),
            pollutants: Pollutants {
                pm2_5: format_pollutant(reading.pm2_5),
                pm10: format_pollutant(reading.pm10),
                no2: format_pollutant(reading.no2),
            },
            city: reading.city,
        }
    }

    fn chart_point(&self, label: String, value: f64) -> ChartPoint {
        ChartPoint {
            label,
            value,
            color: self.scale.classify(Some(value)).style.hex,
        }
    }

    fn summary(&self, label: &str, value: Option<f64>) -> ForecastSummary {
        ForecastSummary {
            text: format!("{}: {}", label, format_aqi(value)),
            classification: self.scale.classify(value),
        }
    }
}

fn require_city(city: &str) -> Result<(), ViewError> {
    if city.trim().is_empty() {
        return Err(ViewError::validation("Enter a city name."));
    }
    Ok(())
}

fn prompt_for(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Forecast => "Search for a city to see its forecast.",
        PanelKind::History => "Search for a city to see its history.",
        _ => "Search for a city to see its air quality.",
    }
}

fn display_date(reading: &AqiReading) -> String {
    reading
        .reading_date
        .as_deref()
        .map(format_date)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Highest AQI first; readings without a finite value go last
fn compare_aqi_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|v| v.is_finite());
    let b = b.filter(|v| v.is_finite());
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn trend_card(trend: &ForecastTrend) -> TrendCard {
    TrendCard {
        city: trend.city.clone(),
        current: format_aqi(trend.current_forecast),
        future: format_aqi(trend.future_forecast),
        change: format_change(trend.change),
        icon: if trend.change <= 0.0 {
            "arrow-down-right"
        } else {
            "arrow-up-right"
        },
    }
}

/// Shape errors degrade to an empty panel; everything else becomes the
/// panel's error state
fn recover(kind: PanelKind, error: UpstreamError) -> Result<PanelBody, ViewError> {
    match error {
        UpstreamError::Shape { endpoint, detail } => {
            tracing::warn!(%endpoint, %detail, "Unexpected response shape, rendering empty panel");
            Ok(PanelBody::empty(NO_DATA))
        }
        other => {
            tracing::warn!(?kind, error = %other, "Panel request failed");
            Err(to_view_error(Some(kind), other))
        }
    }
}

pub fn to_view_error(kind: Option<PanelKind>, error: UpstreamError) -> ViewError {
    let fetch_message = match kind {
        Some(PanelKind::CurrentReading) => CITY_NOT_FOUND,
        Some(PanelKind::CityOverview) => NO_CURRENT_DATA,
        Some(PanelKind::History) => "Could not fetch history data.",
        Some(PanelKind::Compare) => "Could not fetch comparison data.",
        Some(PanelKind::Improving) => "Could not fetch improving cities data.",
        Some(PanelKind::Forecast) => "An unexpected error occurred while fetching the prediction.",
        Some(PanelKind::ForecastTrends) => "Failed to fetch trend data.",
        None => "An error occurred during training.",
    };

    match error {
        UpstreamError::Domain { message, action } => {
            let error = ViewError::new(ViewErrorKind::Domain, message);
            match action {
                Some(action) => error.with_action(action),
                None => error,
            }
        }
        UpstreamError::Timeout(secs) => ViewError::new(
            ViewErrorKind::Timeout,
            format!("Request timed out after {} seconds.", secs),
        ),
        UpstreamError::NotFound(_) => ViewError::new(ViewErrorKind::NotFound, fetch_message),
        UpstreamError::Network(_) => ViewError::new(ViewErrorKind::Network, fetch_message),
        // Forecast errors carry the upstream's own explanation when it sent one
        UpstreamError::Status { message, .. }
            if kind == Some(PanelKind::Forecast) && !message.is_empty() =>
        {
            ViewError::new(ViewErrorKind::Upstream, message)
        }
        UpstreamError::Status { .. } | UpstreamError::Shape { .. } => {
            ViewError::new(ViewErrorKind::Upstream, fetch_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::{ForecastTrends, ImprovingCity, TrainingOutcome};
    use crate::test_support::{tokyo_forecast, StubApi};

    fn service(api: StubApi) -> PanelService {
        PanelService::new(Arc::new(api), &DashboardConfig::default())
    }

    #[tokio::test]
    async fn test_city_card_for_found_city() {
        let api = StubApi::default()
            .with_reading(AqiReading::new("Delhi", Some(312.0)).with_date("2024-01-01"));
        let body = service(api).city_card("Delhi").await.unwrap();

        match body {
            PanelBody::CityCard(card) => {
                assert_eq!(card.city, "Delhi");
                assert_eq!(card.aqi, "312");
                assert_eq!(card.classification.category, "Very Unhealthy");
                assert_eq!(card.date, "1/1/2024");
                assert_eq!(card.pollutants.pm2_5, "N/A");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_city_card_not_found() {
        let error = service(StubApi::default()).city_card("Nowhere").await.unwrap_err();
        assert_eq!(error.kind, ViewErrorKind::NotFound);
        assert_eq!(error.message, CITY_NOT_FOUND);
    }

    fn overview_service(api: StubApi, cities: &[&str]) -> PanelService {
        let dashboard = DashboardConfig {
            cities: cities.iter().map(|c| c.to_string()).collect(),
            ..DashboardConfig::default()
        };
        PanelService::new(Arc::new(api), &dashboard)
    }

    #[tokio::test]
    async fn test_city_overview_skips_failed_cities() {
        let api = StubApi::default()
            .with_reading(AqiReading::new("Delhi", Some(275.0)))
            .with_reading(AqiReading::new("Kochi", Some(42.0)))
            .with_reading(AqiReading::new("Patna", Some(160.0)));
        let service = overview_service(api, &["Delhi", "Atlantis", "Kochi", "Patna"]);

        match service.city_overview(Some(2)).await.unwrap() {
            PanelBody::CityOverview(overview) => {
                let cities: Vec<_> = overview.cards.iter().map(|c| c.city.as_str()).collect();
                assert_eq!(cities, vec!["Delhi", "Kochi"]);
                assert_eq!(overview.cards[0].classification.category, "Very Unhealthy");
                assert_eq!(overview.cards[1].classification.category, "Good");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_city_overview_with_no_data() {
        let service = overview_service(StubApi::default(), &["Atlantis", "Lemuria"]);
        let body = service.city_overview(None).await.unwrap();
        assert_eq!(body, PanelBody::empty(NO_CURRENT_DATA));

        let panel = PanelConfig::for_kind(PanelKind::CityOverview);
        assert_eq!(service.load(&panel, None).await.unwrap(), PanelBody::empty(NO_CURRENT_DATA));
    }

    #[tokio::test]
    async fn test_blank_city_is_rejected() {
        let error = service(StubApi::default()).city_card("  ").await.unwrap_err();
        assert_eq!(error.kind, ViewErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_history_sorted_by_date() {
        let mut api = StubApi::default();
        api.histories.insert(
            "Pune".to_string(),
            vec![
                AqiReading::new("Pune", Some(120.0)).with_date("2024-01-03"),
                AqiReading::new("Pune", None).with_date("2024-01-02"),
                AqiReading::new("Pune", Some(40.0)).with_date("2024-01-01"),
            ],
        );
        match service(api).history_chart("Pune").await.unwrap() {
            PanelBody::HistoryChart(chart) => {
                let labels: Vec<_> = chart.points.iter().map(|p| p.label.as_str()).collect();
                assert_eq!(labels, vec!["1/1/2024", "1/3/2024"]);
                assert_eq!(chart.points[0].color, "#059669");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_compare_keeps_fixture_order_categories() {
        let mut api = StubApi::default();
        api.compare = vec![
            AqiReading::new("Paris", Some(42.0)),
            AqiReading::new("Delhi", Some(275.0)),
            AqiReading::new("Oslo", None),
        ];
        match service(api).compare_table(Some(2)).await.unwrap() {
            PanelBody::CompareTable(table) => {
                let categories: Vec<_> =
                    table.rows.iter().map(|r| r.classification.category).collect();
                assert_eq!(categories, vec!["Very Unhealthy", "Good"]);
                assert_eq!(table.rows[0].rank, 1);
                assert_eq!(table.rows[0].city, "Delhi");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_history_orders_readings_within_a_day() {
        let mut api = StubApi::default();
        api.histories.insert(
            "Pune".to_string(),
            vec![
                AqiReading::new("Pune", Some(90.0)).with_date("2024-01-01T18:00:00Z"),
                AqiReading::new("Pune", Some(50.0)).with_date("2024-01-01T06:00:00Z"),
            ],
        );
        match service(api).history_chart("Pune").await.unwrap() {
            PanelBody::HistoryChart(chart) => {
                let values: Vec<f64> = chart.points.iter().map(|p| p.value).collect();
                assert_eq!(values, vec![50.0, 90.0]);
                assert_eq!(chart.points[0].label, "1/1/2024");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_compare_ranks_nan_rows_last() {
        let mut api = StubApi::default();
        api.compare = vec![
            AqiReading::new("Ghost", Some(f64::NAN)),
            AqiReading::new("Delhi", Some(300.0)),
            AqiReading::new("Paris", Some(20.0)),
        ];
        match service(api).compare_table(None).await.unwrap() {
            PanelBody::CompareTable(table) => {
                let cities: Vec<_> = table.rows.iter().map(|r| r.city.as_str()).collect();
                assert_eq!(cities, vec!["Delhi", "Paris", "Ghost"]);
                assert_eq!(table.rows[2].classification.category, "Unknown");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_compare_renders_placeholder() {
        let body = service(StubApi::default()).compare_table(None).await.unwrap();
        assert_eq!(body, PanelBody::empty(NO_DATA));
    }

    #[tokio::test]
    async fn test_improving_list_text() {
        let api = StubApi {
            improving: Some(Ok(vec![
                ImprovingCity { city: "Agra".into(), slope_per_year: -1.04 },
                ImprovingCity { city: "Pune".into(), slope_per_year: -4.26 },
                ImprovingCity { city: "Lima".into(), slope_per_year: 2.0 },
            ])),
            ..StubApi::default()
        };
        match service(api).improving_list().await.unwrap() {
            PanelBody::ImprovingList(list) => {
                assert_eq!(list.entries.len(), 2);
                assert_eq!(list.entries[0].text, "Pune (Improving by ~4.3 AQI points per year)");
                assert_eq!(list.entries[1].city, "Agra");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_improving_errors() {
        let api = StubApi {
            improving: Some(Err(UpstreamError::Network("refused".into()))),
            ..StubApi::default()
        };
        let error = service(api).improving_list().await.unwrap_err();
        assert_eq!(error.message, "Could not fetch improving cities data.");

        let api = StubApi {
            improving: Some(Err(UpstreamError::Shape {
                endpoint: "/api/analytics/improving".into(),
                detail: "expected an array".into(),
            })),
            ..StubApi::default()
        };
        assert_eq!(service(api).improving_list().await.unwrap(), PanelBody::empty(NO_DATA));
    }

    #[tokio::test]
    async fn test_forecast_chart_summary() {
        let mut api = StubApi::default();
        api.forecasts.insert("Tokyo".to_string(), tokyo_forecast(7));
        match service(api).forecast_chart("Tokyo", Some(7)).await.unwrap() {
            PanelBody::ForecastChart(chart) => {
                assert_eq!(chart.points.len(), 7);
                assert_eq!(chart.points[0].label, "2/1/2024");
                assert_eq!(chart.lowest.text, "Lowest: 60");
                assert_eq!(chart.highest.text, "Highest: 95");
                assert_eq!(chart.highest.classification.category, "Moderate");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forecast_untrained_city_points_to_training() {
        let error = service(StubApi::default())
            .forecast_chart("Lagos", Some(7))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ViewErrorKind::Domain);
        assert_eq!(error.action.as_deref(), Some("/panels/train"));
    }

    #[tokio::test]
    async fn test_forecast_days_validated() {
        let svc = service(StubApi::default());
        assert_eq!(
            svc.forecast_chart("Tokyo", Some(0)).await.unwrap_err().kind,
            ViewErrorKind::Validation
        );
        assert_eq!(
            svc.forecast_chart("Tokyo", Some(91)).await.unwrap_err().kind,
            ViewErrorKind::Validation
        );
    }

    #[tokio::test]
    async fn test_trends_board_cards() {
        let api = StubApi {
            trends: Some(Ok(ForecastTrends {
                improving: vec![ForecastTrend {
                    city: "Tokyo".into(),
                    current_forecast: Some(80.0),
                    future_forecast: Some(77.0),
                    change: -3.0,
                }],
                worsening: vec![ForecastTrend {
                    city: "Lima".into(),
                    current_forecast: Some(50.0),
                    future_forecast: Some(55.0),
                    change: 5.0,
                }],
            })),
            ..StubApi::default()
        };
        match service(api).trends_board().await.unwrap() {
            PanelBody::TrendsBoard(board) => {
                assert_eq!(board.improving[0].change, "-3");
                assert_eq!(board.improving[0].icon, "arrow-down-right");
                assert_eq!(board.worsening[0].change, "+5");
                assert_eq!(board.worsening[0].icon, "arrow-up-right");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_training_report_summaries() {
        let api = StubApi {
            training: Some(Ok(TrainingOutcome {
                status: "success".into(),
                message: None,
                mean_squared_error: None,
                trained_models: vec!["Delhi".into(), "Pune".into()],
            })),
            ..StubApi::default()
        };
        match service(api).training_report().await.unwrap() {
            PanelBody::TrainingReport(report) => {
                assert_eq!(report.summary, "Models trained for 2 cities: Delhi, Pune")
            }
            other => panic!("unexpected body {:?}", other),
        }

        let error = service(StubApi::default()).training_report().await.unwrap_err();
        assert_eq!(error.message, "An error occurred during training.");
    }

    #[tokio::test]
    async fn test_city_scoped_panel_without_city() {
        let panel = PanelConfig::new("forecast", "AQI Forecast", PanelKind::Forecast);
        let body = service(StubApi::default()).load(&panel, None).await.unwrap();
        assert_eq!(body, PanelBody::empty("Search for a city to see its forecast."));
    }
}
