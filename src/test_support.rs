// Shared fixtures for tests: an in-process upstream and a canned AqiApi
use crate::application::aqi_api::{AqiApi, UpstreamError, UpstreamResult};
use crate::domain::reading::{
    AqiReading, ForecastPoint, ForecastSeries, ForecastTrends, ImprovingCity, TrainingOutcome,
};
use crate::infrastructure::config::UpstreamSettings;
use async_trait::async_trait;
use axum::Router;
use std::collections::HashMap;
use std::time::Duration;

/// Serve `router` on an ephemeral port and return its base URL
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn upstream_settings(base_url: &str) -> UpstreamSettings {
    UpstreamSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..UpstreamSettings::default()
    }
}

/// Canned responses keyed by city; anything missing is a 404
#[derive(Default)]
pub struct StubApi {
    pub readings: HashMap<String, AqiReading>,
    pub histories: HashMap<String, Vec<AqiReading>>,
    pub compare: Vec<AqiReading>,
    pub improving: Option<UpstreamResult<Vec<ImprovingCity>>>,
    pub forecasts: HashMap<String, ForecastSeries>,
    pub trends: Option<UpstreamResult<ForecastTrends>>,
    pub training: Option<UpstreamResult<TrainingOutcome>>,
    /// Artificial latency per city, for supersede tests
    pub delays: HashMap<String, Duration>,
}

impl StubApi {
    pub fn with_reading(mut self, reading: AqiReading) -> Self {
        self.readings.insert(reading.city.clone(), reading);
        self
    }

    pub fn with_delay(mut self, city: &str, delay: Duration) -> Self {
        self.delays.insert(city.to_string(), delay);
        self
    }

    async fn pause(&self, city: &str) {
        if let Some(delay) = self.delays.get(city) {
            tokio::time::sleep(*delay).await;
        }
    }
}

pub fn tokyo_forecast(days: u32) -> ForecastSeries {
    let predictions = (0..days)
        .map(|i| ForecastPoint {
            date: format!("2024-02-{:02}", i + 1),
            predicted_aqi: 80.0 + i as f64 * 2.0,
        })
        .collect();
    ForecastSeries::new(predictions, Some(60.0), Some(95.0))
}

fn not_found(what: &str) -> UpstreamError {
    UpstreamError::NotFound(format!("{} not found", what))
}

#[async_trait]
impl AqiApi for StubApi {
    async fn current_reading(&self, city: &str) -> UpstreamResult<AqiReading> {
        self.pause(city).await;
        self.readings.get(city).cloned().ok_or_else(|| not_found(city))
    }

    async fn history(&self, city: &str) -> UpstreamResult<Vec<AqiReading>> {
        self.pause(city).await;
        self.histories.get(city).cloned().ok_or_else(|| not_found(city))
    }

    async fn compare(&self) -> UpstreamResult<Vec<AqiReading>> {
        Ok(self.compare.clone())
    }

    async fn improving_cities(&self) -> UpstreamResult<Vec<ImprovingCity>> {
        self.improving.clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn forecast(&self, city: &str, days: u32) -> UpstreamResult<ForecastSeries> {
        self.pause(city).await;
        match self.forecasts.get(city) {
            Some(series) => {
                let mut series = series.clone();
                series.predictions.truncate(days as usize);
                Ok(series)
            }
            None => Err(UpstreamError::Domain {
                message: format!("Model not trained for {}. Please train the model first.", city),
                action: Some("/panels/train".to_string()),
            }),
        }
    }

    async fn forecast_trends(&self) -> UpstreamResult<ForecastTrends> {
        self.trends.clone().unwrap_or_else(|| Ok(ForecastTrends::default()))
    }

    async fn train_model(&self) -> UpstreamResult<TrainingOutcome> {
        self.training
            .clone()
            .unwrap_or_else(|| Err(UpstreamError::Status { status: 500, message: "boom".into() }))
    }
}
