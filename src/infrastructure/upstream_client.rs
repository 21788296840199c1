// HTTP client for the external AQI API
use crate::application::aqi_api::{AqiApi, UpstreamError, UpstreamResult};
use crate::domain::reading::{
    AqiReading, ForecastSeries, ForecastTrends, ImprovingCity, TrainingOutcome,
};
use crate::infrastructure::config::{prepare_path, UpstreamSettings};
use crate::infrastructure::shape;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Where the user is sent when the forecast model is missing
pub const TRAIN_ACTION: &str = "/panels/train";

#[derive(Debug, Clone)]
pub struct HttpAqiApi {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    settings: UpstreamSettings,
}

impl HttpAqiApi {
    pub fn new(settings: UpstreamSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout_secs: settings.timeout_secs,
            settings,
        })
    }

    fn build_url(&self, template: &str, city: Option<&str>) -> String {
        let mut vars = HashMap::new();
        if let Some(city) = city {
            vars.insert("city".to_string(), city.to_string());
        }
        format!("{}{}", self.base_url, prepare_path(template, &vars))
    }

    async fn execute_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> UpstreamResult<Value> {
        tracing::debug!(%method, url, "Calling AQI service");

        let mut request = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(shape::error_message)
                .unwrap_or_else(|| text.trim().to_string());
            return Err(classify_failure(status, message));
        }

        parsed.ok_or_else(|| UpstreamError::Shape {
            endpoint: url.to_string(),
            detail: "response body is not JSON".to_string(),
        })
    }

    /// Try each path template in turn, moving on only when one answers 404
    async fn execute_first_found(
        &self,
        method: Method,
        templates: &[String],
        city: Option<&str>,
        body: Option<&Value>,
    ) -> UpstreamResult<(String, Value)> {
        let mut last_error = UpstreamError::NotFound("no endpoint configured".to_string());
        for template in templates {
            let url = self.build_url(template, city);
            match self.execute_request(method.clone(), &url, body).await {
                Ok(value) => return Ok((url, value)),
                Err(UpstreamError::NotFound(message)) => {
                    tracing::debug!(url, "Endpoint answered 404, trying next");
                    last_error = UpstreamError::NotFound(message);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error)
    }

    fn transport_error(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(self.timeout_secs)
        } else {
            UpstreamError::Network(error.to_string())
        }
    }
}

fn classify_failure(status: StatusCode, message: String) -> UpstreamError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("train") && (lowered.contains("model") || lowered.contains("first")) {
        return UpstreamError::Domain {
            message,
            action: Some(TRAIN_ACTION.to_string()),
        };
    }
    if status == StatusCode::NOT_FOUND {
        return UpstreamError::NotFound(message);
    }
    UpstreamError::Status {
        status: status.as_u16(),
        message,
    }
}

fn shape_error(endpoint: &str, detail: String) -> UpstreamError {
    UpstreamError::Shape {
        endpoint: endpoint.to_string(),
        detail,
    }
}

#[async_trait]
impl AqiApi for HttpAqiApi {
    async fn current_reading(&self, city: &str) -> UpstreamResult<AqiReading> {
        let url = self.build_url(&self.settings.city_path, Some(city));
        let body = self.execute_request(Method::GET, &url, None).await?;
        shape::reading(&body).map_err(|detail| shape_error(&url, detail))
    }

    async fn history(&self, city: &str) -> UpstreamResult<Vec<AqiReading>> {
        let (url, body) = self
            .execute_first_found(Method::GET, &self.settings.history_paths, Some(city), None)
            .await?;
        shape::readings(&body, shape::HISTORY_KEYS).map_err(|detail| shape_error(&url, detail))
    }

    async fn compare(&self) -> UpstreamResult<Vec<AqiReading>> {
        let url = self.build_url(&self.settings.compare_path, None);
        let body = self.execute_request(Method::GET, &url, None).await?;
        shape::readings(&body, shape::COMPARE_KEYS).map_err(|detail| shape_error(&url, detail))
    }

    async fn improving_cities(&self) -> UpstreamResult<Vec<ImprovingCity>> {
        let url = self.build_url(&self.settings.improving_path, None);
        let body = self.execute_request(Method::GET, &url, None).await?;
        shape::improving_cities(&body).map_err(|detail| shape_error(&url, detail))
    }

    async fn forecast(&self, city: &str, days: u32) -> UpstreamResult<ForecastSeries> {
        let url = self.build_url(&self.settings.forecast_path, None);
        let request = json!({ "city": city, "days": days });
        let body = self.execute_request(Method::POST, &url, Some(&request)).await?;
        shape::forecast(&body).map_err(|detail| shape_error(&url, detail))
    }

    async fn forecast_trends(&self) -> UpstreamResult<ForecastTrends> {
        let url = self.build_url(&self.settings.forecast_trends_path, None);
        let body = self.execute_request(Method::GET, &url, None).await?;
        // Some backends answer 200 with an error body while forecasts are unavailable
        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(classify_failure(StatusCode::OK, message.to_string()));
        }
        shape::forecast_trends(&body).map_err(|detail| shape_error(&url, detail))
    }

    async fn train_model(&self) -> UpstreamResult<TrainingOutcome> {
        let (url, body) = self
            .execute_first_found(Method::POST, &self.settings.train_paths, None, None)
            .await?;
        shape::training_outcome(&body).map_err(|detail| shape_error(&url, detail))
    }
}
