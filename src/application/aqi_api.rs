// Port for the external AQI / forecast API
use crate::domain::reading::{
    AqiReading, ForecastSeries, ForecastTrends, ImprovingCity, TrainingOutcome,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("could not reach AQI service: {0}")]
    Network(String),

    #[error("AQI service did not answer within {0} seconds")]
    Timeout(u64),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("AQI service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Body parsed but was not the shape the endpoint is known to return
    #[error("unexpected response shape from {endpoint}: {detail}")]
    Shape { endpoint: String, detail: String },

    /// Upstream understood the request but cannot serve it yet
    #[error("{message}")]
    Domain {
        message: String,
        action: Option<String>,
    },
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

#[async_trait]
pub trait AqiApi: Send + Sync {
    /// Latest reading for a city
    async fn current_reading(&self, city: &str) -> UpstreamResult<AqiReading>;

    /// Historical readings for a city, in whatever order the upstream keeps them
    async fn history(&self, city: &str) -> UpstreamResult<Vec<AqiReading>>;

    /// Most polluted cities by latest reading
    async fn compare(&self) -> UpstreamResult<Vec<AqiReading>>;

    async fn improving_cities(&self) -> UpstreamResult<Vec<ImprovingCity>>;

    async fn forecast(&self, city: &str, days: u32) -> UpstreamResult<ForecastSeries>;

    async fn forecast_trends(&self) -> UpstreamResult<ForecastTrends>;

    async fn train_model(&self) -> UpstreamResult<TrainingOutcome>;
}
