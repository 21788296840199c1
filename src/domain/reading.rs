// Air quality domain models
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiReading {
    pub city: String,
    pub aqi: Option<f64>,
    pub reading_date: Option<String>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub created_at: Option<String>,
}

impl AqiReading {
    pub fn new(city: impl Into<String>, aqi: Option<f64>) -> Self {
        Self {
            city: city.into(),
            aqi,
            reading_date: None,
            pm2_5: None,
            pm10: None,
            no2: None,
            created_at: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.reading_date = Some(date.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: String,
    pub predicted_aqi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub predictions: Vec<ForecastPoint>,
    pub lowest_aqi: Option<f64>,
    pub highest_aqi: Option<f64>,
}

impl ForecastSeries {
    /// Build a series, deriving the extremes from the points when the
    /// producer did not report them
    pub fn new(
        predictions: Vec<ForecastPoint>,
        lowest_aqi: Option<f64>,
        highest_aqi: Option<f64>,
    ) -> Self {
        let values = || predictions.iter().map(|p| p.predicted_aqi).filter(|v| !v.is_nan());
        let lowest_aqi = lowest_aqi.or_else(|| values().reduce(f64::min));
        let highest_aqi = highest_aqi.or_else(|| values().reduce(f64::max));
        Self {
            predictions,
            lowest_aqi,
            highest_aqi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovingCity {
    pub city: String,
    pub slope_per_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTrend {
    pub city: String,
    pub current_forecast: Option<f64>,
    pub future_forecast: Option<f64>,
    pub change: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastTrends {
    pub improving: Vec<ForecastTrend>,
    pub worsening: Vec<ForecastTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOutcome {
    pub status: String,
    pub message: Option<String>,
    pub mean_squared_error: Option<f64>,
    pub trained_models: Vec<String>,
}

impl TrainingOutcome {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}
