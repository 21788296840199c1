// Response shape adapters - normalize every upstream variant to domain types
use crate::domain::reading::{
    AqiReading, ForecastPoint, ForecastSeries, ForecastTrend, ForecastTrends, ImprovingCity,
    TrainingOutcome,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Wrapper keys seen around list responses, per endpoint
pub const HISTORY_KEYS: &[&str] = &["history", "readings", "data"];
pub const COMPARE_KEYS: &[&str] = &["cities", "data", "results"];
pub const IMPROVING_KEYS: &[&str] = &["improving_cities", "cities", "data"];

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

/// Accept numbers, numeric strings and null. Non-finite values ("NaN",
/// "inf") count as missing.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberLike>::deserialize(deserializer)?;
    let number = match value {
        Some(NumberLike::Number(n)) => Some(n),
        Some(NumberLike::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

#[derive(Debug, Deserialize)]
struct RawReading {
    city: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    aqi: Option<f64>,
    #[serde(default, alias = "date", alias = "readingDate")]
    reading_date: Option<String>,
    #[serde(default, alias = "pm25", deserialize_with = "lenient_f64")]
    pm2_5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pm10: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    no2: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<RawReading> for AqiReading {
    fn from(raw: RawReading) -> Self {
        AqiReading {
            city: raw.city,
            aqi: raw.aqi,
            reading_date: raw.reading_date.or_else(|| raw.created_at.clone()),
            pm2_5: raw.pm2_5,
            pm10: raw.pm10,
            no2: raw.no2,
            created_at: raw.created_at,
        }
    }
}

/// Older analytics fit AQI against Unix seconds
const SECONDS_PER_YEAR: f64 = 31_536_000.0;

#[derive(Debug, Deserialize)]
struct RawImprovingCity {
    city: String,
    #[serde(default, alias = "slope", deserialize_with = "lenient_f64")]
    slope_per_year: Option<f64>,
    /// AQI per second
    #[serde(default, deserialize_with = "lenient_f64")]
    trend_slope: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawForecastPoint {
    date: String,
    #[serde(default, alias = "aqi", alias = "predictedAqi", deserialize_with = "lenient_f64")]
    predicted_aqi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    predictions: Vec<RawForecastPoint>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lowest_aqi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    highest_aqi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTrend {
    city: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    current_forecast: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    future_forecast: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    change: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTrends {
    #[serde(default)]
    improving: Vec<Value>,
    #[serde(default)]
    worsening: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawTraining {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    mean_squared_error: Option<f64>,
    #[serde(default)]
    trained_models: Vec<String>,
}

/// `{"error": "..."}` bodies, used for both failed statuses and 200s that
/// carry an error
pub fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Locate the list in a response that is either a bare array or an object
/// wrapping the array under one of `keys`
pub fn unwrap_list<'a>(body: &'a Value, keys: &[&str]) -> Result<&'a Vec<Value>, String> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or_else(|| {
                let found: Vec<&str> = map.keys().map(String::as_str).collect();
                format!("expected an array or one of {:?}, found keys {:?}", keys, found)
            }),
        other => Err(format!("expected an array, found {}", kind_of(other))),
    }
}

/// Decode each item, skipping the ones that do not match
fn decode_items<Raw, T>(items: &[Value], what: &str) -> Vec<T>
where
    Raw: DeserializeOwned,
    T: From<Raw>,
{
    items
        .iter()
        .filter_map(|item| match Raw::deserialize(item) {
            Ok(raw) => Some(T::from(raw)),
            Err(e) => {
                tracing::warn!("Skipping malformed {} entry: {}", what, e);
                None
            }
        })
        .collect()
}

pub fn reading(body: &Value) -> Result<AqiReading, String> {
    if !body.is_object() {
        return Err(format!("expected an object, found {}", kind_of(body)));
    }
    RawReading::deserialize(body)
        .map(AqiReading::from)
        .map_err(|e| e.to_string())
}

pub fn readings(body: &Value, keys: &[&str]) -> Result<Vec<AqiReading>, String> {
    let items = unwrap_list(body, keys)?;
    Ok(decode_items::<RawReading, AqiReading>(items, "reading"))
}

impl From<RawImprovingCity> for Option<ImprovingCity> {
    fn from(raw: RawImprovingCity) -> Self {
        let slope = raw
            .slope_per_year
            .or_else(|| raw.trend_slope.map(|per_second| per_second * SECONDS_PER_YEAR));
        slope.map(|slope| ImprovingCity {
            city: raw.city,
            slope_per_year: slope,
        })
    }
}

pub fn improving_cities(body: &Value) -> Result<Vec<ImprovingCity>, String> {
    let items = unwrap_list(body, IMPROVING_KEYS)?;
    Ok(decode_items::<RawImprovingCity, Option<ImprovingCity>>(items, "improving city")
        .into_iter()
        .flatten()
        .collect())
}

pub fn forecast(body: &Value) -> Result<ForecastSeries, String> {
    let raw = RawForecast::deserialize(body).map_err(|e| e.to_string())?;
    let predictions = raw
        .predictions
        .into_iter()
        .filter_map(|p| {
            p.predicted_aqi.map(|aqi| ForecastPoint {
                date: p.date,
                predicted_aqi: aqi,
            })
        })
        .collect();
    Ok(ForecastSeries::new(predictions, raw.lowest_aqi, raw.highest_aqi))
}

impl From<RawTrend> for ForecastTrend {
    fn from(raw: RawTrend) -> Self {
        let change = raw.change.unwrap_or_else(|| {
            match (raw.current_forecast, raw.future_forecast) {
                (Some(now), Some(later)) => later - now,
                _ => 0.0,
            }
        });
        ForecastTrend {
            city: raw.city,
            current_forecast: raw.current_forecast,
            future_forecast: raw.future_forecast,
            change,
        }
    }
}

pub fn forecast_trends(body: &Value) -> Result<ForecastTrends, String> {
    if !body.is_object() {
        return Err(format!("expected an object, found {}", kind_of(body)));
    }
    let raw = RawTrends::deserialize(body).map_err(|e| e.to_string())?;
    Ok(ForecastTrends {
        improving: decode_items::<RawTrend, ForecastTrend>(&raw.improving, "trend"),
        worsening: decode_items::<RawTrend, ForecastTrend>(&raw.worsening, "trend"),
    })
}

pub fn training_outcome(body: &Value) -> Result<TrainingOutcome, String> {
    let raw = RawTraining::deserialize(body).map_err(|e| e.to_string())?;
    let status = match raw.status {
        Some(status) => status,
        None if !raw.trained_models.is_empty() || raw.mean_squared_error.is_some() => {
            "success".to_string()
        }
        None => return Err("missing training status".to_string()),
    };
    Ok(TrainingOutcome {
        status,
        message: raw.message,
        mean_squared_error: raw.mean_squared_error,
        trained_models: raw.trained_models,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
