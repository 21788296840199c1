// AQI classifier - canonical category and style table for every panel
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display tokens for one band: text color, background, badge and chart color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiStyle {
    pub text: &'static str,
    pub background: &'static str,
    pub badge: &'static str,
    pub hex: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: &'static str,
    /// 0 for unknown, then 1.. in ascending severity
    pub level: u8,
    pub style: AqiStyle,
}

struct Band {
    /// Inclusive upper bound; `None` for the open-ended top band
    upper: Option<f64>,
    category: &'static str,
    style: AqiStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AqiScale {
    /// US category names with an extra 301-400 band before Hazardous
    #[default]
    Extended,
    /// US EPA six-band scale
    Epa,
    /// Indian National AQI names
    Naqi,
    /// 1-5 severity index
    Ordinal,
}

const UNKNOWN_STYLE: AqiStyle = AqiStyle {
    text: "text-gray-500",
    background: "bg-gray-100",
    badge: "bg-gray-400 text-white",
    hex: "#6b7280",
};

const GREEN: AqiStyle = AqiStyle {
    text: "text-green-600",
    background: "bg-green-100",
    badge: "bg-green-500 text-white",
    hex: "#059669",
};

const YELLOW: AqiStyle = AqiStyle {
    text: "text-yellow-600",
    background: "bg-yellow-100",
    badge: "bg-yellow-400 text-gray-900",
    hex: "#d97706",
};

const ORANGE: AqiStyle = AqiStyle {
    text: "text-orange-600",
    background: "bg-orange-100",
    badge: "bg-orange-500 text-white",
    hex: "#ea580c",
};

const RED: AqiStyle = AqiStyle {
    text: "text-red-600",
    background: "bg-red-100",
    badge: "bg-red-600 text-white",
    hex: "#dc2626",
};

const PURPLE: AqiStyle = AqiStyle {
    text: "text-purple-600",
    background: "bg-purple-100",
    badge: "bg-purple-600 text-white",
    hex: "#7c3aed",
};

const DEEP_PURPLE: AqiStyle = AqiStyle {
    text: "text-purple-900",
    background: "bg-purple-200",
    badge: "bg-purple-900 text-white",
    hex: "#4c1d95",
};

const MAROON: AqiStyle = AqiStyle {
    text: "text-rose-900",
    background: "bg-rose-100",
    badge: "bg-rose-900 text-white",
    hex: "#881337",
};

const EXTENDED_BANDS: &[Band] = &[
    Band { upper: Some(50.0), category: "Good", style: GREEN },
    Band { upper: Some(100.0), category: "Moderate", style: YELLOW },
    Band { upper: Some(150.0), category: "Unhealthy for Sensitive Groups", style: ORANGE },
    Band { upper: Some(200.0), category: "Unhealthy", style: RED },
    Band { upper: Some(300.0), category: "Very Unhealthy", style: PURPLE },
    Band { upper: Some(400.0), category: "Very Unhealthy", style: DEEP_PURPLE },
    Band { upper: None, category: "Hazardous", style: MAROON },
];

const EPA_BANDS: &[Band] = &[
    Band { upper: Some(50.0), category: "Good", style: GREEN },
    Band { upper: Some(100.0), category: "Moderate", style: YELLOW },
    Band { upper: Some(150.0), category: "Unhealthy for Sensitive Groups", style: ORANGE },
    Band { upper: Some(200.0), category: "Unhealthy", style: RED },
    Band { upper: Some(300.0), category: "Very Unhealthy", style: PURPLE },
    Band { upper: None, category: "Hazardous", style: MAROON },
];

const NAQI_BANDS: &[Band] = &[
    Band { upper: Some(50.0), category: "Good", style: GREEN },
    Band { upper: Some(100.0), category: "Satisfactory", style: YELLOW },
    Band { upper: Some(200.0), category: "Moderate", style: ORANGE },
    Band { upper: Some(300.0), category: "Poor", style: RED },
    Band { upper: Some(400.0), category: "Very Poor", style: PURPLE },
    Band { upper: None, category: "Severe", style: MAROON },
];

const ORDINAL_BANDS: &[Band] = &[
    Band { upper: Some(1.0), category: "Good", style: GREEN },
    Band { upper: Some(2.0), category: "Fair", style: YELLOW },
    Band { upper: Some(3.0), category: "Moderate", style: ORANGE },
    Band { upper: Some(4.0), category: "Poor", style: RED },
    Band { upper: None, category: "Very Poor", style: PURPLE },
];

impl AqiScale {
    fn bands(self) -> &'static [Band] {
        match self {
            AqiScale::Extended => EXTENDED_BANDS,
            AqiScale::Epa => EPA_BANDS,
            AqiScale::Naqi => NAQI_BANDS,
            AqiScale::Ordinal => ORDINAL_BANDS,
        }
    }

    /// Number of bands, i.e. the highest level `classify` can return
    pub fn levels(self) -> u8 {
        self.bands().len() as u8
    }

    /// Map an AQI value to its band. Bounds are inclusive, so a value sitting
    /// exactly on a threshold belongs to the lower band.
    pub fn classify(self, aqi: Option<f64>) -> Classification {
        let aqi = match aqi {
            Some(value) if !value.is_nan() => value,
            _ => return Classification::unknown(),
        };

        let bands = self.bands();
        let index = bands
            .iter()
            .position(|band| band.upper.is_none_or(|upper| aqi <= upper))
            .unwrap_or(bands.len() - 1);
        let band = &bands[index];

        Classification {
            category: band.category,
            level: index as u8 + 1,
            style: band.style,
        }
    }

    /// Classify a batch, preserving input order
    pub fn classify_all<I>(self, values: I) -> Vec<Classification>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        values.into_iter().map(|v| self.classify(v)).collect()
    }

    /// Advisory line for a classification on this scale
    pub fn health_advice(self, classification: &Classification) -> &'static str {
        if classification.level == 0 {
            return "No reading available.";
        }
        // Position within the scale, so six- and seven-band tables share advice
        let top = self.levels();
        match classification.level {
            1 => "Air quality is satisfactory. Enjoy outdoor activities.",
            2 => "Acceptable. Unusually sensitive people should limit prolonged exertion outdoors.",
            level if level == top => {
                "Health warning of emergency conditions. Everyone should stay indoors."
            }
            3 => "Sensitive groups should reduce prolonged or heavy outdoor exertion.",
            4 => "Everyone may begin to feel effects. Avoid outdoor activities during high pollution.",
            _ => "Health alert. Avoid all outdoor exertion and keep windows closed.",
        }
    }
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            category: "Unknown",
            level: 0,
            style: UNKNOWN_STYLE,
        }
    }
}

impl FromStr for AqiScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extended" => Ok(AqiScale::Extended),
            "epa" | "us" => Ok(AqiScale::Epa),
            "naqi" | "india" => Ok(AqiScale::Naqi),
            "ordinal" => Ok(AqiScale::Ordinal),
            other => Err(format!("unknown AQI scale '{}'", other)),
        }
    }
}

impl fmt::Display for AqiScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AqiScale::Extended => "extended",
            AqiScale::Epa => "epa",
            AqiScale::Naqi => "naqi",
            AqiScale::Ordinal => "ordinal",
        };
        f.write_str(name)
    }
}
