use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One raw (category, value) pair as returned by the nowcast API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationItem {
    pub category: String,
    pub value: String,
}

impl ObservationItem {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Unknown precipitation code '{0}'")]
    UnknownPrecipitationCode(String),
}

/// Precipitation type (PTY) code table of the nowcast API.
///
/// The code set is closed; a value outside it is an upstream contract
/// violation, not a missing observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precipitation {
    None,
    Rain,
    RainAndSnow,
    Snow,
    Raindrop,
    RaindropWithSnowFlurry,
    SnowFlurry,
}

impl Precipitation {
    pub fn from_code(code: &str) -> Result<Self, DecodeError> {
        match code {
            "0" => Ok(Self::None),
            "1" => Ok(Self::Rain),
            "2" => Ok(Self::RainAndSnow),
            "3" => Ok(Self::Snow),
            "5" => Ok(Self::Raindrop),
            "6" => Ok(Self::RaindropWithSnowFlurry),
            "7" => Ok(Self::SnowFlurry),
            other => Err(DecodeError::UnknownPrecipitationCode(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Rain => "1",
            Self::RainAndSnow => "2",
            Self::Snow => "3",
            Self::Raindrop => "5",
            Self::RaindropWithSnowFlurry => "6",
            Self::SnowFlurry => "7",
        }
    }

    /// Human-readable description, as published in the API documentation.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "없음",
            Self::Rain => "비",
            Self::RainAndSnow => "비/눈",
            Self::Snow => "눈",
            Self::Raindrop => "빗방울",
            Self::RaindropWithSnowFlurry => "빗방울눈날림",
            Self::SnowFlurry => "눈날림",
        }
    }
}

/// Observation categories of the ultra-short-term nowcast:
///
///   T1H 기온 ℃ / RN1 1시간 강수량 mm / UUU 동서바람성분 m/s /
///   VVV 남북바람성분 m/s / REH 습도 % / PTY 강수형태 코드값 /
///   VEC 풍향 deg / WSD 풍속 m/s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Temperature,
    Rainfall,
    EastWestWind,
    NorthSouthWind,
    Humidity,
    PrecipitationType,
    WindDirection,
    WindSpeed,
}

impl Category {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "T1H" => Some(Self::Temperature),
            "RN1" => Some(Self::Rainfall),
            "UUU" => Some(Self::EastWestWind),
            "VVV" => Some(Self::NorthSouthWind),
            "REH" => Some(Self::Humidity),
            "PTY" => Some(Self::PrecipitationType),
            "VEC" => Some(Self::WindDirection),
            "WSD" => Some(Self::WindSpeed),
            _ => None,
        }
    }
}

/// Aggregated nowcast snapshot, one optional field per observation
/// category. Values carry their display unit. Built fresh per request,
/// immutable once aggregation returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub precipitation_type: Option<String>,
    pub wind_direction: Option<String>,
    pub wind_speed: Option<String>,
    pub rainfall: Option<String>,
    pub east_west_wind: Option<String>,
    pub north_south_wind: Option<String>,
}

impl WeatherSnapshot {
    /// Fold a raw item list into a snapshot.
    ///
    /// Categories outside the known set are skipped. A duplicate category
    /// overwrites the earlier value (last write wins); item order is
    /// otherwise irrelevant. A PTY value outside the closed code set fails
    /// the whole aggregation.
    pub fn aggregate(items: &[ObservationItem]) -> Result<Self, DecodeError> {
        let mut snapshot = Self::default();

        for item in items {
            let Some(category) = Category::from_code(&item.category) else {
                debug!("Ignoring unrecognized observation category {}", item.category);
                continue;
            };
            let value = &item.value;

            match category {
                Category::Temperature => snapshot.temperature = Some(format!("{value} °C")),
                Category::Humidity => snapshot.humidity = Some(format!("{value} %")),
                Category::PrecipitationType => {
                    let precipitation = Precipitation::from_code(value)?;
                    snapshot.precipitation_type = Some(precipitation.label().to_string());
                }
                Category::WindDirection => snapshot.wind_direction = Some(format!("{value} °")),
                Category::WindSpeed => snapshot.wind_speed = Some(format!("{value} m/s")),
                Category::Rainfall => snapshot.rainfall = Some(format!("{value} mm")),
                Category::EastWestWind => snapshot.east_west_wind = Some(format!("{value} m/s")),
                Category::NorthSouthWind => {
                    snapshot.north_south_wind = Some(format!("{value} m/s"))
                }
            }
        }

        Ok(snapshot)
    }
}

impl fmt::Display for WeatherSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("기온", &self.temperature),
            ("습도", &self.humidity),
            ("강수형태", &self.precipitation_type),
            ("풍향", &self.wind_direction),
            ("풍속", &self.wind_speed),
            ("1시간 강수량", &self.rainfall),
            ("동서바람성분", &self.east_west_wind),
            ("남북바람성분", &self.north_south_wind),
        ];

        let mut first = true;
        for (label, value) in fields {
            if let Some(value) = value {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{label}: {value}")?;
                first = false;
            }
        }

        if first {
            write!(f, "관측값 없음")?;
        }
        Ok(())
    }
}
