use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Absolute temperature as reported by the service, in Kelvin.
///
/// Serialized as the bare Kelvin number so templates see the raw reading.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(f64);

impl Temperature {
    pub const fn from_kelvin(kelvin: f64) -> Self {
        Self(kelvin)
    }

    pub const fn kelvin(self) -> f64 {
        self.0
    }

    pub fn celsius(self) -> f64 {
        self.0 - KELVIN_OFFSET
    }

    pub fn fahrenheit(self) -> f64 {
        self.celsius() * 1.8 + 32.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sys {
    pub message: f64,
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// One entry of the `weather` list, e.g. `{ id: 500, main: "Rain", ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: Temperature,
    pub temp_min: Temperature,
    pub temp_max: Temperature,
    /// hPa
    pub pressure: f64,
    pub sea_level: f64,
    pub grnd_level: f64,
    /// Percent.
    pub humidity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
}

/// Precipitation volume in mm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rain {
    #[serde(rename = "3h")]
    pub three_hours: f64,
    #[serde(rename = "1h")]
    pub one_hour: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clouds {
    /// Cloud coverage in percent.
    pub all: u32,
}

/// Snapshot of current conditions for one location.
///
/// Field names follow the service payload, which is also what templates
/// address: `{{ name }}`, `{{ main.temp }}`, `{{ weather.0.description }}`.
/// The service omits blocks such as `rain` when they do not apply, so every
/// field falls back to its zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherRecord {
    pub coord: Coord,
    pub sys: Sys,
    pub weather: Vec<Condition>,
    pub base: String,
    pub main: MainReadings,
    pub wind: Wind,
    pub rain: Rain,
    pub clouds: Clouds,
    pub dt: i64,
    pub id: i64,
    pub name: String,
    pub cod: i64,
}

impl WeatherRecord {
    /// Observation time, if `dt` is a representable unix timestamp.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.dt)
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
