//! wttr.in weather client
//!
//! Fetches the JSON forecast (`?format=j1`) for a free-text location and
//! parses it into hourly forecasts in the requested temperature scale.

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::settings::{TempScale, WeatherSettings};

/// Base URL for the wttr.in service
const WTTR_BASE_URL: &str = "https://wttr.in/";

/// Cache key for forecasts, one slot per location and scale
pub fn weather_cache_key(location: &str, scale: TempScale) -> String {
    format!("weather.{}.{}", location.trim(), scale.as_str())
}

/// Broad weather condition derived from wttr.in's description text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    HeavyRain,
    Rain,
    Storm,
    Snow,
    Fog,
    Drizzle,
    Unknown,
}

impl WeatherCondition {
    /// Classifies a description such as "Patchy rain nearby".
    ///
    /// Patterns are checked most specific first; the first match wins.
    pub fn from_description(description: &str) -> Self {
        const PATTERNS: [(&str, WeatherCondition); 12] = [
            ("CLEAR", WeatherCondition::Clear),
            ("SUNNY", WeatherCondition::Clear),
            ("CLOUD", WeatherCondition::Cloudy),
            ("OVERCAST", WeatherCondition::Cloudy),
            ("HEAVY RAIN", WeatherCondition::HeavyRain),
            ("DRIZZLE", WeatherCondition::Drizzle),
            ("RAIN", WeatherCondition::Rain),
            ("STORM", WeatherCondition::Storm),
            ("SNOW", WeatherCondition::Snow),
            ("BLIZZARD", WeatherCondition::Snow),
            ("MIST", WeatherCondition::Fog),
            ("FOG", WeatherCondition::Fog),
        ];

        let upper = description.to_uppercase();
        PATTERNS
            .iter()
            .find(|(pattern, _)| upper.contains(pattern))
            .map(|(_, condition)| *condition)
            .unwrap_or(WeatherCondition::Unknown)
    }

    pub fn emoji(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "☀️",
            WeatherCondition::Cloudy => "☁️",
            WeatherCondition::HeavyRain => "⛈️",
            WeatherCondition::Rain => "🌧️",
            WeatherCondition::Storm => "🌀",
            WeatherCondition::Snow => "❄️",
            WeatherCondition::Fog => "🌫️",
            WeatherCondition::Drizzle => "🌦️",
            WeatherCondition::Unknown => "❓",
        }
    }
}

/// Forecast for a single hour slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Local time of the slot
    pub time: NaiveTime,
    /// Description as given by wttr.in (e.g. "Partly cloudy")
    pub description: String,
    /// Temperature in the report's scale
    pub temperature: i32,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
}

impl HourlyForecast {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_description(&self.description)
    }
}

/// All hourly slots for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub hours: Vec<HourlyForecast>,
}

/// Parsed forecast for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Location as requested
    pub location: String,
    /// Nearest named area reported by wttr.in
    pub area_name: String,
    pub scale: TempScale,
    pub days: Vec<DayForecast>,
}

impl WeatherReport {
    /// The slot covering `time` on the first day: the latest slot starting
    /// at or before it.
    pub fn slot_at(&self, time: NaiveTime) -> Option<&HourlyForecast> {
        let today = self.days.first()?;
        today
            .hours
            .iter()
            .rev()
            .find(|hour| hour.time <= time)
            .or_else(|| today.hours.first())
    }

    /// Formats a temperature with this report's unit, e.g. `31°C`
    pub fn format_temperature(&self, temperature: i32) -> String {
        format!("{}{}", temperature, self.scale.suffix())
    }
}

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Field present but not in the expected format
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// Location could not be turned into a request URL
    #[error("Invalid location: '{0}'")]
    InvalidLocation(String),
}

/// Client for fetching forecasts from wttr.in
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: WTTR_BASE_URL.to_string(),
        }
    }

    /// Point the client at another wttr.in-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request URL for `location`, with the location as a single path segment
    fn forecast_url(&self, location: &str) -> Result<Url, WeatherError> {
        let invalid = || WeatherError::InvalidLocation(location.to_string());
        if location.trim().is_empty() {
            return Err(invalid());
        }

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(location);
        url.query_pairs_mut().append_pair("format", "j1");
        Ok(url)
    }

    /// Fetch the multi-day hourly forecast for `location`
    pub async fn fetch_forecast(
        &self,
        location: &str,
        scale: TempScale,
    ) -> Result<WeatherReport, WeatherError> {
        let url = self.forecast_url(location)?;
        log::info!("fetching weather for '{}'", location);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;

        parse_forecast(&text, location, scale)
    }

    /// Fetch the forecast through `cache`, using the location, scale and
    /// refresh interval from `settings`.
    pub async fn fetch_cached(
        &self,
        cache: &CacheManager,
        settings: &WeatherSettings,
    ) -> Result<WeatherReport, WeatherError> {
        let params = WeatherParams {
            location: &settings.location,
            scale: settings.temp_scale,
        };
        let key = weather_cache_key(&settings.location, settings.temp_scale);
        let ttl = Duration::from_secs(settings.refresh_interval.saturating_mul(60));

        cache
            .get(&key, &params, ttl, || {
                self.fetch_forecast(&settings.location, settings.temp_scale)
            })
            .await
    }
}

/// Parameters a cached forecast depends on
#[derive(Debug, Serialize)]
struct WeatherParams<'a> {
    location: &'a str,
    scale: TempScale,
}

/// Parse a wttr.in `j1` response body
pub fn parse_forecast(
    body: &str,
    location: &str,
    scale: TempScale,
) -> Result<WeatherReport, WeatherError> {
    let response: WttrResponse = serde_json::from_str(body)?;

    let area_name = response
        .nearest_area
        .first()
        .and_then(|area| area.area_name.first())
        .map(|name| name.value.clone())
        .ok_or_else(|| WeatherError::MissingField("nearest_area.areaName".to_string()))?;

    let days = response
        .weather
        .iter()
        .map(|day| parse_day(day, scale))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeatherReport {
        location: location.to_string(),
        area_name,
        scale,
        days,
    })
}

fn parse_day(day: &WttrDay, scale: TempScale) -> Result<DayForecast, WeatherError> {
    let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").map_err(|_| {
        WeatherError::InvalidValue {
            field: "date",
            value: day.date.clone(),
        }
    })?;

    let hours = day
        .hourly
        .iter()
        .map(|hour| parse_hour(hour, scale))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DayForecast { date, hours })
}

fn parse_hour(hour: &WttrHour, scale: TempScale) -> Result<HourlyForecast, WeatherError> {
    let raw_temperature = match scale {
        TempScale::C => &hour.temp_c,
        TempScale::F => &hour.temp_f,
    };

    Ok(HourlyForecast {
        time: parse_slot_time(&hour.time)?,
        description: hour
            .weather_desc
            .first()
            .map(|desc| desc.value.trim().to_string())
            .ok_or_else(|| WeatherError::MissingField("weatherDesc".to_string()))?,
        temperature: parse_number("temperature", raw_temperature)?,
        humidity: parse_number("humidity", &hour.humidity)?,
    })
}

/// wttr.in encodes slot times as `HMM` without padding: "0", "300", "2100"
fn parse_slot_time(raw: &str) -> Result<NaiveTime, WeatherError> {
    let invalid = || WeatherError::InvalidValue {
        field: "time",
        value: raw.to_string(),
    };
    let packed: u32 = raw.trim().parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(packed / 100, packed % 100, 0).ok_or_else(invalid)
}

fn parse_number<N: std::str::FromStr>(field: &'static str, raw: &str) -> Result<N, WeatherError> {
    raw.trim().parse().map_err(|_| WeatherError::InvalidValue {
        field,
        value: raw.to_string(),
    })
}

/// wttr.in `j1` response; every scalar is a string
#[derive(Debug, Deserialize)]
struct WttrResponse {
    nearest_area: Vec<WttrArea>,
    weather: Vec<WttrDay>,
}

#[derive(Debug, Deserialize)]
struct WttrArea {
    #[serde(rename = "areaName")]
    area_name: Vec<WttrValue>,
}

#[derive(Debug, Deserialize)]
struct WttrDay {
    date: String,
    hourly: Vec<WttrHour>,
}

#[derive(Debug, Deserialize)]
struct WttrHour {
    time: String,
    #[serde(rename = "tempC")]
    temp_c: String,
    #[serde(rename = "tempF")]
    temp_f: String,
    humidity: String,
    #[serde(rename = "weatherDesc")]
    weather_desc: Vec<WttrValue>,
}

#[derive(Debug, Deserialize)]
struct WttrValue {
    value: String,
}
