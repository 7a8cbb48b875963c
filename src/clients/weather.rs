use super::get_json;
use crate::errors::ClientError;
use serde::{Deserialize, Serialize};

/// Current conditions for a city, flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub city: String,
    pub description: String,
    pub temperature_c: f64,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Deserialize)]
struct RawWeather {
    #[serde(default)]
    name: String,
    #[serde(default)]
    weather: Vec<RawCondition>,
    main: RawMain,
    #[serde(default)]
    wind: RawWind,
}

#[derive(Deserialize)]
struct RawCondition {
    description: String,
}

#[derive(Deserialize)]
struct RawMain {
    temp: f64,
    humidity: u8,
}

#[derive(Default, Deserialize)]
struct RawWind {
    #[serde(default)]
    speed: f64,
}

impl From<RawWeather> for CurrentWeather {
    fn from(raw: RawWeather) -> Self {
        Self {
            city: raw.name,
            description: raw
                .weather
                .into_iter()
                .next()
                .map(|condition| condition.description)
                .unwrap_or_default(),
            temperature_c: raw.main.temp,
            humidity: raw.main.humidity,
            wind_speed: raw.wind.speed,
        }
    }
}

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn current(&self, city: &str) -> Result<CurrentWeather, ClientError> {
        let request = self
            .http
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ]);
        let raw: RawWeather = get_json(request).await?;
        Ok(raw.into())
    }
}
