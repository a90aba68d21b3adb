use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Settings,
    error::{Result, SnapshotError},
    model::Observation,
};

use super::WeatherProvider;

/// OpenWeather "current weather data" endpoint, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    lang: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| {
                SnapshotError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            lang: settings.lang.clone(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<Observation> {
        let network = |source| SnapshotError::Network {
            city: city.to_string(),
            source,
        };

        let res = self
            .http
            .get(self.endpoint())
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(network)?;

        let status = res.status();
        let body = res.text().await.map_err(network)?;
        debug!(city, %status, bytes = body.len(), "OpenWeather responded");

        if !status.is_success() {
            return Err(SnapshotError::HttpStatus {
                city: city.to_string(),
                status,
                body: truncate_body(&body),
            });
        }

        parse_current(city, &body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn parse_current(city: &str, body: &str) -> Result<Observation> {
    let data_format = |reason: String| SnapshotError::DataFormat {
        city: city.to_string(),
        reason,
    };

    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| data_format(format!("Failed to parse current weather JSON: {e}")))?;

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| data_format("response contained no weather conditions".to_string()))?;

    Ok(Observation {
        location_name: parsed.name,
        condition,
        temperature_c: parsed.main.temp,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        feels_like_c: parsed.main.feels_like,
        temp_min_c: parsed.main.temp_min,
        temp_max_c: parsed.main.temp_max,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
