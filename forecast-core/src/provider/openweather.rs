use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::{credentials::ApiKey, error::FetchError};

use super::ForecastSource;

/// Client for the OpenWeatherMap 5-day / 3-hour forecast endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: ApiKey,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: ApiKey, base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.base_url)
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch_forecast(&self, city: &str) -> Result<OwForecastResponse, FetchError> {
        let res = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the key as `appid`.
                let e = e.without_url();
                error!("Request error: {e}");
                FetchError::Network(e)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to read forecast response body: {e}");
            FetchError::Network(e)
        })?;
        debug!(%status, bytes = body.len(), "forecast response received");

        if let Some(err) = classify_status(status, city, &body) {
            error!("{err}");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to decode JSON response from API: {e}");
            FetchError::Decode(e)
        })
    }
}

fn classify_status(status: StatusCode, city: &str, body: &str) -> Option<FetchError> {
    if status.is_success() {
        return None;
    }

    Some(match status {
        StatusCode::UNAUTHORIZED => FetchError::Authentication,
        StatusCode::NOT_FOUND => FetchError::LocationNotFound { city: city.to_string() },
        _ => FetchError::Http { status, body: truncate_body(body) },
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    /// Condition category, e.g. "Rain" or "Clear".
    pub main: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCity {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastEntry {
    /// Unix timestamp, seconds.
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Option<Vec<OwWeather>>,
    pub wind: OwWind,
}

/// Decoded forecast body. `list` stays optional: a missing list is invalid
/// data, not a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastResponse {
    #[serde(default)]
    pub list: Option<Vec<OwForecastEntry>>,
    #[serde(default)]
    pub city: Option<OwCity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_not_classified() {
        assert!(classify_status(StatusCode::OK, "Paris", "").is_none());
    }

    #[test]
    fn statuses_are_classified() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "Paris", ""),
            Some(FetchError::Authentication)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "Nowhereville", ""),
            Some(FetchError::LocationNotFound { city }) if city == "Nowhereville"
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "Paris", "slow down"),
            Some(FetchError::Http { status: StatusCode::TOO_MANY_REQUESTS, body }) if body == "slow down"
        ));
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);

        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }

    #[test]
    fn entry_without_weather_decodes() {
        let json = r#"{"list":[{"dt":1714521600,"main":{"temp":10.0,"feels_like":9.0,"humidity":80},"wind":{"speed":3.5}}]}"#;
        let parsed: OwForecastResponse = serde_json::from_str(json).unwrap();

        let list = parsed.list.unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].weather.is_none());
        assert!(parsed.city.is_none());
    }

    #[test]
    fn missing_list_decodes_as_none() {
        let parsed: OwForecastResponse = serde_json::from_str(r#"{"cod":"200"}"#).unwrap();
        assert!(parsed.list.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let key = ApiKey::new("K").unwrap();
        let client = OpenWeatherClient::new(key, "http://localhost:1234/", 5).unwrap();
        assert_eq!(client.forecast_url(), "http://localhost:1234/forecast");
    }
}
