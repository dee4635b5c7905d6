use crate::{Settings, credentials::ApiKey, error::FetchError};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::{OpenWeatherClient, OwForecastResponse};

/// Anything that can produce one decoded forecast response for a city.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_forecast(&self, city: &str) -> Result<OwForecastResponse, FetchError>;
}

/// Construct the OpenWeatherMap source from resolved settings.
pub fn source_from_settings(
    api_key: ApiKey,
    settings: &Settings,
) -> Result<Box<dyn ForecastSource>, FetchError> {
    let client = OpenWeatherClient::new(api_key, &settings.base_url, settings.timeout_secs)?;
    Ok(Box::new(client))
}
