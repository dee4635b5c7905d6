//! Sequential fetch -> transform -> render run for one city.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    config::Settings,
    credentials::CredentialChain,
    error::PipelineError,
    model::ForecastSeries,
    provider::{ForecastSource, source_from_settings},
    render::{ChartKind, ChartRenderer},
    transform::{location_label, to_series},
};

/// What happened to one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Saved(PathBuf),
    Skipped(&'static str),
}

/// A transformed forecast, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Place name used in chart titles, e.g. "Paris, FR".
    pub location: String,
    pub series: ForecastSeries,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub forecast: Forecast,
    pub charts: Vec<(ChartKind, RenderOutcome)>,
}

impl RunReport {
    pub fn saved(&self) -> impl Iterator<Item = &PathBuf> {
        self.charts.iter().filter_map(|(_, outcome)| match outcome {
            RenderOutcome::Saved(path) => Some(path),
            RenderOutcome::Skipped(_) => None,
        })
    }
}

/// Resolve the API key, then fetch and transform the forecast for
/// `settings.city` from OpenWeatherMap.
///
/// No request is made when no credential provider yields a key.
pub async fn fetch_configured(
    credentials: &CredentialChain,
    settings: &Settings,
) -> Result<Forecast, PipelineError> {
    let api_key = credentials.resolve()?;
    let source = source_from_settings(api_key, settings)?;

    info!(city = %settings.city, "fetching forecast");
    fetch(source.as_ref(), &settings.city).await
}

/// Fetch the forecast for `city` and turn it into a series.
pub async fn fetch(source: &dyn ForecastSource, city: &str) -> Result<Forecast, PipelineError> {
    let response = source.fetch_forecast(city).await?;
    info!("Weather data fetched successfully");

    let series = to_series(&response)?;
    let location = location_label(&response, city);
    info!(points = series.len(), %location, "forecast processed");

    Ok(Forecast { location, series })
}

/// [`fetch_configured`] followed by [`render_all`].
///
/// Stops at the first fatal error; nothing is rendered if fetching or
/// transforming fails. A forecast without any observed condition only skips
/// the pie chart.
pub async fn run_configured(
    credentials: &CredentialChain,
    settings: &Settings,
    renderer: &dyn ChartRenderer,
) -> Result<RunReport, PipelineError> {
    let forecast = fetch_configured(credentials, settings).await?;
    let charts = render_all(renderer, &forecast)?;
    Ok(RunReport { forecast, charts })
}

/// Draw all four charts from an already transformed series.
pub fn render_all(
    renderer: &dyn ChartRenderer,
    forecast: &Forecast,
) -> Result<Vec<(ChartKind, RenderOutcome)>, PipelineError> {
    let Forecast { location, series } = forecast;
    let mut charts = Vec::with_capacity(ChartKind::all().len());

    for &kind in ChartKind::all() {
        let outcome = match kind {
            ChartKind::Temperature => RenderOutcome::Saved(renderer.temperature(series, location)?),
            ChartKind::Humidity => RenderOutcome::Saved(renderer.humidity(series, location)?),
            ChartKind::WindSpeed => RenderOutcome::Saved(renderer.wind_speed(series, location)?),
            ChartKind::Conditions => {
                let histogram = series.condition_histogram();
                if !histogram.has_observed_conditions() {
                    warn!("No weather descriptions to plot for pie chart");
                    RenderOutcome::Skipped("no weather descriptions to plot")
                } else {
                    RenderOutcome::Saved(renderer.conditions(&histogram, location)?)
                }
            }
        };
        charts.push((kind, outcome));
    }

    Ok(charts)
}
