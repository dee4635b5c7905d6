use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    error::RenderError,
    model::{ConditionHistogram, ForecastSeries},
};

pub mod png;

pub use png::PngRenderer;

/// The four charts, each with a fixed output file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Temperature,
    Humidity,
    WindSpeed,
    Conditions,
}

impl ChartKind {
    pub const fn file_name(&self) -> &'static str {
        match self {
            ChartKind::Temperature => "temperature_forecast.png",
            ChartKind::Humidity => "humidity_forecast.png",
            ChartKind::WindSpeed => "wind_speed_forecast.png",
            ChartKind::Conditions => "weather_conditions_pie_chart.png",
        }
    }

    pub const fn all() -> &'static [ChartKind] {
        &[
            ChartKind::Temperature,
            ChartKind::Humidity,
            ChartKind::WindSpeed,
            ChartKind::Conditions,
        ]
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChartKind::Temperature => "temperature",
            ChartKind::Humidity => "humidity",
            ChartKind::WindSpeed => "wind speed",
            ChartKind::Conditions => "weather conditions",
        })
    }
}

/// Draws charts from forecast data. Each call writes exactly one file and
/// returns its path. `location` is shown verbatim in the chart title.
pub trait ChartRenderer: Debug {
    fn temperature(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError>;

    fn humidity(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError>;

    fn wind_speed(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError>;

    fn conditions(
        &self,
        histogram: &ConditionHistogram,
        location: &str,
    ) -> Result<PathBuf, RenderError>;
}

/// Create `dir` and its parents unless it already exists.
pub fn ensure_output_dir(dir: &Path) -> Result<(), RenderError> {
    if dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(dir)
        .map_err(|source| RenderError::OutputDir { path: dir.to_path_buf(), source })?;
    info!("Created directory: {}", dir.display());

    Ok(())
}

/// Uppercase the first letter of every word, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }

    out
}
