//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credential resolution
//! - Retrieval of the 5-day / 3-hour forecast from OpenWeatherMap
//! - Columnar forecast model and the transformation into it
//! - Chart rendering and the end-to-end pipeline
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries.

pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod transform;

pub use config::{Config, Settings};
pub use credentials::{ApiKey, CredentialChain, CredentialProvider};
pub use error::{CredentialError, FetchError, PipelineError, RenderError, TransformError};
pub use model::{ConditionHistogram, ForecastPoint, ForecastSeries};
pub use pipeline::{Forecast, RenderOutcome, RunReport};
pub use provider::{ForecastSource, OpenWeatherClient};
pub use render::{ChartKind, ChartRenderer, PngRenderer};
