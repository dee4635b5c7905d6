//! Turns a decoded forecast response into a columnar [`ForecastSeries`].
//!
//! Pure data shaping: nothing here touches the network or the filesystem.

use chrono::{Local, NaiveDateTime, TimeZone};
use tracing::{debug, warn};

use crate::{
    error::TransformError,
    model::{ForecastPoint, ForecastSeries, NO_CONDITION},
    provider::openweather::{OwForecastEntry, OwForecastResponse},
    render::title_case,
};

/// Build a series with timestamps in the host's local time zone.
pub fn to_series(response: &OwForecastResponse) -> Result<ForecastSeries, TransformError> {
    to_series_in(response, &Local)
}

/// Build a series with timestamps converted to `tz`.
///
/// Entries keep the order of the response. Should the response ever be out
/// of chronological order, points are stably sorted by time.
pub fn to_series_in<Tz: TimeZone>(
    response: &OwForecastResponse,
    tz: &Tz,
) -> Result<ForecastSeries, TransformError> {
    let entries = match response.list.as_deref() {
        Some(list) if !list.is_empty() => list,
        _ => return Err(TransformError::MissingForecast),
    };

    let mut points = entries
        .iter()
        .map(|entry| to_point(entry, tz))
        .collect::<Result<Vec<_>, _>>()?;

    if !points.is_sorted_by_key(|p| p.time) {
        warn!("forecast entries are not in chronological order; sorting by time");
        points.sort_by_key(|p| p.time);
    }

    debug!(points = points.len(), "forecast transformed");
    Ok(ForecastSeries::from_points(points))
}

/// Place name for chart titles: the city the API matched, e.g. "Paris, FR",
/// or the title-cased query when the response does not name one.
pub fn location_label(response: &OwForecastResponse, query: &str) -> String {
    let Some(city) = response.city.as_ref().filter(|c| !c.name.trim().is_empty()) else {
        return title_case(query.trim());
    };

    match city.country.as_deref().map(str::trim) {
        Some(country) if !country.is_empty() => format!("{}, {country}", city.name.trim()),
        _ => city.name.trim().to_string(),
    }
}

fn to_point<Tz: TimeZone>(entry: &OwForecastEntry, tz: &Tz) -> Result<ForecastPoint, TransformError> {
    Ok(ForecastPoint {
        time: local_time(entry.dt, tz)?,
        temperature_c: entry.main.temp,
        feels_like_c: entry.main.feels_like,
        humidity_pct: entry.main.humidity,
        wind_speed_mps: entry.wind.speed,
        condition: condition_label(entry),
    })
}

fn local_time<Tz: TimeZone>(ts: i64, tz: &Tz) -> Result<NaiveDateTime, TransformError> {
    tz.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.naive_local())
        .ok_or(TransformError::InvalidTimestamp(ts))
}

fn condition_label(entry: &OwForecastEntry) -> String {
    entry
        .weather
        .as_deref()
        .and_then(<[_]>::first)
        .map(|w| w.main.clone())
        .unwrap_or_else(|| NO_CONDITION.to_string())
}
