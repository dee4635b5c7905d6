use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Label used when a forecast entry carries no condition.
pub const NO_CONDITION: &str = "N/A";

/// One 3-hour forecast observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Local calendar time of the observation.
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: String,
}

/// A forecast stored as index-aligned columns.
///
/// All columns always have the same length: the only way to build a series is
/// from a list of [`ForecastPoint`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastSeries {
    times: Vec<NaiveDateTime>,
    temperatures: Vec<f64>,
    feels_like: Vec<f64>,
    humidities: Vec<u8>,
    wind_speeds: Vec<f64>,
    conditions: Vec<String>,
}

impl ForecastSeries {
    pub fn from_points(points: Vec<ForecastPoint>) -> Self {
        let n = points.len();
        let mut series = Self {
            times: Vec::with_capacity(n),
            temperatures: Vec::with_capacity(n),
            feels_like: Vec::with_capacity(n),
            humidities: Vec::with_capacity(n),
            wind_speeds: Vec::with_capacity(n),
            conditions: Vec::with_capacity(n),
        };

        for p in points {
            series.times.push(p.time);
            series.temperatures.push(p.temperature_c);
            series.feels_like.push(p.feels_like_c);
            series.humidities.push(p.humidity_pct);
            series.wind_speeds.push(p.wind_speed_mps);
            series.conditions.push(p.condition);
        }

        series
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn feels_like(&self) -> &[f64] {
        &self.feels_like
    }

    pub fn humidities(&self) -> &[u8] {
        &self.humidities
    }

    pub fn wind_speeds(&self) -> &[f64] {
        &self.wind_speeds
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Re-assemble the rows of the series.
    pub fn points(&self) -> impl Iterator<Item = ForecastPoint> + '_ {
        (0..self.len()).map(move |i| ForecastPoint {
            time: self.times[i],
            temperature_c: self.temperatures[i],
            feels_like_c: self.feels_like[i],
            humidity_pct: self.humidities[i],
            wind_speed_mps: self.wind_speeds[i],
            condition: self.conditions[i].clone(),
        })
    }

    pub fn condition_histogram(&self) -> ConditionHistogram {
        ConditionHistogram::from_labels(&self.conditions)
    }
}

/// Occurrence count per condition label, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionHistogram {
    counts: Vec<(String, usize)>,
}

impl ConditionHistogram {
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();

        for label in labels {
            let label = label.as_ref();
            match counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label.to_string(), 1)),
            }
        }

        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// False when there is nothing to chart: no labels at all, or only
    /// [`NO_CONDITION`] placeholders.
    pub fn has_observed_conditions(&self) -> bool {
        self.counts.iter().any(|(l, _)| l != NO_CONDITION)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0, |(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, n)| (l.as_str(), *n))
    }

    /// Share of each label in percent, same order as [`Self::iter`].
    pub fn percentages(&self) -> Vec<(&str, f64)> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }

        self.iter()
            .map(|(l, n)| (l, n as f64 * 100.0 / total as f64))
            .collect()
    }
}
