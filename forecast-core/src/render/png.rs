//! PNG charts drawn with `plotters`.

use std::{
    error::Error,
    ops::Range,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;
use tracing::info;

use super::{ChartKind, ChartRenderer, ensure_output_dir};
use crate::{
    error::RenderError,
    model::{ConditionHistogram, ForecastSeries},
};

const LINE_CHART_SIZE: (u32, u32) = (1200, 600);
const PIE_CHART_SIZE: (u32, u32) = (1000, 800);

const TEMPERATURE_COLOR: RGBColor = RGBColor(31, 119, 180);
const FEELS_LIKE_COLOR: RGBColor = RGBColor(255, 127, 14);
const HUMIDITY_COLOR: RGBColor = RGBColor(0, 128, 128);
const WIND_COLOR: RGBColor = RGBColor(128, 0, 128);

const PASTEL: [RGBColor; 10] = [
    RGBColor(161, 201, 244),
    RGBColor(255, 180, 130),
    RGBColor(141, 229, 161),
    RGBColor(255, 159, 155),
    RGBColor(208, 187, 255),
    RGBColor(222, 187, 155),
    RGBColor(250, 176, 228),
    RGBColor(207, 207, 207),
    RGBColor(255, 254, 163),
    RGBColor(185, 242, 240),
];

/// First slice starts 140 degrees counter-clockwise from the x axis.
/// Screen y grows downwards, hence the sign.
const PIE_START_ANGLE: f64 = -140.0;

type DrawResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Clone, Copy)]
enum Marker {
    Circle,
    Cross,
}

#[derive(Debug)]
struct Line<'a> {
    label: &'a str,
    values: Vec<f64>,
    color: RGBColor,
    dashed: bool,
    marker: Marker,
}

#[derive(Debug)]
struct LineChart<'a> {
    title: String,
    y_desc: &'a str,
    y_range: Option<Range<f64>>,
    lines: Vec<Line<'a>>,
}

/// Writes the charts as PNG files into one output directory.
#[derive(Debug, Clone)]
pub struct PngRenderer {
    output_dir: PathBuf,
}

impl PngRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    fn target(&self, kind: ChartKind) -> Result<PathBuf, RenderError> {
        ensure_output_dir(&self.output_dir)?;
        Ok(self.output_dir.join(kind.file_name()))
    }

    fn render_lines(
        &self,
        kind: ChartKind,
        times: &[NaiveDateTime],
        chart: &LineChart<'_>,
    ) -> Result<PathBuf, RenderError> {
        let path = self.target(kind)?;
        draw_line_chart(&path, times, chart).map_err(|e| drawing_error(kind, e))?;
        info!("Saved {kind} forecast plot to {}", path.display());
        Ok(path)
    }
}

impl ChartRenderer for PngRenderer {
    fn temperature(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError> {
        let chart = LineChart {
            title: format!("5-Day Temperature & Feels Like Forecast for {location}"),
            y_desc: "Temperature (°C)",
            y_range: None,
            lines: vec![
                Line {
                    label: "Temperature (°C)",
                    values: series.temperatures().to_vec(),
                    color: TEMPERATURE_COLOR,
                    dashed: false,
                    marker: Marker::Circle,
                },
                Line {
                    label: "Feels Like (°C)",
                    values: series.feels_like().to_vec(),
                    color: FEELS_LIKE_COLOR,
                    dashed: true,
                    marker: Marker::Cross,
                },
            ],
        };

        self.render_lines(ChartKind::Temperature, series.times(), &chart)
    }

    fn humidity(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError> {
        let chart = LineChart {
            title: format!("5-Day Humidity Forecast for {location}"),
            y_desc: "Humidity (%)",
            y_range: Some(0.0..100.0),
            lines: vec![Line {
                label: "Humidity (%)",
                values: series.humidities().iter().map(|&h| f64::from(h)).collect(),
                color: HUMIDITY_COLOR,
                dashed: false,
                marker: Marker::Circle,
            }],
        };

        self.render_lines(ChartKind::Humidity, series.times(), &chart)
    }

    fn wind_speed(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError> {
        let chart = LineChart {
            title: format!("5-Day Wind Speed Forecast for {location}"),
            y_desc: "Wind Speed (m/s)",
            y_range: None,
            lines: vec![Line {
                label: "Wind Speed (m/s)",
                values: series.wind_speeds().to_vec(),
                color: WIND_COLOR,
                dashed: false,
                marker: Marker::Circle,
            }],
        };

        self.render_lines(ChartKind::WindSpeed, series.times(), &chart)
    }

    fn conditions(
        &self,
        histogram: &ConditionHistogram,
        location: &str,
    ) -> Result<PathBuf, RenderError> {
        let kind = ChartKind::Conditions;
        let path = self.target(kind)?;
        let title = format!("Distribution of Weather Conditions for {location} (Next 5 Days)");

        draw_pie_chart(&path, &title, histogram).map_err(|e| drawing_error(kind, e))?;
        info!("Saved {kind} pie chart to {}", path.display());
        Ok(path)
    }
}

fn drawing_error(kind: ChartKind, err: Box<dyn Error>) -> RenderError {
    RenderError::Drawing { file: kind.file_name(), message: err.to_string() }
}

fn draw_line_chart(path: &Path, times: &[NaiveDateTime], spec: &LineChart<'_>) -> DrawResult {
    let xs: Vec<i64> = times.iter().map(|t| t.and_utc().timestamp()).collect();
    let x_range = time_range(&xs);
    let y_range = spec.y_range.clone().unwrap_or_else(|| value_range(&spec.lines));

    let root = BitMapBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(110)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    let tick_label = |ts: &i64| format_tick(*ts);
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc(spec.y_desc)
        .x_labels(16)
        .x_label_formatter(&tick_label)
        .x_label_style(TextStyle::from(("sans-serif", 13).into_font()).transform(FontTransform::Rotate90))
        .draw()?;

    for line in &spec.lines {
        let points: Vec<(i64, f64)> = xs.iter().copied().zip(line.values.iter().copied()).collect();
        let color = line.color;
        let style = color.stroke_width(2);

        let anno = if line.dashed {
            chart.draw_series(DashedLineSeries::new(points.clone(), 10, 6, style))?
        } else {
            chart.draw_series(LineSeries::new(points.clone(), style))?
        };
        anno.label(line.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        match line.marker {
            Marker::Circle => {
                chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
            }
            Marker::Cross => {
                chart.draw_series(points.iter().map(|&p| Cross::new(p, 4, color.stroke_width(2))))?;
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_pie_chart(path: &Path, title: &str, histogram: &ConditionHistogram) -> DrawResult {
    let root = BitMapBackend::new(path, PIE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    root.titled(title, ("sans-serif", 24))?;

    let (width, height) = root.dim_in_pixel();
    // Pie coordinates are absolute pixels; leave room for the title.
    let center = (width as i32 / 2, height as i32 / 2 + 20);
    let radius = f64::from(width.min(height)) * 0.32;

    let labels = pie_labels(histogram);
    let sizes: Vec<f64> = histogram.iter().map(|(_, n)| n as f64).collect();
    let colors: Vec<RGBColor> = (0..labels.len()).map(|i| PASTEL[i % PASTEL.len()]).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(PIE_START_ANGLE);
    pie.label_style(("sans-serif", 20).into_font().color(&BLACK));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

/// Slice labels with their share, e.g. "Rain (25.0%)".
fn pie_labels(histogram: &ConditionHistogram) -> Vec<String> {
    histogram
        .percentages()
        .into_iter()
        .map(|(label, pct)| format!("{label} ({pct:.1}%)"))
        .collect()
}

/// X axis extent in seconds; a single point gets an hour either side.
fn time_range(xs: &[i64]) -> Range<i64> {
    let min = xs.iter().copied().min().unwrap_or(0);
    let max = xs.iter().copied().max().unwrap_or(0);

    if min == max { (min - 3600)..(max + 3600) } else { min..max }
}

/// Y axis extent covering every line with 10% headroom.
fn value_range(lines: &[Line<'_>]) -> Range<f64> {
    let values = lines.iter().flat_map(|l| l.values.iter().copied());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad)..(max + pad)
}

fn format_tick(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.naive_utc().format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
