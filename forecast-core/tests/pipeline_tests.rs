//! End-to-end runs against a mock server, with recording and PNG renderers.

use std::{cell::RefCell, path::PathBuf};

use forecast_core::{
    ChartKind, ChartRenderer, ConditionHistogram, Config, CredentialChain, FetchError,
    ForecastSeries, PipelineError, PngRenderer, RenderError, RenderOutcome, Settings,
    TransformError, credentials::StaticCredentials, pipeline,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

#[derive(Debug, Clone, PartialEq)]
enum Recorded {
    Temperature { temps: Vec<f64>, feels_like: Vec<f64> },
    Humidity(Vec<u8>),
    WindSpeed(Vec<f64>),
    Conditions(Vec<(String, usize)>),
}

/// Captures what each chart would have been drawn from.
#[derive(Debug, Default)]
struct RecordingRenderer {
    calls: RefCell<Vec<Recorded>>,
    locations: RefCell<Vec<String>>,
}

impl RecordingRenderer {
    fn calls(&self) -> Vec<Recorded> {
        self.calls.borrow().clone()
    }

    fn locations(&self) -> Vec<String> {
        self.locations.borrow().clone()
    }

    fn record(&self, call: Recorded, kind: ChartKind, location: &str) -> Result<PathBuf, RenderError> {
        self.calls.borrow_mut().push(call);
        self.locations.borrow_mut().push(location.to_string());
        Ok(PathBuf::from(kind.file_name()))
    }
}

impl ChartRenderer for RecordingRenderer {
    fn temperature(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError> {
        self.record(
            Recorded::Temperature {
                temps: series.temperatures().to_vec(),
                feels_like: series.feels_like().to_vec(),
            },
            ChartKind::Temperature,
            location,
        )
    }

    fn humidity(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError> {
        self.record(Recorded::Humidity(series.humidities().to_vec()), ChartKind::Humidity, location)
    }

    fn wind_speed(&self, series: &ForecastSeries, location: &str) -> Result<PathBuf, RenderError> {
        let speeds = series.wind_speeds().to_vec();
        self.record(Recorded::WindSpeed(speeds), ChartKind::WindSpeed, location)
    }

    fn conditions(
        &self,
        histogram: &ConditionHistogram,
        location: &str,
    ) -> Result<PathBuf, RenderError> {
        let counts = histogram.iter().map(|(l, n)| (l.to_string(), n)).collect();
        self.record(Recorded::Conditions(counts), ChartKind::Conditions, location)
    }
}

fn entry(dt: i64, temp: f64, weather: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "dt": dt,
        "main": { "temp": temp, "feels_like": temp - 1.5, "humidity": 65 },
        "weather": weather,
        "wind": { "speed": 3.0 },
    })
}

fn three_entries(weather: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "list": [
            entry(1_714_521_600, 10.0, weather.clone()),
            entry(1_714_532_400, 12.0, weather.clone()),
            entry(1_714_543_200, 9.0, weather),
        ],
        "city": { "name": "Paris", "country": "FR" }
    })
}

fn settings_for(server: &MockServer, city: &str, output_dir: PathBuf) -> Settings {
    let config = Config { base_url: Some(server.uri()), ..Config::default() };
    Settings::resolve(&config, Some(city.to_string()), Some(output_dir)).unwrap()
}

fn key_from_env(value: &str) -> CredentialChain {
    CredentialChain::new().with(StaticCredentials::new("env", Some(value.to_string())))
}

#[tokio::test]
async fn temperature_chart_receives_temps_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Paris"))
        .and(query_param("appid", "ABC"))
        .and(query_param("units", "metric"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(three_entries(serde_json::json!([
                { "main": "Clear" }
            ]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let renderer = RecordingRenderer::default();
    let settings = settings_for(&server, "Paris", PathBuf::from("unused"));

    let report = pipeline::run_configured(&key_from_env("ABC"), &settings, &renderer)
        .await
        .unwrap();

    assert_eq!(report.forecast.series.temperatures(), &[10.0, 12.0, 9.0]);
    assert_eq!(
        renderer.calls(),
        vec![
            Recorded::Temperature { temps: vec![10.0, 12.0, 9.0], feels_like: vec![8.5, 10.5, 7.5] },
            Recorded::Humidity(vec![65, 65, 65]),
            Recorded::WindSpeed(vec![3.0, 3.0, 3.0]),
            Recorded::Conditions(vec![("Clear".to_string(), 3)]),
        ]
    );
    assert_eq!(report.saved().count(), 4);
    assert_eq!(renderer.locations(), vec!["Paris, FR"; 4]);
}

#[tokio::test]
async fn titles_fall_back_to_the_queried_city() {
    let server = MockServer::start().await;
    let mut body = three_entries(serde_json::json!([{ "main": "Clouds" }]));
    body.as_object_mut().unwrap().remove("city");
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let renderer = RecordingRenderer::default();
    let settings = settings_for(&server, "san francisco", PathBuf::from("unused"));

    let report = pipeline::run_configured(&key_from_env("ABC"), &settings, &renderer)
        .await
        .unwrap();

    assert_eq!(report.forecast.location, "San Francisco");
    assert_eq!(renderer.locations(), vec!["San Francisco"; 4]);
}

#[tokio::test]
async fn fetching_alone_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(three_entries(serde_json::json!([
                { "main": "Clear" }
            ]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("visualizations");
    let settings = settings_for(&server, "Paris", out.clone());

    let forecast = pipeline::fetch_configured(&key_from_env("ABC"), &settings).await.unwrap();
    assert_eq!(forecast.location, "Paris, FR");
    assert_eq!(forecast.series.len(), 3);
    assert!(!out.exists());

    let renderer = PngRenderer::new(&settings.output_dir);
    let charts = pipeline::render_all(&renderer, &forecast).unwrap();
    assert_eq!(charts.len(), 4);
    assert!(out.join(ChartKind::Temperature.file_name()).is_file());
}

#[tokio::test]
async fn location_not_found_writes_no_charts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("visualizations");
    let settings = settings_for(&server, "Nowhereville", out.clone());
    let renderer = PngRenderer::new(&settings.output_dir);

    let err = pipeline::run_configured(&key_from_env("ABC"), &settings, &renderer)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(FetchError::LocationNotFound { .. })));
    assert!(err.to_string().contains("Location not found: Nowhereville"));
    assert!(!out.exists());
}

#[tokio::test]
async fn missing_conditions_skip_only_the_pie_chart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(three_entries(serde_json::json!([]))),
        )
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("charts");
    let settings = settings_for(&server, "Paris", out.clone());
    let renderer = PngRenderer::new(&settings.output_dir);

    let report = pipeline::run_configured(&key_from_env("ABC"), &settings, &renderer)
        .await
        .unwrap();

    assert_eq!(report.forecast.series.conditions(), &["N/A", "N/A", "N/A"]);
    assert!(matches!(
        report.charts.last(),
        Some((ChartKind::Conditions, RenderOutcome::Skipped(_)))
    ));

    for kind in [ChartKind::Temperature, ChartKind::Humidity, ChartKind::WindSpeed] {
        assert!(out.join(kind.file_name()).is_file(), "{kind} chart missing");
    }
    assert!(!out.join(ChartKind::Conditions.file_name()).exists());
}

#[tokio::test]
async fn missing_forecast_list_renders_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": "200" })))
        .mount(&server)
        .await;

    let renderer = RecordingRenderer::default();
    let settings = settings_for(&server, "Paris", PathBuf::from("unused"));

    let err = pipeline::run_configured(&key_from_env("ABC"), &settings, &renderer)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transform(TransformError::MissingForecast)));
    assert!(renderer.calls().is_empty());
}

#[tokio::test]
async fn missing_credentials_stop_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let renderer = RecordingRenderer::default();
    let settings = settings_for(&server, "Paris", PathBuf::from("unused"));
    let chain = CredentialChain::new()
        .with(StaticCredentials::new("env", None))
        .with(StaticCredentials::new("prompt", Some("   ".into())));

    let err = pipeline::run_configured(&chain, &settings, &renderer).await.unwrap_err();

    assert!(matches!(err, PipelineError::Credentials(_)));
    assert!(renderer.calls().is_empty());
}

#[tokio::test]
async fn identical_responses_give_identical_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_entries(
            serde_json::json!([{ "main": "Rain" }]),
        )))
        .expect(2)
        .mount(&server)
        .await;

    let settings = settings_for(&server, "Paris", PathBuf::from("unused"));
    let chain = key_from_env("ABC");

    let first = pipeline::run_configured(&chain, &settings, &RecordingRenderer::default())
        .await
        .unwrap();
    let second = pipeline::run_configured(&chain, &settings, &RecordingRenderer::default())
        .await
        .unwrap();

    assert_eq!(first.forecast, second.forecast);
}
