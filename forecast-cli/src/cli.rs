use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use forecast_core::{
    ApiKey, Config, CredentialChain, CredentialProvider, PipelineError, PngRenderer,
    RenderOutcome, Settings,
    credentials::{ConfigCredentials, EnvCredentials, StaticCredentials},
    pipeline,
    render::title_case,
};
use inquire::{Password, PasswordDisplayMode, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "forecast",
    version,
    about = "Plot the 5-day weather forecast for a city",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Log verbosity: -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub plot: PlotArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key and a default city in the config file.
    Configure,
}

#[derive(Debug, Args)]
pub struct PlotArgs {
    /// City to fetch; falls back to the config file.
    #[arg(short, long, env = "CITY_NAME")]
    pub city: Option<String>,

    /// Directory the charts are written to [default: visualizations].
    #[arg(short, long, env = "FORECAST_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// OpenWeatherMap API key; takes precedence over OPENWEATHERMAP_API_KEY.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Fail instead of prompting when no API key is configured.
    #[arg(long)]
    pub no_prompt: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            None => plot(self.plot).await,
        }
    }
}

/// Asks for the API key when nothing else provided one.
#[derive(Debug, Default)]
struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn name(&self) -> &str {
        "interactive prompt"
    }

    fn api_key(&self) -> anyhow::Result<Option<String>> {
        println!("OpenWeatherMap API key not found in .env file or environment variables.");
        let key = prompt_api_key("Please enter your OpenWeatherMap API key:")?;
        Ok(Some(key))
    }
}

fn prompt_api_key(message: &str) -> anyhow::Result<String> {
    Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")
}

fn credential_chain(args: &PlotArgs, config: &Config) -> CredentialChain {
    let chain = CredentialChain::new()
        .with(StaticCredentials::new("--api-key", args.api_key.clone()))
        .with(EnvCredentials::default())
        .with(ConfigCredentials::new(config));

    if args.no_prompt { chain } else { chain.with(PromptCredentials) }
}

async fn plot(args: PlotArgs) -> anyhow::Result<()> {
    println!("--- Weather Data Visualizer ---");

    let config = Config::load()?;
    let settings = Settings::resolve(&config, args.city.clone(), args.output_dir.clone())?;
    let credentials = credential_chain(&args, &config);
    let renderer = PngRenderer::new(&settings.output_dir);
    let city = title_case(&settings.city);

    println!("\nFetching weather data for {city}...");
    let forecast = pipeline::fetch_configured(&credentials, &settings)
        .await
        .map_err(|err| with_hint(err, &city))?;
    println!(
        "Weather data fetched successfully: {} forecast points.",
        forecast.series.len()
    );

    println!("\nGenerating and saving plots...");
    let charts = pipeline::render_all(&renderer, &forecast).map_err(|err| with_hint(err, &city))?;
    for (kind, outcome) in &charts {
        match outcome {
            RenderOutcome::Saved(path) => println!("Saved {kind} chart to {}", path.display()),
            RenderOutcome::Skipped(reason) => println!("Skipped {kind} chart: {reason}."),
        }
    }

    println!(
        "\n--- All visualizations saved in '{}' directory ---",
        settings.output_dir.display()
    );
    println!("--- Script finished ---");

    Ok(())
}

/// User-facing explanation placed above a pipeline error. Credential errors
/// already read as a complete sentence and get none.
fn failure_hint(err: &PipelineError, city: &str) -> Option<String> {
    match err {
        PipelineError::Credentials(_) => None,
        PipelineError::Fetch(_) => Some(format!(
            "Could not retrieve weather data for {city}. \
             Please check the city name and your API key."
        )),
        PipelineError::Transform(_) => Some("Failed to process weather data. Exiting.".to_string()),
        PipelineError::Render(_) => Some("Failed to save visualizations.".to_string()),
    }
}

fn with_hint(err: PipelineError, city: &str) -> anyhow::Error {
    match failure_hint(&err, city) {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = prompt_api_key("OpenWeatherMap API key:")?;
    let key = ApiKey::new(&key).ok_or_else(|| anyhow!("API key cannot be empty"))?;
    config.set_api_key(key.as_str().to_string());

    let current = config.city.clone().unwrap_or_default();
    let city = Text::new("Default city (leave empty for none):")
        .with_default(&current)
        .prompt()
        .context("Failed to read city")?;
    let city = city.trim();
    config.city = (!city.is_empty()).then(|| city.to_string());

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
