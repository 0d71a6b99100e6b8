use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use weather_feed_core::{
    Config, DEFAULT_FETCH_DELAY, IntervalSignalTriggers, OpenWeatherFetcher, RunConfig, Scheduler,
    WeatherTemplate,
};

/// Top-level CLI struct.
///
/// The template is read from stdin; rendered output goes to stdout on every
/// refresh. Send SIGUSR1 to refresh immediately.
#[derive(Debug, Parser)]
#[command(name = "weather-feed", version, about = "Render current weather through a template")]
pub struct Cli {
    /// OpenWeatherMap city id.
    pub location_id: String,

    /// How much time between each fetch, e.g. "30m" or "1h 15m" [default: 30m].
    #[arg(long, value_parser = humantime::parse_duration)]
    pub fetch_delay: Option<Duration>,

    /// Run once and exit.
    #[arg(long)]
    pub once: bool,

    /// API key sent as `appid`.
    #[arg(long, env = "WEATHER_FEED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Weather endpoint to query instead of the OpenWeatherMap default.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Config file to use instead of the platform default.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        }
        .with_overrides(self.api_key, self.endpoint);

        let fetch_delay = match self.fetch_delay {
            Some(delay) => delay,
            None => config.fetch_delay()?.unwrap_or(DEFAULT_FETCH_DELAY),
        };
        let run_config = RunConfig::new(self.location_id, fetch_delay, self.once)?;

        let template = read_template(io::stdin().lock())?;
        let fetcher = OpenWeatherFetcher::new(config.fetcher_config());
        debug!(
            endpoint = %fetcher.config().endpoint,
            api_key = fetcher.config().api_key.is_some(),
            "fetcher configured"
        );
        let triggers = IntervalSignalTriggers::new(run_config.fetch_delay)
            .context("Failed to set up refresh timer and SIGUSR1 handler")?;

        Scheduler::new(run_config, fetcher, template, io::stdout()).run(triggers).await?;

        Ok(())
    }
}

/// Read the whole template source and compile it.
fn read_template<R: Read>(mut input: R) -> anyhow::Result<WeatherTemplate> {
    let mut source = String::new();
    input.read_to_string(&mut source).context("Failed to read template from stdin")?;

    Ok(WeatherTemplate::compile(&source)?)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["weather-feed", "2643743"]).expect("should parse");
        assert_eq!(cli.location_id, "2643743");
        assert_eq!(cli.fetch_delay, None);
        assert!(!cli.once);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn flags() {
        let cli = Cli::try_parse_from([
            "weather-feed",
            "--fetch-delay",
            "1h 15m",
            "--once",
            "-vv",
            "--endpoint",
            "http://localhost:8080",
            "2643743",
        ])
        .expect("should parse");

        assert_eq!(cli.fetch_delay, Some(Duration::from_secs(75 * 60)));
        assert!(cli.once);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn missing_location_is_usage_error() {
        let err = Cli::try_parse_from(["weather-feed", "--once"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_duration_is_rejected() {
        let err = Cli::try_parse_from(["weather-feed", "--fetch-delay", "often", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn read_template_compiles_input() {
        let tpl = read_template("[{{ name }}]".as_bytes()).expect("template should compile");
        let record = weather_feed_core::WeatherRecord { name: "Kyiv".into(), ..Default::default() };
        assert_eq!(tpl.render(&record).expect("render"), "[Kyiv]");
    }

    #[test]
    fn read_template_reports_compile_errors() {
        let err = read_template("{% if %}".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Template compilation failed"));
    }
}
