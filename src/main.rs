use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use skylens::daylight::{self, SunCycle};
use skylens::models::{HistoryWindow, WeatherModel, WeatherQuery};
use skylens::tips::tips_for;
use skylens::{
    SearchCoordinator, SearchOutcome, SkylensConfig, SuggestionLookup, VERSION, WeatherApiClient,
    logging,
};

#[derive(Parser)]
#[command(
    name = "skylens",
    version,
    about = "Skylens - weather dashboard with forecasts, sun cycle and historical trends"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the weather dashboard for a location
    Weather {
        /// City name; anything after the first comma is ignored
        #[arg(short, long)]
        location: String,

        /// Day to show (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Historical trend page, 0 being the most recent years
        #[arg(short, long, default_value_t = 0)]
        page: usize,

        /// Print the normalized model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest locations matching partially typed text
    Suggest {
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SkylensConfig::load_from_path(Some(path.clone())),
        None => SkylensConfig::load(),
    }
    .with_context(|| "Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Some(Commands::Weather {
            location,
            date,
            page,
            json,
        }) => run_weather(config, &location, date.as_deref(), page, json).await,
        Some(Commands::Suggest { text }) => run_suggest(config, &text).await,
        None => {
            print_config_summary(&config, cli.config.as_ref(), cli.verbose);
            Ok(())
        }
    }
}

async fn run_weather(
    config: SkylensConfig,
    location: &str,
    date: Option<&str>,
    page: usize,
    json: bool,
) -> Result<()> {
    // Reject bad input before any client is built
    let query = WeatherQuery::new(location, date)?;
    info!("Fetching weather for: {}", query.location);

    let dismiss = Duration::from_secs(config.search.error_dismiss_seconds);
    let client = Arc::new(WeatherApiClient::new(config)?);
    let coordinator = SearchCoordinator::new(client, dismiss);

    let model = match coordinator.submit_query(query).await {
        Ok(SearchOutcome::Applied(model)) => model,
        Ok(SearchOutcome::Superseded) => bail!("Search was superseded"),
        Err(e) => {
            debug!("Search failed: {:#}", e);
            bail!("{}", e.user_message());
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(model.as_ref())
                .with_context(|| "Failed to serialize weather model")?
        );
    } else {
        print_dashboard(&model, page);
    }
    Ok(())
}

async fn run_suggest(config: SkylensConfig, text: &str) -> Result<()> {
    let debounce = Duration::from_millis(config.geocoding.debounce_ms);
    let client = Arc::new(WeatherApiClient::new(config)?);
    let lookup = SuggestionLookup::new(client, debounce);

    let suggestions = lookup.lookup(text).await.unwrap_or_default();
    if suggestions.is_empty() {
        println!("No suggestions for '{}'", text.trim());
        return Ok(());
    }

    println!("📍 Suggestions for '{}':", text.trim());
    for suggestion in &suggestions {
        println!("   {}", suggestion.label());
    }
    Ok(())
}

fn print_dashboard(model: &WeatherModel, page: usize) {
    let weather_type = model.weather_type();
    let place = if model.country.is_empty() {
        model.city.clone()
    } else {
        format!("{}, {}", model.city, model.country)
    };

    println!("{}  {}  ·  {}", weather_type.emoji(), place, model.date);
    println!("   {}°C  {}", model.temperature, model.condition);
    println!(
        "   💧 Humidity {}%   💨 Wind {} km/h   ☔ Precipitation {:.1} mm",
        model.humidity, model.wind_speed, model.precipitation
    );

    let local = daylight::local_now(model.time_zone.as_deref(), Utc::now());
    let position = SunCycle::from_times(&model.sunrise, &model.sunset).position_at(local);
    let sky = if position.is_night {
        "night".to_string()
    } else {
        format!("{:.0}% of daylight passed", position.progress * 100.0)
    };
    println!(
        "   🌅 {}   🌇 {}   ({}, local time {})",
        daylight::format_12_hour(&model.sunrise),
        daylight::format_12_hour(&model.sunset),
        sky,
        local.format("%I:%M %p")
    );

    if !model.rain_chance.is_empty() {
        let chances: Vec<String> = model.rain_chance.iter().map(|c| format!("{c}%")).collect();
        println!();
        println!("🌧️  Rain chance: {}", chances.join(" "));
    }

    if !model.weekly_forecast.is_empty() {
        println!();
        println!("📅 Weekly forecast:");
        for day in &model.weekly_forecast {
            println!("   {:<4} {:>4}°C  {}", day.day, day.temp, day.condition);
        }
    }

    if !model.historical_trend.is_empty() {
        println!();
        print_history(&model.history_page(page));
    }

    if !model.climate_insights.is_empty() {
        println!();
        println!("🔎 Climate insights:");
        for insight in &model.climate_insights {
            println!("   • {insight}");
        }
    }

    println!();
    println!("💡 Weather tips ({weather_type}):");
    for tip in tips_for(weather_type) {
        println!("   • {tip}");
    }
}

fn print_history(window: &HistoryWindow<'_>) {
    println!(
        "📈 Historical trend {} - {} (page {}/{}):",
        window.start_year.unwrap_or("?"),
        window.end_year.unwrap_or("?"),
        window.page + 1,
        window.total_pages
    );
    for point in window.points {
        println!(
            "   {}  {:>5.1}°C  {:>5.1} mm",
            point.year, point.temperature, point.rainfall
        );
    }
    if window.has_older() {
        println!("   (older years: --page {})", window.page + 1);
    }
}

fn print_config_summary(config: &SkylensConfig, explicit: Option<&PathBuf>, verbose: bool) {
    let source = explicit
        .cloned()
        .or_else(SkylensConfig::get_config_path)
        .filter(|path| path.exists())
        .map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string());

    println!("🌤️  Skylens v{VERSION}  ·  {}", daylight::now_label(None, Utc::now()));
    println!("Using config from: {source}");
    println!("Backend: {}", config.backend.base_url);
    println!("Log level: {}", config.logging.level);
    if verbose {
        println!("Geocoding: {}", config.geocoding.base_url);
        println!(
            "Timeout: {}s, retries: {}, forecast days: {}",
            config.backend.timeout_seconds, config.backend.max_retries, config.backend.forecast_days
        );
        println!(
            "Suggestion debounce: {}ms, error shown for {}s",
            config.geocoding.debounce_ms, config.search.error_dismiss_seconds
        );
    }
    println!();
    println!("Run `skylens weather --location <city>` to see the dashboard.");
}
