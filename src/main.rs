mod console;

use clap::Parser;
use console::{ConsoleHost, OutputFormat};
use gabtv::{Route, Settings, open_addon};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Browse Gab TV from the terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Plugin path to run, e.g. "/", "/explore", "/categories/news",
    /// "/play_video/<channel>/<view>"
    #[arg(default_value = "/")]
    route: String,

    /// Search query; skips the prompt on the "/search" route
    #[arg(short, long)]
    query: Option<String>,

    /// Settings file (TOML)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Directory for cached thumbnails
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Maximum number of cached thumbnails (0 or less: unlimited)
    #[arg(long, allow_negative_numbers = true)]
    cache_size: Option<i64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "gabtv=debug" } else { "gabtv=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, gabtv::SettingsError> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(dir) = &cli.cache_dir {
        settings.cache_dir = Some(dir.clone());
    }
    if let Some(size) = cli.cache_size {
        settings.cache_size = size;
    }

    Ok(settings)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let route = match cli.route.parse::<Route>() {
        Ok(Route::Search { query: None }) => Route::Search {
            query: cli.query.clone(),
        },
        Ok(route) => route,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let addon = match open_addon(settings) {
        Ok(addon) => addon,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut host = ConsoleHost::new(cli.format);
    // The orchestrator already reported the failure through the host
    if addon.run(route, &mut host).is_err() {
        process::exit(1);
    }
}
