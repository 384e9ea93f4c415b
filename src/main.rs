use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use cfb_buoyancy::analysis::build_buoyancy_table;
use cfb_buoyancy::config::Config;
use cfb_buoyancy::espn::cache::{clear_cache, get_cache_path};
use cfb_buoyancy::espn::{create_client, CacheConfig, EspnSource, RawTables};
use cfb_buoyancy::output::{self, OutputFormat};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_DATA: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config file (interactive unless --yes)
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
        /// Accept the built-in defaults without prompting
        #[arg(short, long)]
        yes: bool,
    },
    /// Scrape rankings, conferences and results, and cache them
    Fetch {
        /// Ignore cached rows and scrape again
        #[arg(long)]
        refresh: bool,
    },
    /// Compute the week-to-week buoyancy table
    Delta {
        /// Ignore cached rows and scrape again
        #[arg(long)]
        refresh: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare mean ranking movement of winners and non-winners per poll
    Summary {
        /// Ignore cached rows and scrape again
        #[arg(long)]
        refresh: bool,
    },
    /// Remove all cached rows
    ClearCache,
}

#[derive(Parser, Debug)]
#[command(name = "cfb-buoyancy")]
#[command(about = "Measure how wins move college-football teams through the polls", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/cfb-buoyancy/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Neither read nor write the row cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Map an error to its exit code: source failures are network errors,
/// integrity violations are data errors.
fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<cfb_buoyancy::Error>() {
        Some(cfb_buoyancy::Error::SourceUnavailable { .. }) => EXIT_NETWORK,
        Some(cfb_buoyancy::Error::DataIntegrity(_)) => EXIT_DATA,
        _ => EXIT_FAILURE,
    }
}

fn fail(context: &str, error: anyhow::Error) -> ! {
    eprintln!("{}: {:#}", context, error);
    std::process::exit(exit_code_for(&error));
}

async fn load_raw_tables(config: Config, cache_config: &CacheConfig) -> anyhow::Result<RawTables> {
    let client = create_client()?;
    let source = EspnSource::new(client, config);
    cfb_buoyancy::fetch::load_tables(&source, cache_config).await
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // Init and clear-cache do not need a loaded config
    match &cli.command {
        Commands::Init { force, yes } => {
            if let Err(e) = cfb_buoyancy::config::init::run_init(config_path, *yes, *force) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::ClearCache => {
            let cache_path = get_cache_path();
            if let Err(e) = clear_cache(&cache_path) {
                fail("Failed to clear cache", e);
            }
            println!("Cache cleared: {}", cache_path.display());
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config = match cfb_buoyancy::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = cfb_buoyancy::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    tracing::debug!(
        seasons = %format!("{}-{}", config.seasons.start, config.seasons.end),
        weeks = %format!("{}-{}", config.weeks.start, config.weeks.end),
        delay = %config.request_delay,
        "config loaded"
    );

    let refresh = match &cli.command {
        Commands::Fetch { refresh } | Commands::Delta { refresh, .. } | Commands::Summary { refresh } => *refresh,
        Commands::Init { .. } | Commands::ClearCache => false,
    };
    let cache_config = CacheConfig::new(!cli.no_cache, refresh);

    let raw = match load_raw_tables(config, &cache_config).await {
        Ok(raw) => raw,
        Err(e) => fail("Failed to load tables", e),
    };

    match cli.command {
        Commands::Fetch { .. } => {
            println!(
                "Loaded {} rankings, {} conference rows, {} results in {:.1?}",
                raw.rankings.len(),
                raw.conferences.len(),
                raw.results.len(),
                start_time.elapsed()
            );
        }
        Commands::Delta { format, output: path, .. } => {
            let table = match build_buoyancy_table(raw) {
                Ok(t) => t,
                Err(e) => fail("Analysis failed", e.into()),
            };
            // Colors only make sense on a terminal
            let use_colors = path.is_none() && output::should_use_colors();
            let rendered = match output::render(table.records(), format, use_colors) {
                Ok(s) => s,
                Err(e) => fail("Failed to render table", e),
            };
            match path {
                Some(path) => {
                    if let Err(e) = output::write_export(&path, &rendered) {
                        fail("Export failed", e);
                    }
                    println!("Wrote {} records to {}", table.len(), path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Summary { .. } => {
            let table = match build_buoyancy_table(raw) {
                Ok(t) => t,
                Err(e) => fail("Analysis failed", e.into()),
            };
            let use_colors = output::should_use_colors();
            println!("{}", output::format_summary(&table.summarize(), use_colors));
        }
        Commands::Init { .. } | Commands::ClearCache => unreachable!("handled before config load"),
    }

    tracing::info!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}
