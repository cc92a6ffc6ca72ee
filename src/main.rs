use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use catalog_analytics::config::Config;
use catalog_analytics::driver::{Driver, Stage};
use catalog_analytics::logging::init_logging;
use catalog_analytics::metrics::init_metrics;

#[derive(Parser)]
#[command(name = "catalog_analytics")]
#[command(about = "Product catalog cleaning, weekly sales reporting and content catalog analysis")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to $CATALOG_ANALYTICS_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw product catalog
    Clean,
    /// Build the weekly sales and conversion report
    Weekly,
    /// Run the exploratory analysis of the content catalog
    Eda,
    /// Run several stages in order, stopping at the first failure
    Run {
        /// Stages to run (comma-separated); defaults to driver.stages from the config
        #[arg(long, value_enum, value_delimiter = ',')]
        stages: Option<Vec<Stage>>,
    },
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_logging(&config.logging.log_dir);
    init_metrics();

    let stages = match cli.command {
        Commands::Clean => vec![Stage::Clean],
        Commands::Weekly => vec![Stage::Weekly],
        Commands::Eda => vec![Stage::Eda],
        Commands::Run { stages } => stages.unwrap_or_else(|| config.driver.stages.clone()),
    };
    info!("Running stages: {:?}", stages);

    let summary = Driver::new(&config).run(&stages);
    if summary.succeeded() {
        println!("\n✅ All stages completed: {:?}", summary.completed);
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
