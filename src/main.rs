use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use product_name_cleaner::config::{Backend, Config};
use product_name_cleaner::normalize::{normalize, trace};
use product_name_cleaner::{logging, metrics, store, BatchRunner, Progress};

#[derive(Parser)]
#[command(name = "product_name_cleaner")]
#[command(about = "Fill empty product names with descriptions stripped of gender, color and size tokens")]
#[command(version)]
struct Cli {
    /// Defaults to `run` with settings from the environment
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean every eligible row once
    Run {
        #[command(flatten)]
        store: StoreArgs,
        /// Rows per page (one transaction per page)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Print how many rows are waiting for a name
    Count {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Clean text given on the command line without touching the database
    Preview {
        /// Show the output of every stage
        #[arg(long)]
        trace: bool,
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[derive(Args, Default)]
struct StoreArgs {
    /// sqlite or mysql
    #[arg(long)]
    backend: Option<Backend>,
    #[arg(long)]
    sqlite_path: Option<PathBuf>,
    #[arg(long)]
    table: Option<String>,
}

impl StoreArgs {
    fn apply(self, config: &mut Config) {
        if let Some(backend) = self.backend {
            config.database.backend = backend;
        }
        if let Some(path) = self.sqlite_path {
            config.database.sqlite_path = path;
        }
        if let Some(table) = self.table {
            config.database.table = table;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        store: StoreArgs::default(),
        batch_size: None,
    });

    match command {
        Commands::Preview { trace: show_stages, text } => {
            preview(&text.join(" "), show_stages);
            Ok(())
        }
        Commands::Run { store, batch_size } => {
            let _guard = logging::init_logging();
            metrics::init_metrics();

            let mut config = Config::load().context("Failed to load configuration")?;
            store.apply(&mut config);
            if let Some(size) = batch_size {
                config.runner.batch_size = size;
            }
            config.validate()?;
            run(&config)
        }
        Commands::Count { store: store_args } => {
            let _guard = logging::init_logging();

            let mut config = Config::load().context("Failed to load configuration")?;
            store_args.apply(&mut config);
            config.validate()?;
            let mut products = store::open(&config.database)?;
            let count = products.count_eligible()?;
            println!("{} rows waiting for a name", count);
            Ok(())
        }
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    println!("{}", "=".repeat(50));
    println!("Product name cleanup (description -> name)");
    println!("{}", "=".repeat(50));

    let runner = BatchRunner::new(config.batch_size()?);

    // The store, and with it the connection, lives only for this block.
    let result = {
        let mut products = store::open(&config.database).context("Failed to open product store")?;
        info!("Database connection established");
        println!(
            "Processing {} rows per page from table '{}'",
            runner.page_size(),
            config.database.table
        );
        runner.run_with(&mut *products, print_progress)
    };
    info!("Database connection closed");

    match result {
        Ok(summary) => {
            println!("\n✅ Cleanup complete!");
            println!("   Eligible at start: {}", summary.total_eligible);
            println!("   Processed: {}", summary.processed);
            println!("   Updated: {}", summary.updated);
            println!("   Pages: {}", summary.pages);
            Ok(())
        }
        Err(e) => {
            error!("Cleanup failed: {}", e);
            println!("❌ Cleanup failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_progress(progress: &Progress) {
    match progress.percent() {
        Some(percent) => println!(
            "In progress... {}/{} ({:.1}%) - updated: {}",
            progress.processed, progress.total_eligible, percent, progress.updated
        ),
        None => println!(
            "In progress... {} processed - updated: {}",
            progress.processed, progress.updated
        ),
    }
}

fn preview(text: &str, show_stages: bool) {
    if show_stages {
        println!("{:<20} {}", "input", text);
        for (stage, output) in trace(text) {
            println!("{:<20} {}", stage.name(), output);
        }
    } else {
        println!("{}", normalize(text));
    }
}
