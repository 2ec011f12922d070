use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use syrup_viz::config::{Config, DEFAULT_CONFIG};
use syrup_viz::{BenchmarkTable, DataSource, logging, metric, report, server};

#[derive(Parser)]
#[command(name = "syrup-viz")]
#[command(about = "Dashboard for Syrup superoptimizer benchmark results")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory holding the results files (overrides the config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive dashboard
    Serve {
        /// Address to listen on (overrides the config)
        #[arg(long, short)]
        listen: Option<SocketAddr>,
    },

    /// Write a self-contained HTML report of the default selections
    Report {
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Summarize outcomes, times and saved gas per group and encoding
    Summary {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Print the values of a metric for one results file
    Select {
        /// CSV file to read
        csv: PathBuf,

        /// Metric identifier, e.g. push_per_initial
        metric: String,
    },

    /// Print an example configuration
    PrintConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }

    logging::init(&config.logging);

    match cli.command {
        Commands::Serve { listen } => {
            let listen = listen.unwrap_or(config.server.listen);
            tracing::info!(
                data_dir = %config.data.dir.display(),
                "starting dashboard"
            );
            server::run(server::ServerConfig {
                listen,
                data_dir: config.data.dir,
                catalog: config.catalog,
            })?;
        }

        Commands::Report { output } => {
            let source = DataSource::new(config.data.dir);
            let html = report::generate_html_report(&source, &config.catalog);
            if let Some(path) = output {
                std::fs::write(&path, &html)?;
                println!("HTML report written to {:?}", path);
            } else {
                println!("{}", html);
            }
        }

        Commands::Summary { format } => {
            let source = DataSource::new(config.data.dir);
            let summaries = report::collect_summary(&source, &config.catalog)?;

            match format.as_str() {
                "json" => report::print_summary_json(&summaries)?,
                _ => report::print_summary_table(&summaries, &config.catalog),
            }
        }

        Commands::Select { csv, metric } => {
            let table = BenchmarkTable::from_path(&csv)?;
            for value in metric::select(&table, &metric)? {
                println!("{}", value);
            }
        }

        Commands::PrintConfig => print!("{}", DEFAULT_CONFIG),
    }

    Ok(())
}
