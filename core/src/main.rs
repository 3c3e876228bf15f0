//! # equipviz
//!
//! Kommandolinje-klient for Chemical Equipment-backend.
//!
//! ```bash
//! EQUIPVIZ_USERNAME=admin EQUIPVIZ_PASSWORD=... equipviz upload equip.csv
//! equipviz --demo -u demo -p demo summary
//! equipviz report 3 -o rapport.pdf
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use equipviz_core::cli::{print_history, print_rows, print_summary_report};
use equipviz_core::metrics::ApiMetrics;
use equipviz_core::mock::DemoFactory;
use equipviz_core::{
    load_config, ClientConfig, ClientFactory, Dashboard, HttpClientFactory, Notice, ReportDocument,
    SelectedFile, SummaryOutcome,
};

#[derive(Parser)]
#[command(name = "equipviz")]
#[command(author, version, about = "Chemical Equipment Parameter Visualizer client", long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON config file
    #[arg(long, value_name = "FILE", default_value = "equipviz.json")]
    config: PathBuf,

    /// Backend base URL (overrides config and EQUIPVIZ_API_URL)
    #[arg(long)]
    url: Option<String>,

    #[arg(short, long, env = "EQUIPVIZ_USERNAME", default_value = "")]
    username: String,

    #[arg(short, long, env = "EQUIPVIZ_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Use the built-in demo backend instead of HTTP
    #[arg(long)]
    demo: bool,

    /// Print Prometheus request counters on exit
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is up (no login)
    Health,
    /// Show the last 5 uploads
    History,
    /// Show summary statistics (latest dataset if no id)
    Summary {
        #[arg(long)]
        id: Option<i64>,
    },
    /// Show all rows of a dataset (latest if no id)
    Dataset {
        #[arg(value_name = "ID")]
        id: Option<i64>,
    },
    /// Upload a CSV file and show the resulting dataset
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Download the PDF report for a dataset
    Report {
        #[arg(value_name = "ID")]
        id: i64,
        /// Output path (default: equipment_report_<ID>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let metrics = ApiMetrics::new().context("Failed to set up metrics")?;
    let factory = build_factory(&cli, metrics.clone())?;
    let mut dashboard = Dashboard::new(factory).with_metrics(metrics.clone());

    let result = run(&cli, &mut dashboard);

    if cli.metrics {
        print!("{}", metrics.render());
    }
    result
}

fn build_factory(cli: &Cli, metrics: ApiMetrics) -> Result<Arc<dyn ClientFactory>> {
    if cli.demo {
        info!("Using demo backend");
        return Ok(Arc::new(DemoFactory::new()));
    }

    let mut config: ClientConfig = load_config(&cli.config)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?
        .with_process_env();
    if let Some(url) = &cli.url {
        config.base_url = Some(url.clone());
    }
    info!("Backend: {}", config.resolved_base_url());

    Ok(Arc::new(HttpClientFactory::new(config).with_metrics(metrics)))
}

fn run(cli: &Cli, dashboard: &mut Dashboard) -> Result<()> {
    match &cli.command {
        Commands::Health => {
            let status = equipviz_core::fetch::health(dashboard.anonymous_api().as_ref())
                .context("Health check failed")?;
            println!(
                "{} ({} {})",
                status.status,
                status.service.as_deref().unwrap_or("unknown service"),
                status.version.as_deref().unwrap_or("")
            );
        }
        Commands::History => {
            login(cli, dashboard)?;
            print_history(dashboard.view().history());
        }
        Commands::Summary { id } => {
            login(cli, dashboard)?;
            match dashboard.refresh_summary(*id) {
                SummaryOutcome::Loaded => {
                    if let Some(summary) = dashboard.view().summary() {
                        print_summary_report(summary);
                    }
                }
                SummaryOutcome::NoDataYet => {
                    println!("No datasets available yet. Upload a CSV file first.")
                }
                SummaryOutcome::Stale | SummaryOutcome::Failed => bail!("Failed to load summary"),
            }
        }
        Commands::Dataset { id } => {
            login(cli, dashboard)?;
            let loaded = match id {
                Some(id) => dashboard.open_dataset(*id).map(Some),
                None => dashboard.open_current_or_latest(),
            }
            .context("Failed to load dataset data")?;
            match loaded {
                Some(_) => print_dataset(dashboard),
                None => println!("No datasets available. Please upload a CSV file first."),
            }
        }
        Commands::Upload { file } => {
            let selected = SelectedFile::from_path(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            login(cli, dashboard)?;
            dashboard.select_file(selected);
            let report = dashboard.upload().context("Upload failed")?;
            if let Some(Notice::Success(msg)) = dashboard.view().notice() {
                println!("{msg} (dataset {})", report.dataset_id);
            }
            print_dataset(dashboard);
            print_history(dashboard.view().history());
        }
        Commands::Report { id, output } => {
            login(cli, dashboard)?;
            let doc = dashboard
                .download_report(*id)
                .context("Failed to generate PDF report")?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(ReportDocument::default_file_name(*id)));
            doc.save_to(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("PDF report saved to {} ({} bytes)", path.display(), doc.bytes.len());
        }
    }
    Ok(())
}

fn login(cli: &Cli, dashboard: &mut Dashboard) -> Result<()> {
    dashboard
        .login(&cli.username, &cli.password)
        .context("Login failed")
}

fn print_dataset(dashboard: &Dashboard) {
    let view = dashboard.view();
    if let Some(summary) = view.summary() {
        print_summary_report(summary);
    }
    if let Some(rows) = view.rows() {
        print_rows(rows);
    }
}
