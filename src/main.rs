use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

use report_designer::canvas::{self, CanvasView};
use report_designer::config::DesignerConfig;
use report_designer::error::ErrorCode;
use report_designer::http::HttpClient;
use report_designer::model::ReportConfig;
use report_designer::preview::Preview;
use report_designer::template::{self, TemplateRecord};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("{} is not valid JSON: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Model(#[from] report_designer::model::ModelError),
    #[error(transparent)]
    Config(#[from] report_designer::config::ConfigError),
    #[error(transparent)]
    Fetch(#[from] report_designer::http::FetchError),
    #[error(transparent)]
    Template(#[from] report_designer::template::TemplateError),
}

#[derive(Parser, Debug)]
#[command(name = "report-designer", about = "Inspect, preview and print report designer documents")]
struct Cli {
    /// REST API base URL used for data-source fetches.
    #[arg(long, env = "REPORT_API_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a report document and check its invariants.
    Validate { file: PathBuf },
    /// Load a report's data sources (or literal data) and print the preview.
    Preview {
        file: PathBuf,
        /// Literal data context; skips every network fetch.
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Render a template record against a literal data record.
    Print {
        template: PathBuf,
        #[arg(long)]
        data: PathBuf,
    },
    /// List the component palette with default sizes.
    Palette,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Validate { file } => {
            let config = read_report(&file)?;
            config.validate()?;
            println!("ok: {} component(s), version {}", config.components.len(), config.version);
        }
        Command::Preview { file, data } => {
            let config = read_report(&file)?;
            config.validate()?;
            let mut preview = match data {
                Some(path) => Preview::with_external_data(read_json(&path)?),
                None => Preview::new().without_refresh(),
            };
            let mut settings = DesignerConfig::from_env()?;
            if let Some(base) = &cli.base_url {
                settings = settings.with_base_url(base);
            }
            let client = HttpClient::new(&settings)?;
            preview.load(&config, &client).await;
            print_view(&preview.render(&config).canvas);
        }
        Command::Print { template: path, data } => {
            let raw = read_json(&path)?;
            let record: TemplateRecord =
                serde_json::from_value(raw).map_err(|source| CliError::Json { path: path.clone(), source })?;
            match template::render_print(&record, read_json(&data)?) {
                Ok(view) => print_view(&view),
                Err(e) => {
                    tracing::warn!(code = e.error_code(), "no usable template");
                    return Err(e.into());
                }
            }
        }
        Command::Palette => {
            for item in canvas::palette() {
                println!("{:<24} {:<24} {}x{}", item.drag_id, item.label, item.width, item.height);
            }
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Json { path: path.to_owned(), source })
}

fn read_report(path: &Path) -> Result<ReportConfig, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })?;
    Ok(ReportConfig::from_json(&raw)?)
}

fn print_view(view: &CanvasView) {
    match view {
        CanvasView::Empty { placeholder } => println!("({placeholder})"),
        CanvasView::Placed { nodes } => {
            for placed in nodes {
                println!("-- {} --", placed.id);
                println!("{}", placed.node);
            }
        }
    }
}
