use std::{io::IsTerminal, path::PathBuf, process::ExitCode, str::FromStr, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use data_model::{FunctionId, Language};
use faas_console::{
    config::ConsoleConfig,
    console::Console,
    status_panel::{self, ProbeOutcome},
    tracing::setup_tracing,
    view::{self, Style},
    FunctionsApi,
    HttpFunctionsApi,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "faas-console")]
#[command(version, about = "Create functions on a FaaS backend and watch their health", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", help = "Path to config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Interactive console (default)
    Console,
    /// Create a function and report its first health check
    Create {
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,
        /// Source file; the language template is used when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Keep the status panel open; press Enter to re-check health
        #[arg(short, long)]
        watch: bool,
    },
    /// Check the health of a function once
    Health { id: String },
    /// Print the canned template for a language
    Template {
        #[arg(value_parser = parse_language)]
        language: Language,
    },
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_str(s).map_err(|_| format!("unsupported language: {} (python, go)", s))
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => ConsoleConfig::from_path(
            path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?,
        )
        .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConsoleConfig::from_env().context("Failed to validate default config")?,
    };

    setup_tracing(&config)?;
    info!(api_url = %config.api_url, env = %config.env, "starting faas console");

    let api: Arc<dyn FunctionsApi> =
        Arc::new(HttpFunctionsApi::new(&config).context("Failed to build HTTP client")?);
    let style = Style {
        ansi: std::io::stdout().is_terminal(),
    };
    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    match cli.command.unwrap_or(CliCommand::Console) {
        CliCommand::Console => {
            let console = Console::new(api, &config, style, cancel.clone());
            let result = console.run_interactive(cancel.clone()).await;
            cancel.cancel();
            console.shutdown().await;
            result?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Create {
            language,
            file,
            watch,
        } => create(api, &config, style, cancel, language, file, watch).await,
        CliCommand::Health { id } => {
            let outcome =
                status_panel::probe(api.as_ref(), &FunctionId::new(id), config.health_check.timeout)
                    .await;
            match outcome {
                ProbeOutcome::Healthy => {
                    println!("healthy");
                    Ok(ExitCode::SUCCESS)
                }
                ProbeOutcome::Unhealthy => {
                    println!("unhealthy");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        CliCommand::Template { language } => {
            print!("{}", language.template());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn create(
    api: Arc<dyn FunctionsApi>,
    config: &ConsoleConfig,
    style: Style,
    cancel: CancellationToken,
    language: Option<Language>,
    file: Option<PathBuf>,
    watch: bool,
) -> anyhow::Result<ExitCode> {
    let console = Console::new(api, config, style, cancel.clone());
    let inferred = file
        .as_ref()
        .and_then(|f| f.extension())
        .and_then(|ext| ext.to_str())
        .and_then(Language::from_extension);
    if let Some(language) = language.or(inferred) {
        console.form().select_language(language);
    }
    if let Some(path) = &file {
        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        console.form().set_body(body);
    }

    if let Err(e) = console.form().submit().await {
        println!("{}", view::render_form(&console.form().state()).trim_end());
        return Err(e).context("Failed to create function");
    }

    let Some(mut snapshot) = console.panel().settled().await else {
        return Ok(ExitCode::FAILURE);
    };
    println!("{}", view::render_panel(&snapshot, style).trim_end());

    if watch {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut updates = console.panel().subscribe();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => {
                    if line?.is_none() {
                        break;
                    }
                    if !console.panel().refresh().await {
                        println!("A health check is already running.");
                    }
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = updates.borrow_and_update().clone();
                    if next.state.is_settled() && next != snapshot {
                        println!("{}", view::render_panel(&next, style).trim_end());
                        snapshot = next;
                    }
                }
            }
        }
    }

    cancel.cancel();
    console.shutdown().await;
    if snapshot.state == faas_console::HealthState::Healthy {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install ctrl+c handler");
        return;
    }
    info!("received ctrl+c, shutting down");
    cancel.cancel();
}
