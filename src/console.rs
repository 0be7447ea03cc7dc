//! Wires the form, the store and the status panel together and drives them
//! from line-oriented commands.

use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use data_model::{FunctionRecord, Language};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    api_client::FunctionsApi,
    config::ConsoleConfig,
    errors::SubmissionError,
    status_panel::{HealthState, StatusPanel, StatusPanelHandle},
    store::LatestFunctionStore,
    submission::SubmissionForm,
    view::{self, Style},
};

const HELP: &str = "\
Commands:
  lang <python|go>  select a language (replaces the code with its template)
  load <path>       load function code from a file
  show              show the form
  submit            create the function
  status            show the latest function
  refresh           check the latest function's health again
  delete            delete the latest function
  dismiss           clear the form error
  help              show this help
  quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Language(Language),
    Load(PathBuf),
    Show,
    Submit,
    Status,
    Refresh,
    Delete,
    Dismiss,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
        let command = match (name.as_str(), arg) {
            ("lang" | "language", Some(lang)) => Command::Language(
                Language::from_str(lang)
                    .map_err(|_| anyhow::anyhow!("unsupported language: {}", lang))?,
            ),
            ("lang" | "language", None) => anyhow::bail!("usage: lang <python|go>"),
            ("load", Some(path)) => Command::Load(PathBuf::from(path)),
            ("load", None) => anyhow::bail!("usage: load <path>"),
            ("show", _) => Command::Show,
            ("submit", _) => Command::Submit,
            ("status", _) => Command::Status,
            ("refresh", _) => Command::Refresh,
            ("delete", _) => Command::Delete,
            ("dismiss", _) => Command::Dismiss,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            (other, _) => anyhow::bail!("unknown command: {} (try `help`)", other),
        };
        Ok(command)
    }
}

pub struct Console {
    api: Arc<dyn FunctionsApi>,
    store: LatestFunctionStore,
    form: SubmissionForm,
    panel: StatusPanelHandle,
    style: Style,
}

impl Console {
    pub fn new(
        api: Arc<dyn FunctionsApi>,
        config: &ConsoleConfig,
        style: Style,
        cancel: CancellationToken,
    ) -> Self {
        let store = LatestFunctionStore::new();
        let form = SubmissionForm::new(api.clone(), store.clone());
        let panel = StatusPanel::spawn(api.clone(), &store, config.health_check.timeout, cancel);
        Self {
            api,
            store,
            form,
            panel,
            style,
        }
    }

    pub fn form(&self) -> &SubmissionForm {
        &self.form
    }

    pub fn panel(&self) -> &StatusPanelHandle {
        &self.panel
    }

    pub fn store(&self) -> &LatestFunctionStore {
        &self.store
    }

    /// Waits for the status panel task to stop. Cancel its token first.
    pub async fn shutdown(self) {
        self.panel.join().await;
    }

    fn render_status(&self) -> String {
        let out = view::render_panel(&self.panel.snapshot(), self.style);
        if out.is_empty() {
            "No function created yet.".to_string()
        } else {
            out.trim_end().to_string()
        }
    }

    /// Runs one command to completion and returns what to print.
    pub async fn execute(&self, command: Command) -> Result<String> {
        let output = match command {
            Command::Language(language) => {
                let discarded = self.form.select_language(language);
                let mut out = format!("Language set to {}.", language.label());
                if discarded {
                    out.push_str(" Unsaved edits were replaced by the template.");
                }
                out
            }
            Command::Load(path) => self.load(path).await?,
            Command::Show => view::render_form(&self.form.state())
                .trim_end()
                .to_string(),
            Command::Submit => match self.form.submit().await {
                Ok(record) => describe_created(&record),
                Err(e) => describe_failure(&e),
            },
            Command::Status => self.render_status(),
            Command::Refresh => {
                if self.panel.refresh().await {
                    "Checking health...".to_string()
                } else if self.panel.snapshot().record.is_none() {
                    "No function created yet.".to_string()
                } else {
                    "A health check is already running.".to_string()
                }
            }
            Command::Delete => self.delete().await,
            Command::Dismiss => {
                self.form.dismiss_error();
                "Error dismissed.".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        };
        Ok(output)
    }

    async fn load(&self, path: PathBuf) -> Result<String> {
        let body = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let inferred = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension);
        if let Some(language) = inferred {
            if language != self.form.draft().language() {
                self.form.select_language(language);
            }
        }
        self.form.set_body(body);
        let draft = self.form.draft();
        Ok(format!(
            "Loaded {} ({} bytes, {}).",
            path.display(),
            draft.body().len(),
            draft.language().label()
        ))
    }

    async fn delete(&self) -> String {
        let Some(record) = self.store.current() else {
            return "No function created yet.".to_string();
        };
        match self.api.delete_function(&record.id).await {
            Ok(()) => {
                self.store.clear();
                format!("Function {} deleted.", record.id)
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    fn spawn_submit(&self) -> JoinHandle<Result<Arc<FunctionRecord>, SubmissionError>> {
        let form = self.form.clone();
        tokio::spawn(async move { form.submit().await })
    }

    /// Reads commands from stdin until `quit`, EOF or cancellation.
    ///
    /// Submissions run in the background so the prompt stays usable; the
    /// panel is reprinted whenever a health check settles.
    pub async fn run_interactive(&self, cancel: CancellationToken) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut snapshots = self.panel.subscribe();
        let mut pending: Option<JoinHandle<Result<Arc<FunctionRecord>, SubmissionError>>> = None;
        let mut last_state = snapshots.borrow_and_update().state;

        println!("{}", view::render_form(&self.form.state()).trim_end());
        println!("Type `help` for commands.");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read from stdin")? else {
                        debug!("stdin closed");
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let command = match Command::from_str(&line) {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}", e);
                            continue;
                        }
                    };
                    match command {
                        Command::Quit => break,
                        Command::Submit if pending.is_some() || self.form.is_submitting() => {
                            println!("Error: {}", SubmissionError::InFlight);
                        }
                        Command::Submit => {
                            println!("Creating...");
                            pending = Some(self.spawn_submit());
                        }
                        command => match self.execute(command).await {
                            Ok(out) => println!("{}", out),
                            Err(e) => println!("Error: {:#}", e),
                        },
                    }
                }
                Some(result) = async {
                    match pending.as_mut() {
                        Some(task) => Some(task.await),
                        None => None,
                    }
                }, if pending.is_some() => {
                    pending = None;
                    match result {
                        Ok(Ok(record)) => println!("{}", describe_created(&record)),
                        Ok(Err(e)) => println!("{}", describe_failure(&e)),
                        Err(e) => println!("Error: submission task failed: {}", e),
                    }
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = snapshots.borrow_and_update().state;
                    if state != last_state && (state.is_settled() || state == HealthState::Idle) {
                        println!("{}", self.render_status());
                    }
                    last_state = state;
                }
            }
        }

        if let Some(task) = pending.take() {
            task.abort();
        }
        info!("console closed");
        Ok(())
    }
}

fn describe_created(record: &FunctionRecord) -> String {
    format!("Function {} created. URL: {}", record.id, record.url)
}

fn describe_failure(err: &SubmissionError) -> String {
    if err.is_retryable() {
        format!("Error: {} (retry with `submit`)", err)
    } else {
        format!("Error: {}", err)
    }
}
