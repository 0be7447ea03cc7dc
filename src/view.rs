//! Plain-text rendering of the form and the status panel.

use std::fmt::Write;

use data_model::{HealthIndicator, Language};

use crate::{
    status_panel::{HealthState, PanelSnapshot},
    submission::FormState,
};

const RULE: &str = "----------------------------------------";

#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    /// Emit ANSI colour codes for the health indicator.
    pub ansi: bool,
}

impl Style {
    fn paint(&self, indicator: HealthIndicator, text: &str) -> String {
        if !self.ansi {
            return text.to_string();
        }
        let code = match indicator {
            HealthIndicator::Healthy => "32",
            HealthIndicator::Unhealthy => "31",
            HealthIndicator::Unknown => "90",
        };
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

pub fn render_languages(selected: Language) -> String {
    Language::ALL
        .iter()
        .map(|lang| {
            if *lang == selected {
                format!("[{}]", lang.label())
            } else {
                lang.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_form(form: &FormState) -> String {
    let mut out = String::new();
    let draft = &form.draft;
    let _ = writeln!(out, "Create New Function");
    let _ = writeln!(
        out,
        "Language: {}  ({})",
        render_languages(draft.language()),
        draft.language().handler_file()
    );
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{}", draft.body().trim_end());
    let _ = writeln!(out, "{}", RULE);
    if form.submitting {
        let _ = writeln!(out, "Creating...");
    } else {
        let _ = writeln!(out, "Ready: `submit` to create the function");
    }
    if let Some(error) = &form.error {
        let _ = writeln!(out, "Error: {} (`dismiss` to clear)", error);
    }
    out
}

pub fn health_label(snapshot: &PanelSnapshot) -> String {
    match snapshot.state {
        HealthState::Idle => "no function".to_string(),
        HealthState::Initial => "healthy (pending check)".to_string(),
        HealthState::Checking => format!("{} (checking...)", snapshot.indicator()),
        HealthState::Healthy | HealthState::Unhealthy => snapshot.indicator().to_string(),
    }
}

/// Renders the panel. Empty when there is no record to show.
pub fn render_panel(snapshot: &PanelSnapshot, style: Style) -> String {
    let Some(record) = &snapshot.record else {
        return String::new();
    };
    let indicator = snapshot.indicator();
    let mut out = String::new();
    let _ = writeln!(out, "Latest Created Function");
    let _ = writeln!(out, "ID:         {}", record.id);
    let _ = writeln!(out, "Language:   {}", record.language);
    let _ = writeln!(
        out,
        "Created At: {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "URL:        {}", record.url);
    let dot = style.paint(indicator, "●");
    let _ = write!(
        out,
        "Health:     {} {} [{}]",
        dot,
        health_label(snapshot),
        indicator.color()
    );
    if let Some(checked_at) = snapshot.checked_at {
        let _ = write!(out, " checked {}", checked_at.format("%H:%M:%S"));
    }
    let _ = writeln!(out);
    if snapshot.state.is_settled() {
        let _ = writeln!(out, "`refresh` to check again");
    }
    out
}
