pub mod templates;

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Source languages the backend knows how to build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    Python,
    Go,
}

impl Language {
    /// Selector order.
    pub const ALL: [Language; 2] = [Language::Python, Language::Go];

    pub fn label(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Go => "Go",
        }
    }

    /// The canned handler source a fresh draft starts from.
    pub fn template(&self) -> &'static str {
        match self {
            Language::Python => templates::PYTHON_TEMPLATE,
            Language::Go => templates::GO_TEMPLATE,
        }
    }

    /// File name the backend stores the handler body under.
    pub fn handler_file(&self) -> &'static str {
        match self {
            Language::Python => "handler.py",
            Language::Go => "handle.go",
        }
    }

    /// Infers the language from a source file extension.
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "go" => Some(Language::Go),
            _ => None,
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct FunctionId(String);

impl FunctionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FunctionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Metadata of a function the backend accepted for deployment.
///
/// Records are immutable once built; a newer function replaces the record
/// wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionRecord {
    pub id: FunctionId,
    pub language: Language,
    #[serde(with = "timestamp_serde")]
    pub created_at: DateTime<Utc>,
    /// Invocation endpoint of the deployed function.
    pub url: String,
}

mod timestamp_serde {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    // The backend emits timestamps both with and without an offset.
    // Naive timestamps are UTC.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(D::Error::custom)
    }

    pub(super) fn parse_naive(raw: &str) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

pub fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    timestamp_serde::parse_naive(raw)
        .ok_or_else(|| anyhow::anyhow!("invalid timestamp: {}", raw))
}

/// The in-progress submission buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    language: Language,
    body: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl Draft {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            body: language.template().to_string(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Switches language and replaces the body with that language's
    /// template. Edits are discarded even when the language is unchanged.
    pub fn select_language(&mut self, language: Language) {
        self.language = language;
        self.body = language.template().to_string();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// True when the body still equals the canned template.
    pub fn is_pristine(&self) -> bool {
        self.body == self.language.template()
    }
}

/// Tri-state liveness indicator shown next to a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum HealthIndicator {
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthIndicator {
    pub fn color(&self) -> &'static str {
        match self {
            HealthIndicator::Unknown => "gray",
            HealthIndicator::Healthy => "green",
            HealthIndicator::Unhealthy => "red",
        }
    }
}

impl Display for HealthIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
