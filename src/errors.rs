use reqwest::StatusCode;

/// Failures of calls against the functions API.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{message} (HTTP {status})")]
    Rejected { status: StatusCode, message: String },

    #[error("request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("unexpected response from backend: {0}")]
    InvalidResponse(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Identifies failures worth retrying by hand: the request never got
    /// a definitive answer, or the backend reported a server-side fault.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => status.is_server_error(),
            Self::InvalidResponse(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// A create call that did not yield a function record.
///
/// The message is what the form shows inline; the draft is never touched.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("A submission is already in progress")]
    InFlight,

    #[error("Function code must not be empty")]
    EmptyBody,

    #[error("{0}")]
    Api(#[from] ApiError),
}

impl SubmissionError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InFlight | Self::EmptyBody => false,
            Self::Api(e) => e.is_retryable(),
        }
    }
}

/// Why a health probe did not report healthy. Never shown on its own; the
/// panel folds every variant into the unhealthy indicator.
#[derive(Debug, thiserror::Error)]
pub enum HealthCheckError {
    #[error("health endpoint returned HTTP {0}")]
    Status(StatusCode),

    #[error("health endpoint reported not healthy: {0}")]
    NotHealthy(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
