//! FaaS console library.
//!
//! Exposes the submission form, the latest-function store and the status
//! panel so they can be driven by the binary and by tests.

pub mod api_client;
pub mod config;
pub mod console;
pub mod errors;
pub mod http_objects;
pub mod status_panel;
pub mod store;
pub mod submission;
pub mod tracing;
pub mod view;

pub use api_client::{FunctionsApi, HttpFunctionsApi};
pub use console::{Command, Console};
pub use errors::{ApiError, HealthCheckError, SubmissionError};
pub use status_panel::{HealthState, PanelSnapshot, StatusPanel, StatusPanelHandle};
pub use store::LatestFunctionStore;
pub use submission::{FormState, SubmissionForm};
