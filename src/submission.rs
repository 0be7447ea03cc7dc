//! The submission form: a draft buffer plus the create action.

use std::sync::Arc;

use data_model::{Draft, FunctionRecord, Language};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    api_client::FunctionsApi,
    errors::SubmissionError,
    http_objects::CreateFunctionRequest,
    store::LatestFunctionStore,
};

/// Everything the form renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub draft: Draft,
    /// True while a create request is outstanding; the submit control is
    /// disabled for that window.
    pub submitting: bool,
    /// Inline message of the last failed submission, until dismissed or
    /// the next attempt.
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct SubmissionForm {
    api: Arc<dyn FunctionsApi>,
    store: LatestFunctionStore,
    state: Arc<watch::Sender<FormState>>,
}

/// Clears the submitting flag however the submit future ends, including
/// when it is dropped mid-request.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<FormState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.submitting, false));
    }
}

impl SubmissionForm {
    pub fn new(api: Arc<dyn FunctionsApi>, store: LatestFunctionStore) -> Self {
        let (state, _rx) = watch::channel(FormState::default());
        Self {
            api,
            store,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn draft(&self) -> Draft {
        self.state.borrow().draft.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.borrow().submitting
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Selects a language and resets the body to its template. Returns
    /// true when edited (non-template) code was discarded.
    pub fn select_language(&self, language: Language) -> bool {
        let mut discarded = false;
        self.state.send_modify(|s| {
            discarded = !s.draft.is_pristine();
            s.draft.select_language(language);
        });
        discarded
    }

    pub fn set_body(&self, body: impl Into<String>) {
        let body = body.into();
        self.state.send_modify(|s| s.draft.set_body(body));
    }

    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Submits the current draft.
    ///
    /// On success the record is published to the store and returned. On
    /// failure the message is kept for inline display. The draft is left
    /// as it was in both cases.
    pub async fn submit(&self) -> Result<Arc<FunctionRecord>, SubmissionError> {
        let mut rejected = None;
        let mut request = None;
        self.state.send_if_modified(|s| {
            if s.submitting {
                rejected = Some(SubmissionError::InFlight);
                return false;
            }
            if s.draft.body().trim().is_empty() {
                let err = SubmissionError::EmptyBody;
                s.error = Some(err.message());
                rejected = Some(err);
                return true;
            }
            s.submitting = true;
            s.error = None;
            request = Some(CreateFunctionRequest {
                language: s.draft.language(),
                body: s.draft.body().to_string(),
            });
            true
        });
        if let Some(err) = rejected {
            return Err(err);
        }
        let Some(request) = request else {
            return Err(SubmissionError::InFlight);
        };

        let _guard = InFlightGuard { state: &self.state };
        let language = request.language;
        match self.api.create_function(request).await {
            Ok(record) => {
                info!(function_id = %record.id, language = %language, "submission accepted");
                Ok(self.store.publish(record))
            }
            Err(e) => {
                let err = SubmissionError::from(e);
                warn!(language = %language, error = %err, "submission failed");
                let message = err.message();
                self.state.send_modify(|s| s.error = Some(message));
                Err(err)
            }
        }
    }
}
