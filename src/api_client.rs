//! HTTP client for the backend functions API.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use data_model::{FunctionId, FunctionRecord};
use reqwest::Response;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::ConsoleConfig,
    errors::{ApiError, HealthCheckError},
    http_objects::{is_healthy_body, CreateFunctionRequest, ErrorBody, FunctionResponse},
};

/// The calls the console makes against the backend.
#[async_trait]
pub trait FunctionsApi: Send + Sync {
    /// Submits source code for deployment. Resolves once the backend has
    /// accepted the function.
    async fn create_function(
        &self,
        request: CreateFunctionRequest,
    ) -> Result<FunctionRecord, ApiError>;

    /// `Ok(())` only when the backend answered 2xx with the literal `true`.
    async fn check_health(&self, id: &FunctionId) -> Result<(), HealthCheckError>;

    async fn delete_function(&self, id: &FunctionId) -> Result<(), ApiError>;
}

pub struct HttpFunctionsApi {
    client: reqwest::Client,
    functions_url: Url,
    create_timeout: Duration,
    health_timeout: Duration,
}

impl HttpFunctionsApi {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("faas-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            functions_url: config.functions_url()?,
            create_timeout: config.create_timeout,
            health_timeout: config.health_check.timeout,
        })
    }

    fn function_url(&self, id: &FunctionId, suffix: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.functions_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.functions_url.to_string()))?;
            segments.pop_if_empty().push(id.get());
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    fn map_send_error(e: reqwest::Error, timeout: Duration) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(timeout)
        } else {
            ApiError::Transport { source: e }
        }
    }

    /// Turns a non-2xx response into `ApiError::Rejected`, preferring the
    /// backend's own error detail as the message.
    async fn rejection(response: Response, fallback: &str) -> ApiError {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or_else(|| fallback.to_string());
        ApiError::Rejected { status, message }
    }
}

#[async_trait]
impl FunctionsApi for HttpFunctionsApi {
    async fn create_function(
        &self,
        request: CreateFunctionRequest,
    ) -> Result<FunctionRecord, ApiError> {
        debug!(language = %request.language, url = %self.functions_url, "creating function");
        let response = self
            .client
            .post(self.functions_url.clone())
            .timeout(self.create_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, self.create_timeout))?;

        if !response.status().is_success() {
            let err = Self::rejection(response, "Failed to create function").await;
            warn!(error = %err, "create function rejected");
            return Err(err);
        }

        let body: FunctionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.create_timeout)
            } else {
                ApiError::InvalidResponse(e.to_string())
            }
        })?;
        let record = FunctionRecord::try_from(body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        info!(function_id = %record.id, language = %record.language, url = %record.url, "function created");
        Ok(record)
    }

    async fn check_health(&self, id: &FunctionId) -> Result<(), HealthCheckError> {
        let url = self.function_url(id, Some("health"))?;
        let response = self
            .client
            .get(url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, self.health_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HealthCheckError::Status(status));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_send_error(e, self.health_timeout))?;
        if is_healthy_body(&body) {
            Ok(())
        } else {
            Err(HealthCheckError::NotHealthy(
                String::from_utf8_lossy(&body).trim().to_string(),
            ))
        }
    }

    async fn delete_function(&self, id: &FunctionId) -> Result<(), ApiError> {
        let url = self.function_url(id, None)?;
        let response = self
            .client
            .delete(url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, self.health_timeout))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, "Failed to delete function").await);
        }
        info!(function_id = %id, "function deleted");
        Ok(())
    }
}
