use std::time::Duration;

use cubeflow_core::{AccessToken, BuildHandle, BuildMode};
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{Result, SisenseError};
use crate::types::{
    extract_build_id, BuildStatusResponse, LoginRequest, LoginResponse, StartBuildRequest,
};

/// Request-level timeout, separate from the build-completion deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct SisenseClient {
    base_url: String,
    client: Client,
}

impl SisenseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in and return a fresh bearer token.
    ///
    /// Failure here is fatal to the whole run: no retry, no fallback.
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        info!("Logging in to {}", self.base_url);

        let response = self
            .client
            .post(format!("{}/api/v1/authentication/login", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .form(&LoginRequest { username, password })
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: LoginResponse = response.json().await?;
        let token = body.into_token().ok_or(SisenseError::MissingToken)?;

        info!("Got token (prefix {}...)", token.preview());
        Ok(token)
    }

    /// Trigger an asynchronous build for one data model.
    ///
    /// Returns the build identifier; completion is observed separately via
    /// `build_status`.
    pub async fn start_build(
        &self,
        token: &AccessToken,
        datamodel_id: &str,
        mode: BuildMode,
    ) -> Result<BuildHandle> {
        debug!(datamodel_id, mode = mode.as_str(), "Triggering build");

        let response = self
            .client
            .post(format!("{}/api/v2/builds", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(token.as_str())
            .json(&StartBuildRequest::new(datamodel_id, mode))
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: serde_json::Value = response.json().await?;
        let build_id = extract_build_id(&body).ok_or_else(|| {
            SisenseError::InvalidResponse("trigger response carried no identifier".to_string())
        })?;

        debug!(build_id, "Build triggered");
        Ok(BuildHandle::new(build_id))
    }

    /// One status poll for a running build.
    pub async fn build_status(
        &self,
        token: &AccessToken,
        handle: &BuildHandle,
    ) -> Result<BuildStatusResponse> {
        let response = self
            .client
            .get(format!("{}/api/v2/builds/{}", self.base_url, handle))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn get_json(
        &self,
        token: &AccessToken,
        url: &str,
    ) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Map any non-2xx response to `SisenseError::Http`, keeping the body for
/// transient-error classification by callers.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SisenseError::Http {
        status: status.as_u16(),
        body,
    })
}
