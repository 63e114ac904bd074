//! Disks API client
//!
//! Managed disk lookups used to backfill fields the virtual machine API
//! leaves out. Ephemeral OS disks carry an ARM ID but are not addressable
//! here, so "not found" is a distinct outcome callers may tolerate.

use async_trait::async_trait;
use serde::Deserialize;

use super::models::Disk;
use crate::config::ArmClientConfig;

/// Errors returned by a disk lookup
#[derive(Debug, thiserror::Error)]
pub enum DiskLookupError {
    /// The disk does not exist (or is an ephemeral disk)
    #[error("disk was not found")]
    NotFound,

    /// The API answered with an error status
    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never completed
    #[error("request failed: {0}")]
    Transport(String),

    /// The lookup did not finish within the read timeout
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The response body was not a disk
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl DiskLookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiskLookupError::NotFound)
    }
}

impl From<reqwest::Error> for DiskLookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DiskLookupError::Decode(e.to_string())
        } else {
            DiskLookupError::Transport(e.to_string())
        }
    }
}

/// Read access to managed disks
#[async_trait]
pub trait DisksClient: Send + Sync {
    /// Get a managed disk by resource group and name
    async fn get(&self, resource_group: &str, name: &str) -> Result<Disk, DiskLookupError>;
}

/// `DisksClient` backed by the ARM REST API
pub struct ArmDisksClient {
    client: reqwest::Client,
    config: ArmClientConfig,
    subscription_id: String,
}

impl ArmDisksClient {
    pub fn new(config: ArmClientConfig, subscription_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            subscription_id: subscription_id.into(),
        }
    }

    /// Use an existing HTTP client (shared connection pool)
    pub fn with_client(
        client: reqwest::Client,
        config: ArmClientConfig,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            config,
            subscription_id: subscription_id.into(),
        }
    }

    fn disk_url(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/disks/{}?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.subscription_id,
            resource_group,
            name,
            self.config.disks_api_version
        )
    }
}

/// ARM error envelope
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[async_trait]
impl DisksClient for ArmDisksClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Disk, DiskLookupError> {
        let url = self.disk_url(resource_group, name);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DiskLookupError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| format!("{}: {}", e.error.code, e.error.message))
                .unwrap_or(body);
            return Err(DiskLookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Disk>().await?)
    }
}
