//! ARM client configuration and lookup context

use std::time::Duration;

use log::debug;

use crate::compute::{Disk, DiskLookupError, DisksClient};
use crate::error::{Error, Result};

/// Default Resource Manager endpoint (public cloud)
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Disks API version matching the 2020-06-01 compute API
pub const DEFAULT_DISKS_API_VERSION: &str = "2020-06-30";

/// Default read timeout for a resource, in seconds
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 5 * 60;

/// Settings for talking to Azure Resource Manager
#[derive(Debug, Clone)]
pub struct ArmClientConfig {
    /// Resource Manager endpoint (default: public cloud)
    pub endpoint: String,

    /// api-version used for the Disks API
    pub disks_api_version: String,

    /// Bearer token for Resource Manager
    pub access_token: String,

    /// Timeout for each read made while expanding/flattening
    pub read_timeout: Duration,
}

impl Default for ArmClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            disks_api_version: DEFAULT_DISKS_API_VERSION.to_string(),
            access_token: String::new(),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

impl ArmClientConfig {
    /// Create ArmClientConfig from environment variables
    ///
    /// `ARM_ACCESS_TOKEN` is required; `ARM_ENDPOINT`,
    /// `ARM_DISKS_API_VERSION` and `ARM_READ_TIMEOUT` (seconds) override
    /// the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let access_token = get("ARM_ACCESS_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::MissingEnvVar("ARM_ACCESS_TOKEN".to_string()))?;

        let mut config = Self {
            access_token,
            ..Default::default()
        };
        if let Some(endpoint) = get("ARM_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(version) = get("ARM_DISKS_API_VERSION") {
            config.disks_api_version = version;
        }
        if let Some(secs) = get("ARM_READ_TIMEOUT") {
            let secs = secs
                .parse::<u64>()
                .map_err(|e| Error::invalid_value("ARM_READ_TIMEOUT", e))?;
            config.read_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Caller-supplied context for the disk lookups made during expand/flatten
#[derive(Debug, Clone, Copy)]
pub struct LookupContext {
    pub timeout: Duration,
}

impl LookupContext {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Look up a disk, bounded by the context timeout
    pub async fn get_disk(
        &self,
        client: &dyn DisksClient,
        resource_group: &str,
        name: &str,
    ) -> std::result::Result<Disk, DiskLookupError> {
        debug!(
            "Looking up managed disk {} in resource group {}",
            name, resource_group
        );
        match tokio::time::timeout(self.timeout, client.get(resource_group, name)).await {
            Ok(result) => result,
            Err(_) => Err(DiskLookupError::Timeout(self.timeout)),
        }
    }
}

impl Default for LookupContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS))
    }
}

impl From<&ArmClientConfig> for LookupContext {
    fn from(config: &ArmClientConfig) -> Self {
        Self::new(config.read_timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ArmClientConfig::default();
        assert_eq!(config.endpoint, "https://management.azure.com");
        assert_eq!(config.disks_api_version, "2020-06-30");
        assert_eq!(config.read_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_config_from_env() {
        let config = ArmClientConfig::from_lookup(env(&[
            ("ARM_ACCESS_TOKEN", "secret"),
            ("ARM_ENDPOINT", "https://management.usgovcloudapi.net"),
            ("ARM_READ_TIMEOUT", "30"),
        ]))
        .unwrap();
        assert_eq!(config.access_token, "secret");
        assert_eq!(config.endpoint, "https://management.usgovcloudapi.net");
        assert_eq!(config.disks_api_version, DEFAULT_DISKS_API_VERSION);
        assert_eq!(LookupContext::from(&config).timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_requires_token() {
        let err = ArmClientConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, Error::MissingEnvVar(ref v) if v == "ARM_ACCESS_TOKEN"));
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = ArmClientConfig::from_lookup(env(&[
            ("ARM_ACCESS_TOKEN", "secret"),
            ("ARM_READ_TIMEOUT", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ARM_READ_TIMEOUT"));
    }

    struct SlowDisks;

    #[async_trait]
    impl DisksClient for SlowDisks {
        async fn get(
            &self,
            _resource_group: &str,
            _name: &str,
        ) -> std::result::Result<Disk, DiskLookupError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Disk::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_times_out() {
        let ctx = LookupContext::new(Duration::from_secs(1));
        let err = ctx.get_disk(&SlowDisks, "rg", "disk").await.unwrap_err();
        assert!(matches!(err, DiskLookupError::Timeout(d) if d == Duration::from_secs(1)));
    }
}
