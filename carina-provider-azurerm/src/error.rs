//! Error types for the AzureRM provider mappings

use carina_core::schema::TypeError;
use thiserror::Error;

use crate::compute::DiskLookupError;
use crate::ids::ParseError;

/// Errors raised while expanding or flattening virtual machine attributes
#[derive(Debug, Error)]
pub enum Error {
    /// A combination of attributes is inconsistent
    #[error("{0}")]
    Validation(String),

    /// The configuration mapping has the wrong shape
    #[error("invalid configuration for `{block}`: {source}")]
    Config {
        block: &'static str,
        #[source]
        source: TypeError,
    },

    /// An attribute value is not one the API accepts
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },

    /// A resource ID could not be parsed
    #[error("parsing `{field}`: {source}")]
    Parse {
        field: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to parse Managed Disk ID for Data Disk {name:?}")]
    DataDiskId {
        name: String,
        #[source]
        source: ParseError,
    },

    /// A disk lookup failed for the OS disk
    #[error("retrieving Managed Disk {name:?} (resource group {resource_group:?}): {source}")]
    Lookup {
        name: String,
        resource_group: String,
        #[source]
        source: DiskLookupError,
    },

    #[error(
        "failed to retrieve Managed Disk information for Data Disk {name:?} (resource group {resource_group:?})"
    )]
    DataDiskLookup {
        name: String,
        resource_group: String,
        #[source]
        source: DiskLookupError,
    },

    /// A required environment variable is not set
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn config(block: &'static str) -> impl FnOnce(TypeError) -> Self {
        move |source| Self::Config { block, source }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for provider mappings
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_disk_lookup_names_disk_and_group() {
        let error = Error::DataDiskLookup {
            name: "data1".to_string(),
            resource_group: "rg1".to_string(),
            source: DiskLookupError::NotFound,
        };
        assert_eq!(
            error.to_string(),
            "failed to retrieve Managed Disk information for Data Disk \"data1\" (resource group \"rg1\")"
        );
    }

    #[test]
    fn config_error_names_block() {
        let error = Error::config("os_disk")(TypeError::MissingRequired {
            name: "caching".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "invalid configuration for `os_disk`: Required attribute 'caching' is missing"
        );
    }
}
