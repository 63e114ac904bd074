//! Azure Resource Manager resource IDs
//!
//! IDs look like
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}`.
//! Segment keys are matched case-insensitively since ARM is not consistent
//! about their case in responses.

use std::fmt;
use std::str::FromStr;

use carina_core::resource::Value;

/// Error parsing a resource ID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("resource ID is empty")]
    Empty,

    #[error("resource ID '{0}' must start with '/'")]
    NotAbsolute(String),

    #[error("resource ID '{0}' must consist of key/value pairs")]
    OddSegments(String),

    #[error("resource ID '{id}' is missing the '{key}' segment")]
    MissingSegment { id: String, key: String },

    #[error("resource ID '{id}' has an empty value for '{key}'")]
    EmptySegment { id: String, key: String },

    #[error("resource ID '{id}' has unexpected segments: {}", extra.join(", "))]
    UnexpectedSegments { id: String, extra: Vec<String> },
}

/// A parsed ARM resource ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    /// Resource provider namespace (e.g. "Microsoft.Compute")
    pub provider: Option<String>,
    /// Remaining key/value segments in order
    pub path: Vec<(String, String)>,
    raw: String,
}

impl ResourceId {
    pub fn parse(id: &str) -> Result<Self, ParseError> {
        if id.is_empty() {
            return Err(ParseError::Empty);
        }
        let Some(trimmed) = id.strip_prefix('/') else {
            return Err(ParseError::NotAbsolute(id.to_string()));
        };

        let segments: Vec<&str> = trimmed.trim_end_matches('/').split('/').collect();
        if segments.len() % 2 != 0 {
            return Err(ParseError::OddSegments(id.to_string()));
        }

        let mut path = Vec::with_capacity(segments.len() / 2);
        for pair in segments.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if value.is_empty() {
                return Err(ParseError::EmptySegment {
                    id: id.to_string(),
                    key: key.to_string(),
                });
            }
            path.push((key.to_string(), value.to_string()));
        }

        let mut parsed = Self {
            subscription_id: String::new(),
            resource_group: String::new(),
            provider: None,
            path,
            raw: id.to_string(),
        };
        parsed.subscription_id = parsed.pop("subscriptions")?;
        parsed.resource_group = parsed.pop("resourceGroups")?;
        parsed.provider = parsed.take("providers");
        Ok(parsed)
    }

    fn take(&mut self, key: &str) -> Option<String> {
        let index = self
            .path
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))?;
        Some(self.path.remove(index).1)
    }

    /// Remove and return the value of a required segment
    pub fn pop(&mut self, key: &str) -> Result<String, ParseError> {
        self.take(key).ok_or_else(|| ParseError::MissingSegment {
            id: self.raw.clone(),
            key: key.to_string(),
        })
    }

    /// Fail if any segment has not been consumed
    pub fn ensure_consumed(&self) -> Result<(), ParseError> {
        if self.path.is_empty() {
            Ok(())
        } else {
            Err(ParseError::UnexpectedSegments {
                id: self.raw.clone(),
                extra: self.path.iter().map(|(k, _)| k.clone()).collect(),
            })
        }
    }
}

macro_rules! compute_resource_id {
    ($(#[$meta:meta])* $name:ident, $segment:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub subscription_id: String,
            pub resource_group: String,
            pub name: String,
        }

        impl $name {
            pub fn new(
                subscription_id: impl Into<String>,
                resource_group: impl Into<String>,
                name: impl Into<String>,
            ) -> Self {
                Self {
                    subscription_id: subscription_id.into(),
                    resource_group: resource_group.into(),
                    name: name.into(),
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut id = ResourceId::parse(s)?;
                let name = id.pop($segment)?;
                id.ensure_consumed()?;
                Ok(Self {
                    subscription_id: id.subscription_id,
                    resource_group: id.resource_group,
                    name,
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/{}/{}",
                    self.subscription_id, self.resource_group, $segment, self.name
                )
            }
        }
    };
}

compute_resource_id!(
    /// ID of a managed disk
    ManagedDiskId,
    "disks"
);

compute_resource_id!(
    /// ID of a disk encryption set
    DiskEncryptionSetId,
    "diskEncryptionSets"
);

/// Schema validator for disk encryption set IDs; an empty string is unset
pub fn validate_disk_encryption_set_id(value: &Value) -> Result<(), String> {
    match value {
        Value::String(s) if s.is_empty() => Ok(()),
        Value::String(s) => s
            .parse::<DiskEncryptionSetId>()
            .map(|_| ())
            .map_err(|e| e.to_string()),
        _ => Err("Expected string".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISK_ID: &str =
        "/subscriptions/11111111-2222-3333-4444-555555555555/resourceGroups/acctest-rg/providers/Microsoft.Compute/disks/acctest-data";

    #[test]
    fn parse_managed_disk_id() {
        let id: ManagedDiskId = DISK_ID.parse().unwrap();
        assert_eq!(id.subscription_id, "11111111-2222-3333-4444-555555555555");
        assert_eq!(id.resource_group, "acctest-rg");
        assert_eq!(id.name, "acctest-data");
        assert_eq!(id.to_string(), DISK_ID);
        assert_eq!(
            id,
            ManagedDiskId::new(
                "11111111-2222-3333-4444-555555555555",
                "acctest-rg",
                "acctest-data"
            )
        );
    }

    #[test]
    fn built_encryption_set_id_validates() {
        let id = DiskEncryptionSetId::new("0000", "rg", "des1");
        assert!(validate_disk_encryption_set_id(&Value::string(id.to_string())).is_ok());
        assert_eq!(id.to_string().parse::<DiskEncryptionSetId>(), Ok(id));
    }

    #[test]
    fn segment_keys_ignore_case() {
        let id: ManagedDiskId =
            "/subscriptions/0000/resourcegroups/ACCTEST-RG/providers/Microsoft.Compute/Disks/osdisk"
                .parse()
                .unwrap();
        assert_eq!(id.resource_group, "ACCTEST-RG");
        assert_eq!(id.name, "osdisk");
    }

    #[test]
    fn generic_resource_id() {
        let id = ResourceId::parse(
            "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/networkInterfaces/nic1",
        )
        .unwrap();
        assert_eq!(id.provider.as_deref(), Some("Microsoft.Network"));
        assert_eq!(
            id.path,
            vec![("networkInterfaces".to_string(), "nic1".to_string())]
        );
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!("".parse::<ManagedDiskId>(), Err(ParseError::Empty));
        assert!(matches!(
            "subscriptions/0000".parse::<ManagedDiskId>(),
            Err(ParseError::NotAbsolute(_))
        ));
        assert!(matches!(
            "/subscriptions/0000/resourceGroups".parse::<ManagedDiskId>(),
            Err(ParseError::OddSegments(_))
        ));
        assert!(matches!(
            "/subscriptions/0000/providers/Microsoft.Compute/disks/d1".parse::<ManagedDiskId>(),
            Err(ParseError::MissingSegment { ref key, .. }) if key == "resourceGroups"
        ));
    }

    #[test]
    fn rejects_other_resource_types() {
        let err = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Compute/diskEncryptionSets/des1"
            .parse::<ManagedDiskId>()
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingSegment { ref key, .. } if key == "disks"));

        let err = format!("{}/snapshots/s1", DISK_ID)
            .parse::<ManagedDiskId>()
            .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedSegments { .. }));
    }

    #[test]
    fn disk_encryption_set_validator() {
        let des = Value::string(
            "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Compute/diskEncryptionSets/des1",
        );
        assert!(validate_disk_encryption_set_id(&des).is_ok());
        assert!(validate_disk_encryption_set_id(&Value::string(DISK_ID)).is_err());
        assert!(validate_disk_encryption_set_id(&Value::Int(1)).is_err());
        assert!(validate_disk_encryption_set_id(&Value::string("")).is_ok());
    }
}
