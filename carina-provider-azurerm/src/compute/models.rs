//! Azure Compute API models (api-version 2020-06-01)
//!
//! Field names follow the ARM JSON wire format. Every optional field is an
//! `Option`; `None` means "unset" and is left out of request bodies, which is
//! different from an explicit zero or empty string.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A string was not one of the values an API enum accepts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {type_name} '{value}', expected one of: {}", expected.join(", "))]
pub struct UnknownVariant {
    pub type_name: &'static str,
    pub value: String,
    pub expected: Vec<&'static str>,
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            /// Wire values of every variant
            pub fn values() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }

            /// Parse ignoring ASCII case, returning the canonical variant
            pub fn parse_ignore_case(s: &str) -> Result<Self, UnknownVariant> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| UnknownVariant {
                        type_name: stringify!($name),
                        value: s.to_string(),
                        expected: Self::values(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        type_name: stringify!($name),
                        value: s.to_string(),
                        expected: Self::values(),
                    })
            }
        }
    };
}

string_enum!(
    /// Host caching mode of a disk
    CachingTypes {
        None => "None",
        ReadOnly => "ReadOnly",
        ReadWrite => "ReadWrite",
    }
);

string_enum!(
    /// Storage tier of a managed disk
    StorageAccountTypes {
        StandardLrs => "Standard_LRS",
        PremiumLrs => "Premium_LRS",
        StandardSsdLrs => "StandardSSD_LRS",
        UltraSsdLrs => "UltraSSD_LRS",
    }
);

string_enum!(
    /// How a disk attached to the machine is created
    DiskCreateOptionTypes {
        FromImage => "FromImage",
        Empty => "Empty",
        Attach => "Attach",
    }
);

string_enum!(
    /// Ephemeral OS disk placement
    DiffDiskOptions {
        Local => "Local",
    }
);

string_enum!(
    OperatingSystemTypes {
        Windows => "Windows",
        Linux => "Linux",
    }
);

string_enum!(
    /// Kind of managed identity assigned to the machine
    ResourceIdentityType {
        SystemAssigned => "SystemAssigned",
        UserAssigned => "UserAssigned",
        SystemAssignedUserAssigned => "SystemAssigned, UserAssigned",
        None => "None",
    }
);

impl ResourceIdentityType {
    /// Whether user-assigned identities may be attached with this kind
    pub fn includes_user_assigned(&self) -> bool {
        matches!(
            self,
            ResourceIdentityType::UserAssigned | ResourceIdentityType::SystemAssignedUserAssigned
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCapabilities {
    #[serde(rename = "ultraSSDEnabled", skip_serializing_if = "Option::is_none")]
    pub ultra_ssd_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentitiesValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "type")]
    pub identity_type: ResourceIdentityType,
    /// Keyed by user-assigned identity resource ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_assigned_identities: Option<BTreeMap<String, UserAssignedIdentitiesValue>>,
}

impl VirtualMachineIdentity {
    pub fn new(identity_type: ResourceIdentityType) -> Self {
        Self {
            principal_id: None,
            tenant_id: None,
            identity_type,
            user_assigned_identities: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterfaceReferenceProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterfaceReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<NetworkInterfaceReferenceProperties>,
}

impl NetworkInterfaceReference {
    pub fn is_primary(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.primary)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffDiskSettings {
    pub option: DiffDiskOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskEncryptionSetParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDiskParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_account_type: Option<StorageAccountTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_encryption_set: Option<DiskEncryptionSetParameters>,
}

impl ManagedDiskParameters {
    pub fn disk_encryption_set_id(&self) -> Option<&str> {
        self.disk_encryption_set
            .as_ref()
            .and_then(|des| des.id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsDisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<OperatingSystemTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_accelerator_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_disk_settings: Option<DiffDiskSettings>,
    pub create_option: DiskCreateOptionTypes,
    #[serde(rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDiskParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDisk {
    pub lun: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_accelerator_enabled: Option<bool>,
    pub create_option: DiskCreateOptionTypes,
    #[serde(rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDiskParameters>,
    /// Response only
    #[serde(rename = "diskIOPSReadWrite", skip_serializing_if = "Option::is_none")]
    pub disk_iops_read_write: Option<i64>,
    /// Response only
    #[serde(rename = "diskMBpsReadWrite", skip_serializing_if = "Option::is_none")]
    pub disk_mbps_read_write: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskSku {
    /// Kept as the raw wire value; the Disks API knows more tiers than a VM
    /// disk can request (e.g. `Premium_ZRS`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encryption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_encryption_set_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub encryption_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskProperties {
    #[serde(rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<Encryption>,
}

/// A managed disk as returned by the Disks API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<DiskSku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<DiskProperties>,
}

impl Disk {
    pub fn disk_size_gb(&self) -> Option<i32> {
        self.properties.as_ref().and_then(|p| p.disk_size_gb)
    }

    /// SKU name as reported by the API
    pub fn storage_account_type(&self) -> Option<&str> {
        self.sku.as_ref().and_then(|sku| sku.name.as_deref())
    }

    pub fn disk_encryption_set_id(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.encryption.as_ref())
            .and_then(|e| e.disk_encryption_set_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enum_wire_values() {
        assert_eq!(StorageAccountTypes::StandardSsdLrs.as_str(), "StandardSSD_LRS");
        assert_eq!(
            "SystemAssigned, UserAssigned".parse::<ResourceIdentityType>(),
            Ok(ResourceIdentityType::SystemAssignedUserAssigned)
        );
        assert_eq!(CachingTypes::ReadWrite.to_string(), "ReadWrite");
        assert_eq!(
            StorageAccountTypes::parse_ignore_case("premium_lrs"),
            Ok(StorageAccountTypes::PremiumLrs)
        );
    }

    #[test]
    fn unknown_enum_value_lists_allowed_values() {
        let err = "Fast".parse::<CachingTypes>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid CachingTypes 'Fast', expected one of: None, ReadOnly, ReadWrite"
        );
    }

    #[test]
    fn identity_kinds_with_user_assigned() {
        assert!(ResourceIdentityType::UserAssigned.includes_user_assigned());
        assert!(ResourceIdentityType::SystemAssignedUserAssigned.includes_user_assigned());
        assert!(!ResourceIdentityType::SystemAssigned.includes_user_assigned());
        assert!(!ResourceIdentityType::None.includes_user_assigned());
    }

    #[test]
    fn os_disk_omits_unset_fields() {
        let disk = OsDisk {
            os_type: Some(OperatingSystemTypes::Linux),
            name: None,
            caching: Some(CachingTypes::ReadWrite),
            write_accelerator_enabled: Some(false),
            diff_disk_settings: None,
            create_option: DiskCreateOptionTypes::FromImage,
            disk_size_gb: None,
            managed_disk: Some(ManagedDiskParameters {
                storage_account_type: Some(StorageAccountTypes::PremiumLrs),
                ..Default::default()
            }),
        };

        assert_eq!(
            serde_json::to_value(&disk).unwrap(),
            json!({
                "osType": "Linux",
                "caching": "ReadWrite",
                "writeAcceleratorEnabled": false,
                "createOption": "FromImage",
                "managedDisk": { "storageAccountType": "Premium_LRS" }
            })
        );
    }

    #[test]
    fn disk_from_arm_response() {
        let body = json!({
            "id": "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Compute/disks/data1",
            "name": "data1",
            "location": "westeurope",
            "sku": { "name": "StandardSSD_LRS", "tier": "Standard" },
            "properties": {
                "diskSizeGB": 64,
                "diskState": "Unattached",
                "encryption": {
                    "type": "EncryptionAtRestWithCustomerKey",
                    "diskEncryptionSetId": "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Compute/diskEncryptionSets/des1"
                }
            }
        });

        let disk: Disk = serde_json::from_value(body).unwrap();
        assert_eq!(disk.disk_size_gb(), Some(64));
        assert_eq!(disk.storage_account_type(), Some("StandardSSD_LRS"));
        assert!(disk.disk_encryption_set_id().unwrap().ends_with("/des1"));
    }

    #[test]
    fn disk_with_newer_sku() {
        let body = json!({
            "sku": { "name": "Premium_ZRS" },
            "properties": { "diskSizeGB": 30 }
        });

        let disk: Disk = serde_json::from_value(body).unwrap();
        assert_eq!(disk.storage_account_type(), Some("Premium_ZRS"));
        assert_eq!(disk.disk_size_gb(), Some(30));
    }

    #[test]
    fn data_disk_response_metrics() {
        let body = json!({
            "lun": 2,
            "name": "data2",
            "caching": "None",
            "createOption": "Attach",
            "diskSizeGB": 128,
            "diskIOPSReadWrite": 500,
            "diskMBpsReadWrite": 60,
            "managedDisk": { "id": "/x", "storageAccountType": "UltraSSD_LRS" }
        });

        let disk: DataDisk = serde_json::from_value(body).unwrap();
        assert_eq!(disk.create_option, DiskCreateOptionTypes::Attach);
        assert_eq!(disk.disk_iops_read_write, Some(500));
        assert_eq!(disk.disk_mbps_read_write, Some(60));
        assert_eq!(disk.caching, Some(CachingTypes::None));
    }
}
