//! `os_disk` block
//!
//! The virtual machine API omits some OS disk fields (storage tier, size,
//! encryption set) for ephemeral disks, so flattening reads the managed
//! disk back through the Disks API when an ID is present.

use std::collections::HashMap;

use carina_core::resource::{Attributes, Value};
use carina_core::schema::{AttributeSchema, AttributeType, BlockSchema, DiffSuppress, types};
use log::debug;

use crate::compute::{
    CachingTypes, DiffDiskOptions, DiffDiskSettings, DiskCreateOptionTypes,
    DiskEncryptionSetParameters, DisksClient, ManagedDiskParameters, OperatingSystemTypes, OsDisk,
    StorageAccountTypes,
};
use crate::config::LookupContext;
use crate::error::{Error, Result};
use crate::ids::{DiskEncryptionSetId, ManagedDiskId, validate_disk_encryption_set_id};
use crate::utils::{disk_size_gb, parse_enum};

const BLOCK: &str = "os_disk";

/// Largest OS disk, in GB
pub const MAX_OS_DISK_SIZE_GB: i64 = 2048;

/// OS disks cannot be Ultra SSDs
pub const OS_DISK_STORAGE_ACCOUNT_TYPES: &[StorageAccountTypes] = &[
    StorageAccountTypes::PremiumLrs,
    StorageAccountTypes::StandardLrs,
    StorageAccountTypes::StandardSsdLrs,
];

pub fn os_disk_schema() -> AttributeSchema {
    let storage_types: Vec<&str> = OS_DISK_STORAGE_ACCOUNT_TYPES
        .iter()
        .map(|t| t.as_str())
        .collect();

    AttributeSchema::new(
        BLOCK,
        AttributeType::Block(
            BlockSchema::new()
                .attribute(
                    AttributeSchema::new("caching", types::string_in(&CachingTypes::values()))
                        .required(),
                )
                .attribute(
                    // the API refuses to change this in place
                    AttributeSchema::new("storage_account_type", types::string_in(&storage_types))
                        .required()
                        .force_new(),
                )
                .attribute(
                    AttributeSchema::new(
                        "diff_disk_settings",
                        AttributeType::Block(
                            BlockSchema::new()
                                .attribute(
                                    AttributeSchema::new(
                                        "option",
                                        types::string_in(&DiffDiskOptions::values()),
                                    )
                                    .required()
                                    .force_new(),
                                )
                                .max_items(1),
                        ),
                    )
                    .force_new(),
                )
                .attribute(
                    // returned with the resource group upper-cased
                    AttributeSchema::new("disk_encryption_set_id", disk_encryption_set_id_type())
                        .with_diff_suppress(DiffSuppress::CaseInsensitive),
                )
                .attribute(
                    AttributeSchema::new("disk_size_gb", types::int_between(0, MAX_OS_DISK_SIZE_GB))
                        .computed(),
                )
                .attribute(
                    AttributeSchema::new("name", AttributeType::String)
                        .computed()
                        .force_new(),
                )
                .attribute(
                    AttributeSchema::new("write_accelerator_enabled", AttributeType::Bool)
                        .with_default(Value::Bool(false)),
                )
                .max_items(1),
        ),
    )
    .required()
}

pub(crate) fn disk_encryption_set_id_type() -> AttributeType {
    AttributeType::Custom {
        name: "DiskEncryptionSetId".to_string(),
        base: Box::new(AttributeType::String),
        validate: validate_disk_encryption_set_id,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsDiskConfig {
    pub caching: CachingTypes,
    pub storage_account_type: StorageAccountTypes,
    pub diff_disk_option: Option<DiffDiskOptions>,
    pub disk_encryption_set_id: Option<String>,
    /// `None` lets the platform size the disk from the image
    pub disk_size_gb: Option<i32>,
    pub name: Option<String>,
    pub write_accelerator_enabled: bool,
}

impl OsDiskConfig {
    pub fn new(caching: CachingTypes, storage_account_type: StorageAccountTypes) -> Self {
        Self {
            caching,
            storage_account_type,
            diff_disk_option: None,
            disk_encryption_set_id: None,
            disk_size_gb: None,
            name: None,
            write_accelerator_enabled: false,
        }
    }

    /// Decode the required block
    pub fn from_value(value: &Value) -> Result<Self> {
        let attrs = Attributes::from_block(value)
            .map_err(Error::config(BLOCK))?
            .ok_or_else(|| Error::validation("exactly one `os_disk` block is required"))?;
        Self::from_attributes(&attrs)
    }

    fn from_attributes(attrs: &Attributes<'_>) -> Result<Self> {
        let caching = parse_enum(
            "os_disk.caching",
            attrs.required_string("caching").map_err(Error::config(BLOCK))?,
        )?;

        let storage_account_type: StorageAccountTypes = parse_enum(
            "os_disk.storage_account_type",
            attrs
                .required_string("storage_account_type")
                .map_err(Error::config(BLOCK))?,
        )?;
        if !OS_DISK_STORAGE_ACCOUNT_TYPES.contains(&storage_account_type) {
            return Err(Error::invalid_value(
                "os_disk.storage_account_type",
                format!("{} is not supported for OS disks", storage_account_type),
            ));
        }

        let diff_disk_option = match attrs
            .block("diff_disk_settings")
            .map_err(Error::config(BLOCK))?
        {
            Some(settings) => Some(parse_enum(
                "os_disk.diff_disk_settings.option",
                settings
                    .required_string("option")
                    .map_err(Error::config(BLOCK))?,
            )?),
            None => None,
        };

        let disk_encryption_set_id = attrs
            .non_empty_string("disk_encryption_set_id")
            .map_err(Error::config(BLOCK))?
            .map(|id| {
                id.parse::<DiskEncryptionSetId>()
                    .map(|_| id.to_string())
                    .map_err(|source| Error::Parse {
                        field: "os_disk.disk_encryption_set_id".to_string(),
                        source,
                    })
            })
            .transpose()?;

        Ok(Self {
            caching,
            storage_account_type,
            diff_disk_option,
            disk_encryption_set_id,
            disk_size_gb: disk_size_gb(attrs, "os_disk.disk_size_gb", MAX_OS_DISK_SIZE_GB)?,
            name: attrs
                .non_empty_string("name")
                .map_err(Error::config(BLOCK))?
                .map(str::to_string),
            write_accelerator_enabled: attrs
                .bool_or("write_accelerator_enabled", false)
                .map_err(Error::config(BLOCK))?,
        })
    }
}

/// Build the OS disk for a request
///
/// The disk is always provisioned from the machine's image.
pub fn expand_os_disk(input: &OsDiskConfig, os_type: OperatingSystemTypes) -> OsDisk {
    OsDisk {
        os_type: Some(os_type),
        name: input.name.clone(),
        caching: Some(input.caching),
        write_accelerator_enabled: Some(input.write_accelerator_enabled),
        diff_disk_settings: input
            .diff_disk_option
            .map(|option| DiffDiskSettings { option }),
        create_option: DiskCreateOptionTypes::FromImage,
        disk_size_gb: input.disk_size_gb,
        managed_disk: Some(ManagedDiskParameters {
            id: None,
            storage_account_type: Some(input.storage_account_type),
            disk_encryption_set: input
                .disk_encryption_set_id
                .as_ref()
                .map(|id| DiskEncryptionSetParameters {
                    id: Some(id.clone()),
                }),
        }),
    }
}

/// Flatten the OS disk, backfilling from the Disks API where possible
///
/// A disk the API reports as not found (ephemeral disks) is tolerated;
/// any other lookup failure is returned.
pub async fn flatten_os_disk(
    ctx: &LookupContext,
    disks: &dyn DisksClient,
    input: Option<&OsDisk>,
) -> Result<Value> {
    let Some(input) = input else {
        return Ok(Value::empty_list());
    };

    let diff_disk_settings = match &input.diff_disk_settings {
        Some(settings) => Value::block(HashMap::from([(
            "option".to_string(),
            Value::string(settings.option.as_str()),
        )])),
        None => Value::empty_list(),
    };

    let mut disk_size_gb = input.disk_size_gb.unwrap_or(0);
    let mut storage_account_type = String::new();
    let mut disk_encryption_set_id = String::new();

    if let Some(managed_disk) = &input.managed_disk {
        if let Some(t) = managed_disk.storage_account_type {
            storage_account_type = t.as_str().to_string();
        }
        if let Some(id) = managed_disk.disk_encryption_set_id() {
            disk_encryption_set_id = id.to_string();
        }

        if let Some(raw_id) = &managed_disk.id {
            let id: ManagedDiskId = raw_id.parse().map_err(|source| Error::Parse {
                field: "os_disk.managed_disk.id".to_string(),
                source,
            })?;

            let lookup = ctx.get_disk(disks, &id.resource_group, &id.name).await;
            match lookup {
                Ok(disk) => {
                    if storage_account_type.is_empty()
                        && let Some(sku) = disk.storage_account_type()
                    {
                        storage_account_type = sku.to_string();
                    }
                    if disk_size_gb == 0
                        && let Some(size) = disk.disk_size_gb()
                    {
                        disk_size_gb = size;
                    }
                    if let Some(des) = disk.disk_encryption_set_id() {
                        disk_encryption_set_id = des.to_string();
                    }
                }
                Err(e) if e.is_not_found() => {
                    debug!(
                        "OS disk {} (resource group {}) is not addressable, assuming an ephemeral disk",
                        id.name, id.resource_group
                    );
                }
                Err(source) => {
                    return Err(Error::Lookup {
                        name: id.name,
                        resource_group: id.resource_group,
                        source,
                    });
                }
            }
        }
    }

    Ok(Value::block(HashMap::from([
        (
            "caching".to_string(),
            Value::string(input.caching.map(|c| c.as_str()).unwrap_or_default()),
        ),
        ("disk_size_gb".to_string(), Value::from(disk_size_gb)),
        ("diff_disk_settings".to_string(), diff_disk_settings),
        (
            "disk_encryption_set_id".to_string(),
            Value::String(disk_encryption_set_id),
        ),
        (
            "name".to_string(),
            Value::string(input.name.clone().unwrap_or_default()),
        ),
        (
            "storage_account_type".to_string(),
            Value::String(storage_account_type),
        ),
        (
            "write_accelerator_enabled".to_string(),
            Value::Bool(input.write_accelerator_enabled.unwrap_or(false)),
        ),
    ])))
}
