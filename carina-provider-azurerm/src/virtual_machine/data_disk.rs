//! `data_disk` blocks

use std::collections::HashMap;

use carina_core::resource::{Attributes, Value};
use carina_core::schema::{AttributeSchema, AttributeType, BlockSchema, DiffSuppress, types};
use log::debug;

use crate::compute::{
    CachingTypes, DataDisk, DiskCreateOptionTypes, DiskEncryptionSetParameters, DisksClient,
    ManagedDiskParameters, StorageAccountTypes,
};
use crate::config::LookupContext;
use crate::error::{Error, Result};
use crate::ids::{DiskEncryptionSetId, ManagedDiskId};
use crate::utils::{disk_size_gb, parse_enum, to_int32};
use crate::virtual_machine::os_disk::disk_encryption_set_id_type;

const BLOCK: &str = "data_disk";

/// Largest managed data disk, in GB
pub const MAX_DATA_DISK_SIZE_GB: i64 = 32767;

pub fn data_disk_schema() -> AttributeSchema {
    AttributeSchema::new(
        BLOCK,
        AttributeType::Block(
            BlockSchema::new()
                .attribute(
                    AttributeSchema::new("caching", types::string_in(&CachingTypes::values()))
                        .required(),
                )
                .attribute(AttributeSchema::new("lun", types::int_at_least(0)).required())
                .attribute(AttributeSchema::new("name", types::non_empty_string()).required())
                .attribute(
                    AttributeSchema::new(
                        "storage_account_type",
                        types::string_in(&StorageAccountTypes::values()),
                    )
                    .required()
                    .with_diff_suppress(DiffSuppress::CaseInsensitive),
                )
                .attribute(AttributeSchema::new(
                    "disk_encryption_set_id",
                    disk_encryption_set_id_type(),
                ))
                .attribute(
                    AttributeSchema::new(
                        "disk_size_gb",
                        types::int_between(0, MAX_DATA_DISK_SIZE_GB),
                    )
                    .computed(),
                )
                .attribute(
                    AttributeSchema::new("managed_disk_id", AttributeType::String).computed(),
                )
                .attribute(
                    AttributeSchema::new("write_accelerator_enabled", AttributeType::Bool)
                        .with_default(Value::Bool(false)),
                )
                .attribute(
                    AttributeSchema::new("create_option", AttributeType::String).read_only(),
                )
                .attribute(
                    AttributeSchema::new("disk_iops_read_write", AttributeType::Int).read_only(),
                )
                .attribute(
                    AttributeSchema::new("disk_mbps_read_write", AttributeType::Int).read_only(),
                ),
        ),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDiskConfig {
    pub name: String,
    pub lun: i32,
    pub caching: CachingTypes,
    pub storage_account_type: StorageAccountTypes,
    pub disk_encryption_set_id: Option<String>,
    pub disk_size_gb: Option<i32>,
    /// Existing disk to attach, or the disk created on a previous apply
    pub managed_disk_id: Option<String>,
    pub write_accelerator_enabled: bool,
    /// Create option recorded by an earlier read; `None` on first apply
    pub create_option: Option<DiskCreateOptionTypes>,
}

impl DataDiskConfig {
    pub fn new(
        name: impl Into<String>,
        lun: i32,
        caching: CachingTypes,
        storage_account_type: StorageAccountTypes,
    ) -> Self {
        Self {
            name: name.into(),
            lun,
            caching,
            storage_account_type,
            disk_encryption_set_id: None,
            disk_size_gb: None,
            managed_disk_id: None,
            write_accelerator_enabled: false,
            create_option: None,
        }
    }

    /// Decode every `data_disk` block; an absent attribute is no disks
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>> {
        let items = value
            .as_list()
            .ok_or_else(|| Error::invalid_value(BLOCK, "expected a list of blocks"))?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let map = item.as_map().ok_or_else(|| {
                    Error::invalid_value(format!("data_disk[{}]", index), "expected a block")
                })?;
                Self::from_attributes(index, &Attributes::new(map))
            })
            .collect()
    }

    fn from_attributes(index: usize, attrs: &Attributes<'_>) -> Result<Self> {
        let field = |name: &str| format!("data_disk[{}].{}", index, name);

        let name = attrs
            .required_string("name")
            .map_err(Error::config(BLOCK))?;
        if name.is_empty() {
            return Err(Error::invalid_value(field("name"), "must not be empty"));
        }

        let lun = attrs.required_int("lun").map_err(Error::config(BLOCK))?;
        if lun < 0 {
            return Err(Error::invalid_value(
                field("lun"),
                format!("must be at least 0, got {}", lun),
            ));
        }

        let caching = parse_enum(
            &field("caching"),
            attrs.required_string("caching").map_err(Error::config(BLOCK))?,
        )?;

        // configuration and API may disagree on case
        let storage_account_type = StorageAccountTypes::parse_ignore_case(
            attrs
                .required_string("storage_account_type")
                .map_err(Error::config(BLOCK))?,
        )
        .map_err(|e| Error::invalid_value(field("storage_account_type"), e))?;

        let disk_encryption_set_id = attrs
            .non_empty_string("disk_encryption_set_id")
            .map_err(Error::config(BLOCK))?
            .map(|id| {
                id.parse::<DiskEncryptionSetId>()
                    .map(|_| id.to_string())
                    .map_err(|source| Error::Parse {
                        field: field("disk_encryption_set_id"),
                        source,
                    })
            })
            .transpose()?;

        let create_option = attrs
            .non_empty_string("create_option")
            .map_err(Error::config(BLOCK))?
            .map(|raw| parse_enum(&field("create_option"), raw))
            .transpose()?;

        Ok(Self {
            name: name.to_string(),
            lun: to_int32(&field("lun"), lun)?,
            caching,
            storage_account_type,
            disk_encryption_set_id,
            disk_size_gb: disk_size_gb(attrs, &field("disk_size_gb"), MAX_DATA_DISK_SIZE_GB)?,
            managed_disk_id: attrs
                .non_empty_string("managed_disk_id")
                .map_err(Error::config(BLOCK))?
                .map(str::to_string),
            write_accelerator_enabled: attrs
                .bool_or("write_accelerator_enabled", false)
                .map_err(Error::config(BLOCK))?,
            create_option,
        })
    }
}

/// Build the data disks for a request
///
/// A disk with a `managed_disk_id` is looked up to take its size; on the
/// first apply (no recorded create option) it is attached rather than
/// created empty. Any lookup failure, not found included, is an error.
pub async fn expand_data_disks(
    ctx: &LookupContext,
    disks: &dyn DisksClient,
    input: &[DataDiskConfig],
) -> Result<Vec<DataDisk>> {
    let mut result = Vec::with_capacity(input.len());

    for config in input {
        let mut data_disk = DataDisk {
            lun: config.lun,
            name: Some(config.name.clone()),
            caching: Some(config.caching),
            write_accelerator_enabled: Some(config.write_accelerator_enabled),
            create_option: DiskCreateOptionTypes::Empty,
            disk_size_gb: config.disk_size_gb,
            managed_disk: Some(ManagedDiskParameters {
                id: None,
                storage_account_type: Some(config.storage_account_type),
                disk_encryption_set: config.disk_encryption_set_id.as_ref().map(|id| {
                    DiskEncryptionSetParameters {
                        id: Some(id.clone()),
                    }
                }),
            }),
            disk_iops_read_write: None,
            disk_mbps_read_write: None,
        };

        if let Some(raw_id) = &config.managed_disk_id {
            let id: ManagedDiskId = raw_id.parse().map_err(|source| Error::DataDiskId {
                name: config.name.clone(),
                source,
            })?;

            let lookup = ctx.get_disk(disks, &id.resource_group, &id.name).await;
            let existing = lookup.map_err(|source| Error::DataDiskLookup {
                name: id.name.clone(),
                resource_group: id.resource_group.clone(),
                source,
            })?;

            if let Some(managed) = data_disk.managed_disk.as_mut() {
                managed.id = Some(raw_id.clone());
            }
            data_disk.disk_size_gb = existing.disk_size_gb();
            data_disk.create_option = config.create_option.unwrap_or_else(|| {
                debug!(
                    "Data disk {} uses existing managed disk {}, attaching it",
                    config.name, id.name
                );
                DiskCreateOptionTypes::Attach
            });
        }

        result.push(data_disk);
    }

    Ok(result)
}

pub fn flatten_data_disks(input: Option<&[DataDisk]>) -> Value {
    let disks = input
        .unwrap_or_default()
        .iter()
        .map(|disk| {
            let managed = disk.managed_disk.as_ref();
            Value::Map(HashMap::from([
                (
                    "name".to_string(),
                    Value::string(disk.name.clone().unwrap_or_default()),
                ),
                ("lun".to_string(), Value::from(disk.lun)),
                (
                    "caching".to_string(),
                    Value::string(disk.caching.map(|c| c.as_str()).unwrap_or_default()),
                ),
                (
                    "storage_account_type".to_string(),
                    Value::string(
                        managed
                            .and_then(|m| m.storage_account_type)
                            .map(|t| t.as_str())
                            .unwrap_or_default(),
                    ),
                ),
                (
                    "managed_disk_id".to_string(),
                    Value::string(managed.and_then(|m| m.id.clone()).unwrap_or_default()),
                ),
                (
                    "disk_encryption_set_id".to_string(),
                    Value::string(
                        managed
                            .and_then(|m| m.disk_encryption_set_id())
                            .unwrap_or_default(),
                    ),
                ),
                (
                    "disk_size_gb".to_string(),
                    Value::from(disk.disk_size_gb.unwrap_or(0)),
                ),
                (
                    "create_option".to_string(),
                    Value::string(disk.create_option.as_str()),
                ),
                (
                    "write_accelerator_enabled".to_string(),
                    Value::Bool(disk.write_accelerator_enabled.unwrap_or(false)),
                ),
                (
                    "disk_iops_read_write".to_string(),
                    Value::Int(disk.disk_iops_read_write.unwrap_or(0)),
                ),
                (
                    "disk_mbps_read_write".to_string(),
                    Value::Int(disk.disk_mbps_read_write.unwrap_or(0)),
                ),
            ]))
        })
        .collect();

    Value::List(disks)
}
