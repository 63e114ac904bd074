//! Virtual machine attribute mappings
//!
//! Each submodule owns one attribute of `azurerm.virtual_machine`: its
//! schema, a typed configuration decoded from `Value`, an `expand_*`
//! function building the API model and a `flatten_*` function turning the
//! API response back into a `Value` for state.

pub mod capabilities;
pub mod data_disk;
pub mod identity;
pub mod network_interface;
pub mod os_disk;

use std::collections::HashMap;

use carina_core::resource::{Attributes, Value};
use carina_core::schema::ResourceSchema;

use crate::error::{Error, Result};

pub use capabilities::{
    AdditionalCapabilitiesConfig, additional_capabilities_schema, expand_additional_capabilities,
    flatten_additional_capabilities,
};
pub use data_disk::{DataDiskConfig, data_disk_schema, expand_data_disks, flatten_data_disks};
pub use identity::{IdentityConfig, expand_identity, flatten_identity, identity_schema};
pub use network_interface::{
    expand_network_interface_ids, flatten_network_interface_ids, network_interface_ids_schema,
};
pub use os_disk::{OsDiskConfig, expand_os_disk, flatten_os_disk, os_disk_schema};

pub const RESOURCE_TYPE: &str = "azurerm.virtual_machine";

pub fn virtual_machine_schema() -> ResourceSchema {
    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("Azure virtual machine (capabilities, identity, networking and disks)")
        .attribute(additional_capabilities_schema())
        .attribute(identity_schema())
        .attribute(network_interface_ids_schema())
        .attribute(os_disk_schema())
        .attribute(data_disk_schema())
}

/// Decoded configuration of a virtual machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachineConfig {
    pub additional_capabilities: Option<AdditionalCapabilitiesConfig>,
    pub identity: Option<IdentityConfig>,
    pub network_interface_ids: Vec<String>,
    pub os_disk: OsDiskConfig,
    pub data_disks: Vec<DataDiskConfig>,
}

impl VirtualMachineConfig {
    /// Validate the attributes against the schema, then decode them
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> Result<Self> {
        if let Err(errors) = virtual_machine_schema().validate(attributes) {
            let mut errors = errors.into_iter();
            return match (errors.next(), errors.len()) {
                (Some(source), 0) => Err(Error::Config {
                    block: RESOURCE_TYPE,
                    source,
                }),
                (first, _) => Err(Error::validation(
                    first
                        .into_iter()
                        .chain(errors)
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                )),
            };
        }

        let attrs = Attributes::new(attributes);
        let empty = Value::empty_list();
        let block = |key: &str| attrs.get(key).unwrap_or(&empty);

        Ok(Self {
            additional_capabilities: AdditionalCapabilitiesConfig::from_value(block(
                "additional_capabilities",
            ))?,
            identity: IdentityConfig::from_value(block("identity"))?,
            network_interface_ids: network_interface::network_interface_ids_from_attributes(
                &attrs,
            )?,
            os_disk: OsDiskConfig::from_value(block("os_disk"))?,
            data_disks: DataDiskConfig::list_from_value(block("data_disk"))?,
        })
    }
}
