//! `network_interface_ids` attribute

use carina_core::resource::{Attributes, Value};
use carina_core::schema::{AttributeSchema, AttributeType, types};

use crate::compute::{NetworkInterfaceReference, NetworkInterfaceReferenceProperties};
use crate::error::{Error, Result};

const ATTRIBUTE: &str = "network_interface_ids";

pub fn network_interface_ids_schema() -> AttributeSchema {
    AttributeSchema::new(
        ATTRIBUTE,
        AttributeType::List(Box::new(types::non_empty_string())),
    )
    .required()
    .with_description("Network interface IDs; the first one is the primary interface")
}

/// Decode the ordered list of network interface IDs
pub fn network_interface_ids_from_value(value: &Value) -> Result<Vec<String>> {
    let items = value.as_list().ok_or_else(|| {
        Error::invalid_value(ATTRIBUTE, "expected a list of network interface IDs")
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::invalid_value(format!("{}[{}]", ATTRIBUTE, index), "expected a string")
            })
        })
        .collect()
}

/// Read `network_interface_ids` from a resource's attributes
pub(crate) fn network_interface_ids_from_attributes(attrs: &Attributes<'_>) -> Result<Vec<String>> {
    match attrs.get(ATTRIBUTE) {
        Some(value) => network_interface_ids_from_value(value),
        None => Ok(Vec::new()),
    }
}

/// The first interface is marked primary, every other one explicitly not
pub fn expand_network_interface_ids(input: &[String]) -> Vec<NetworkInterfaceReference> {
    input
        .iter()
        .enumerate()
        .map(|(i, id)| NetworkInterfaceReference {
            id: Some(id.clone()),
            properties: Some(NetworkInterfaceReferenceProperties {
                primary: Some(i == 0),
            }),
        })
        .collect()
}

/// References without an ID are skipped
pub fn flatten_network_interface_ids(input: Option<&[NetworkInterfaceReference]>) -> Value {
    let ids = input
        .unwrap_or_default()
        .iter()
        .filter_map(|nic| nic.id.clone())
        .map(Value::String)
        .collect();
    Value::List(ids)
}
