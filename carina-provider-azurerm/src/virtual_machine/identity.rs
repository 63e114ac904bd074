//! `identity` block

use std::collections::{BTreeMap, BTreeSet, HashMap};

use carina_core::resource::{Attributes, Value};
use carina_core::schema::{AttributeSchema, AttributeType, BlockSchema, types};

use crate::compute::{ResourceIdentityType, UserAssignedIdentitiesValue, VirtualMachineIdentity};
use crate::error::{Error, Result};
use crate::utils::parse_enum;

const BLOCK: &str = "identity";

/// Identity kinds accepted in configuration
pub const IDENTITY_TYPES: &[ResourceIdentityType] = &[
    ResourceIdentityType::SystemAssigned,
    ResourceIdentityType::UserAssigned,
    ResourceIdentityType::SystemAssignedUserAssigned,
];

pub fn identity_schema() -> AttributeSchema {
    let kinds: Vec<&str> = IDENTITY_TYPES.iter().map(|t| t.as_str()).collect();
    AttributeSchema::new(
        BLOCK,
        AttributeType::Block(
            BlockSchema::new()
                .attribute(AttributeSchema::new("type", types::string_in(&kinds)).required())
                .attribute(
                    AttributeSchema::new("identity_ids", types::string_set())
                        .with_description("User-assigned identity IDs"),
                )
                .attribute(AttributeSchema::new("principal_id", AttributeType::String).read_only())
                .attribute(AttributeSchema::new("tenant_id", AttributeType::String).read_only())
                .max_items(1),
        ),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub identity_type: ResourceIdentityType,
    pub identity_ids: BTreeSet<String>,
}

impl IdentityConfig {
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        let Some(attrs) = Attributes::from_block(value).map_err(Error::config(BLOCK))? else {
            return Ok(None);
        };

        let raw_type = attrs.required_string("type").map_err(Error::config(BLOCK))?;
        let identity_type: ResourceIdentityType = parse_enum("identity.type", raw_type)?;
        if !IDENTITY_TYPES.contains(&identity_type) {
            return Err(Error::validation(format!(
                "`identity.type` must be one of {}, got {:?}",
                IDENTITY_TYPES
                    .iter()
                    .map(|t| format!("{:?}", t.as_str()))
                    .collect::<Vec<_>>()
                    .join(", "),
                raw_type
            )));
        }

        let identity_ids = attrs
            .strings("identity_ids")
            .map_err(Error::config(BLOCK))?
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Some(Self {
            identity_type,
            identity_ids,
        }))
    }
}

/// Build the identity for a request; no block means an explicit `None` kind
pub fn expand_identity(input: Option<&IdentityConfig>) -> Result<VirtualMachineIdentity> {
    let Some(config) = input else {
        return Ok(VirtualMachineIdentity::new(ResourceIdentityType::None));
    };

    let mut identity = VirtualMachineIdentity::new(config.identity_type);

    if !config.identity_ids.is_empty() {
        if !config.identity_type.includes_user_assigned() {
            return Err(Error::validation(
                "`identity_ids` can only be specified when `type` includes `UserAssigned`",
            ));
        }

        let identities: BTreeMap<String, UserAssignedIdentitiesValue> = config
            .identity_ids
            .iter()
            .map(|id| (id.clone(), UserAssignedIdentitiesValue::default()))
            .collect();
        identity.user_assigned_identities = Some(identities);
    }

    Ok(identity)
}

pub fn flatten_identity(input: Option<&VirtualMachineIdentity>) -> Value {
    let Some(identity) = input.filter(|i| i.identity_type != ResourceIdentityType::None) else {
        return Value::empty_list();
    };

    let identity_ids: Vec<Value> = identity
        .user_assigned_identities
        .iter()
        .flat_map(|ids| ids.keys())
        .map(|id| Value::String(id.clone()))
        .collect();

    Value::block(HashMap::from([
        (
            "type".to_string(),
            Value::string(identity.identity_type.as_str()),
        ),
        ("identity_ids".to_string(), Value::List(identity_ids)),
        (
            "principal_id".to_string(),
            Value::string(identity.principal_id.clone().unwrap_or_default()),
        ),
        (
            "tenant_id".to_string(),
            Value::string(identity.tenant_id.clone().unwrap_or_default()),
        ),
    ]))
}
