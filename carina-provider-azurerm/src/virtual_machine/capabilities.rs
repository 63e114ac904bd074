//! `additional_capabilities` block

use std::collections::HashMap;

use carina_core::resource::{Attributes, Value};
use carina_core::schema::{AttributeSchema, AttributeType, BlockSchema};

use crate::compute::AdditionalCapabilities;
use crate::error::{Error, Result};

const BLOCK: &str = "additional_capabilities";

pub fn additional_capabilities_schema() -> AttributeSchema {
    AttributeSchema::new(
        BLOCK,
        AttributeType::Block(
            BlockSchema::new()
                .attribute(
                    AttributeSchema::new("ultra_ssd_enabled", AttributeType::Bool)
                        .with_default(Value::Bool(false))
                        .with_description(
                            "Whether UltraSSD_LRS disks can be attached (needs the feature registered on the subscription)",
                        ),
                )
                .max_items(1),
        ),
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdditionalCapabilitiesConfig {
    pub ultra_ssd_enabled: bool,
}

impl AdditionalCapabilitiesConfig {
    /// Decode the block; an empty list means no block was configured
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        let Some(attrs) = Attributes::from_block(value).map_err(Error::config(BLOCK))? else {
            return Ok(None);
        };
        Ok(Some(Self {
            ultra_ssd_enabled: attrs
                .bool_or("ultra_ssd_enabled", false)
                .map_err(Error::config(BLOCK))?,
        }))
    }
}

pub fn expand_additional_capabilities(
    input: Option<&AdditionalCapabilitiesConfig>,
) -> AdditionalCapabilities {
    AdditionalCapabilities {
        ultra_ssd_enabled: input.map(|c| c.ultra_ssd_enabled),
    }
}

pub fn flatten_additional_capabilities(input: Option<&AdditionalCapabilities>) -> Value {
    let Some(capabilities) = input else {
        return Value::empty_list();
    };

    Value::block(HashMap::from([(
        "ultra_ssd_enabled".to_string(),
        Value::Bool(capabilities.ultra_ssd_enabled.unwrap_or(false)),
    )]))
}

#[cfg(test)]
mod tests {
    use carina_core::schema::TypeError;

    use super::*;

    fn block(enabled: bool) -> Value {
        Value::block(HashMap::from([(
            "ultra_ssd_enabled".to_string(),
            Value::Bool(enabled),
        )]))
    }

    #[test]
    fn expand_without_block_leaves_flag_unset() {
        let config = AdditionalCapabilitiesConfig::from_value(&Value::empty_list()).unwrap();
        assert_eq!(config, None);
        assert_eq!(
            expand_additional_capabilities(config.as_ref()),
            AdditionalCapabilities {
                ultra_ssd_enabled: None
            }
        );
    }

    #[test]
    fn expand_then_flatten_keeps_flag() {
        for enabled in [true, false] {
            let config = AdditionalCapabilitiesConfig::from_value(&block(enabled)).unwrap();
            let expanded = expand_additional_capabilities(config.as_ref());
            assert_eq!(expanded.ultra_ssd_enabled, Some(enabled));
            assert_eq!(flatten_additional_capabilities(Some(&expanded)), block(enabled));
        }
    }

    #[test]
    fn flag_defaults_to_false() {
        let config =
            AdditionalCapabilitiesConfig::from_value(&Value::block(HashMap::new())).unwrap();
        assert_eq!(
            config,
            Some(AdditionalCapabilitiesConfig {
                ultra_ssd_enabled: false
            })
        );

        let flattened = flatten_additional_capabilities(Some(&AdditionalCapabilities::default()));
        assert_eq!(flattened, block(false));
    }

    #[test]
    fn flatten_nothing() {
        assert_eq!(flatten_additional_capabilities(None), Value::empty_list());
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let value = Value::block(HashMap::from([(
            "ultra_ssd_enabled".to_string(),
            Value::string("yes"),
        )]));
        let err = AdditionalCapabilitiesConfig::from_value(&value).unwrap_err();
        assert!(matches!(err, Error::Config { block: "additional_capabilities", .. }));
    }

    #[test]
    fn decode_rejects_repeated_block() {
        let enabled = HashMap::from([("ultra_ssd_enabled".to_string(), Value::Bool(true))]);
        let two = Value::List(vec![Value::Map(enabled), Value::Map(HashMap::new())]);
        let err = AdditionalCapabilitiesConfig::from_value(&two).unwrap_err();
        assert!(matches!(
            err,
            Error::Config {
                block: "additional_capabilities",
                source: TypeError::TooManyItems { max: 1, got: 2 },
            }
        ));
    }

    #[test]
    fn schema_is_single_block() {
        let schema = additional_capabilities_schema();
        assert!(schema.attr_type.validate(&block(true)).is_ok());
        let two = Value::List(vec![
            Value::Map(HashMap::new()),
            Value::Map(HashMap::new()),
        ]);
        assert!(schema.attr_type.validate(&two).is_err());
    }
}
