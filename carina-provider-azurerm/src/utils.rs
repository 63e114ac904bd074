//! Helper functions for decoding configuration values

use std::str::FromStr;

use carina_core::resource::Attributes;

use crate::compute::models::UnknownVariant;
use crate::error::{Error, Result};

/// Parse an API enum from its wire value
pub(crate) fn parse_enum<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse::<T>()
        .map_err(|e| Error::invalid_value(field, e))
}

/// Narrow a configuration integer to the API's 32-bit field
pub(crate) fn to_int32(field: &str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        Error::invalid_value(field, format!("{} does not fit in a 32-bit integer", value))
    })
}

/// Read a disk size where 0 (or absent) means "let the platform decide"
pub(crate) fn disk_size_gb(attrs: &Attributes<'_>, field: &str, max: i64) -> Result<Option<i32>> {
    let Some(size) = attrs
        .int("disk_size_gb")
        .map_err(|e| Error::invalid_value(field, e))?
    else {
        return Ok(None);
    };
    if !(0..=max).contains(&size) {
        return Err(Error::invalid_value(
            field,
            format!("must be between 0 and {}, got {}", max, size),
        ));
    }
    if size == 0 {
        Ok(None)
    } else {
        to_int32(field, size).map(Some)
    }
}
