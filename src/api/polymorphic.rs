//! Two-phase decoding for payloads whose shape depends on a discriminator
//!
//! The payload is first read as a generic JSON value, the discriminator is
//! inspected, and the value is then decoded a second time into the variant
//! the discriminator selects. Types implement `Deserialize` by hand on top of
//! these helpers so the dispatch stays an explicit `match`.

use serde::de::{DeserializeOwned, Error as DeError};
use serde_json::{Map, Value};

/// Phase one: read the payload as an object and pull out `field`.
///
/// Missing or non-string discriminators are reported as `invalid <field>`.
pub(crate) fn split_discriminator<E: DeError>(
    value: Value,
    field: &'static str,
) -> Result<(String, Map<String, Value>), E> {
    let Value::Object(map) = value else {
        return Err(E::custom(format!("invalid {}: expected an object", field)));
    };

    let tag = match map.get(field) {
        Some(Value::String(tag)) => tag.clone(),
        _ => return Err(E::custom(format!("invalid {}", field))),
    };

    Ok((tag, map))
}

/// Phase two: decode the whole object into the selected variant.
pub(crate) fn decode_variant<T: DeserializeOwned, E: DeError>(
    map: Map<String, Value>,
) -> Result<T, E> {
    serde_json::from_value(Value::Object(map)).map_err(E::custom)
}

/// Error for a discriminator outside the dispatch table.
pub(crate) fn unknown_variant<E: DeError>(field: &str, tag: &str) -> E {
    E::custom(format!("invalid {}: {:?}", field, tag))
}

/// For sum-typed records that populate exactly one of several sub-objects:
/// the first key (in `keys` order) holding a non-null value.
pub(crate) fn first_populated<'a>(
    map: &Map<String, Value>,
    keys: &[&'a str],
) -> Option<&'a str> {
    keys.iter()
        .copied()
        .find(|key| map.get(*key).is_some_and(|v| !v.is_null()))
}
