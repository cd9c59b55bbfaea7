//! Protected binding of decoded payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::decoder::Decoder;
use crate::protect::{ProtectError, Protector};
use crate::reflect::Reflect;

/// BindError represents a failure to bind a payload.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("failed to read payload: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML payload: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no array found in the payload")]
    NoArray,

    #[error(transparent)]
    Protect(#[from] ProtectError),
}

/// Binds a payload into `dst`, leaving fields protected for `tag` untouched.
///
/// The payload is decoded into a scratch clone of `dst`: members present in
/// the payload replace the clone's values (objects merge member by member),
/// absent members keep them. The scratch value is then copied into `dst`
/// with [`Protector::copy`], so `dst` itself is never decoded into.
pub fn bind<T>(
    protector: &Protector,
    tag: &str,
    decoder: &dyn Decoder,
    payload: &[u8],
    dst: &mut T,
) -> Result<(), BindError>
where
    T: Reflect + Default + Serialize + DeserializeOwned,
{
    let document = decoder.decode(payload)?;
    debug!(tag, type_name = dst.type_name(), "binding payload");

    let scratch = protector.clone(&*dst)?;
    let mut tree = serde_json::to_value(&scratch)?;
    overlay(&mut tree, document);
    let scratch: T = serde_json::from_value(tree)?;

    protector.copy(tag, &scratch, dst)?;
    Ok(())
}

/// Binds the array of a payload into `dst` with the given sequence policy.
///
/// The array is either the payload root or the first array-valued member of
/// a root object, in key order. Every element is decoded into a fresh `T`,
/// objects or not; an element that does not decode into `T` fails the whole
/// bind with [`BindError::Json`] and leaves `dst` untouched. The decoded
/// elements are merged with [`Protector::copy_slice`].
pub fn bind_slice<T>(
    protector: &Protector,
    tag: &str,
    decoder: &dyn Decoder,
    payload: &[u8],
    dst: &mut Vec<T>,
    policy: &str,
) -> Result<(), BindError>
where
    T: Reflect + Clone + Default + DeserializeOwned,
{
    let document = decoder.decode(payload)?;
    let items = find_array(document).ok_or(BindError::NoArray)?;
    debug!(tag, policy, len = items.len(), "binding payload array");

    let scratch = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;

    protector.copy_slice(tag, &scratch, dst, policy)?;
    Ok(())
}

fn overlay(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

fn find_array(document: Value) -> Option<Vec<Value>> {
    match document {
        Value::Array(items) => Some(items),
        Value::Object(members) => members.into_iter().find_map(|(_, value)| match value {
            Value::Array(items) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}
