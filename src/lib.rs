//! # Protect
//!
//! Tag-driven protected copy between two values of the same type.
//!
//! Fields are annotated with the operation tags they are protected for.
//! Copying with a tag overwrites every other exported field of the
//! destination, recursing through nested structs, `Option`/`Box`, dynamic
//! values, sequences and maps, and leaves the protected ones untouched. The
//! typical use is binding an untrusted request payload onto a stored value
//! without letting it overwrite identifiers, timestamps or flags.
//!
//! ## Modules
//!
//! - [`reflect`] - Shape introspection for copyable values and the
//!   [`reflect_struct!`] macro
//! - [`protect`] - The copy engine, merge policies and configuration
//! - [`bind`] - Protected binding of JSON and YAML payloads

pub mod bind;
pub mod protect;
pub mod reflect;

pub use bind::{BindError, Decoder, JsonDecoder, ReplayableBody, YamlDecoder};
pub use protect::{
    default_protector, ContainerId, MapPolicy, PolicyGuard, ProtectError, Protector, ProtectorConfig,
    SequencePolicy,
};
pub use reflect::{DynValue, Reflect};

/// Copies `src` into `dst` with the default protector, skipping fields
/// protected for `tag`. See [`Protector::copy`].
pub fn copy(tag: &str, src: &dyn Reflect, dst: &mut dyn Reflect) -> Result<(), ProtectError> {
    default_protector().copy(tag, src, dst)
}

/// Returns a deep copy of `src` made with the default protector, ignoring
/// every annotation. See [`Protector::clone`].
pub fn clone<T: Reflect + Default>(src: &T) -> Result<T, ProtectError> {
    default_protector().clone(src)
}

/// Copies a sequence with an explicit policy using the default protector.
/// See [`Protector::copy_slice`].
pub fn copy_slice(tag: &str, src: &dyn Reflect, dst: &mut dyn Reflect, policy: &str) -> Result<(), ProtectError> {
    default_protector().copy_slice(tag, src, dst, policy)
}
