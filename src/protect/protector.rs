//! Protector: the configurable copy engine.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use super::config::ProtectorConfig;
use super::copy::Pass;
use super::error::ProtectError;
use super::options::{FieldRules, MapPolicy, SequencePolicy};
use super::registry::{ContainerId, ShardedMap};
use crate::reflect::{FieldDescriptor, Kind, Reflect, ReflectMut, ReflectRef};

static DEFAULT_PROTECTOR: Lazy<Protector> = Lazy::new(Protector::default);

/// Returns the shared, default-configured protector used by the crate-level
/// functions.
pub fn default_protector() -> &'static Protector {
    &DEFAULT_PROTECTOR
}

/// Protector copies values between instances of the same type while
/// skipping fields protected for the current operation tag.
///
/// Each protector has its own annotation vocabulary, primitive registry and
/// container policy overrides, so differently configured protectors can be
/// used side by side.
pub struct Protector {
    tag_name: String,
    option_tag_name: String,
    primitives: ShardedMap<TypeId, &'static str>,
    field_rules: ShardedMap<(TypeId, usize), Arc<FieldRules>>,
    sequence_overrides: ShardedMap<ContainerId, SequencePolicy>,
    map_overrides: ShardedMap<ContainerId, MapPolicy>,
}

impl Default for Protector {
    fn default() -> Self {
        Protector::from_config(&ProtectorConfig::default())
    }
}

impl fmt::Debug for Protector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protector")
            .field("tag_name", &self.tag_name)
            .field("option_tag_name", &self.option_tag_name)
            .field("primitives", &self.primitives.len())
            .finish_non_exhaustive()
    }
}

impl Protector {
    /// Creates a new protector reading exclusions from the `tag_name`
    /// annotation key and container policies from `option_tag_name`.
    ///
    /// The chrono date/time types are registered as primitives.
    pub fn new(tag_name: impl Into<String>, option_tag_name: impl Into<String>) -> Self {
        let protector = Protector {
            tag_name: tag_name.into(),
            option_tag_name: option_tag_name.into(),
            primitives: ShardedMap::new(),
            field_rules: ShardedMap::new(),
            sequence_overrides: ShardedMap::new(),
            map_overrides: ShardedMap::new(),
        };

        protector.register_primitive::<chrono::DateTime<chrono::Utc>>();
        protector.register_primitive::<chrono::DateTime<chrono::FixedOffset>>();
        protector.register_primitive::<chrono::NaiveDateTime>();
        protector.register_primitive::<chrono::NaiveDate>();
        protector.register_primitive::<chrono::NaiveTime>();

        protector
    }

    /// Creates a new protector from a configuration.
    pub fn from_config(config: &ProtectorConfig) -> Self {
        Protector::new(config.tag_name.clone(), config.option_tag_name.clone())
    }

    /// Returns the annotation key listing protected operation tags.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Returns the annotation key naming container policies.
    pub fn option_tag_name(&self) -> &str {
        &self.option_tag_name
    }

    /// Registers `T` to be copied by whole-value assignment instead of field
    /// by field.
    pub fn register_primitive<T: Reflect>(&self) {
        self.primitives.insert(TypeId::of::<T>(), type_name::<T>());
        debug!(type_name = type_name::<T>(), "registered primitive type");
    }

    /// Returns true if `T` is registered as a primitive.
    pub fn is_primitive<T: Reflect>(&self) -> bool {
        self.is_primitive_type(TypeId::of::<T>())
    }

    /// Returns true if the type is registered as a primitive.
    pub fn is_primitive_type(&self, type_id: TypeId) -> bool {
        self.primitives.contains_key(&type_id)
    }

    /// Copies `src` into `dst`, skipping fields protected for `tag`.
    ///
    /// Both values must have the same concrete type. A nilable source
    /// (`Option<T>`) is dereferenced when `dst` is a `T`, and the same is done
    /// for a nilable destination; a nil side is an invalid argument.
    ///
    /// Fields protected for `tag` keep their destination value. The empty tag
    /// protects nothing.
    pub fn copy(&self, tag: &str, src: &dyn Reflect, dst: &mut dyn Reflect) -> Result<(), ProtectError> {
        trace!(tag, type_name = src.type_name(), "copy");
        let (src, dst) = operands(src, dst)?;
        self.copy_value(Pass::Protected(tag), src, dst, None)
    }

    /// Returns an independent deep copy of `src`, ignoring every protection
    /// annotation and declared container policy.
    ///
    /// Private fields are not copied and take their default value.
    pub fn clone<T: Reflect + Default>(&self, src: &T) -> Result<T, ProtectError> {
        trace!(type_name = src.type_name(), "clone");
        let mut cloned = T::default();
        self.copy_value(Pass::Unprotected, src, &mut cloned, None)?;
        Ok(cloned)
    }

    /// Like [`clone`](Self::clone) for a value whose type is only known at
    /// runtime.
    pub fn clone_dyn(&self, src: &dyn Reflect) -> Result<Box<dyn Reflect>, ProtectError> {
        trace!(type_name = src.type_name(), "clone");
        self.clone_unprotected(src)
    }

    /// Copies a sequence with an explicit policy token, without touching any
    /// declared field policy.
    ///
    /// `src` and `dst` must be sequences of the same type, or `Option`s
    /// holding them. Operands are normalized like in [`copy`](Self::copy):
    /// a nilable side wrapping the other side's type is dereferenced and
    /// must not be nil. When both sides are `Option`s, a nil source sets the
    /// destination to nil.
    pub fn copy_slice(
        &self,
        tag: &str,
        src: &dyn Reflect,
        dst: &mut dyn Reflect,
        policy: &str,
    ) -> Result<(), ProtectError> {
        let policy: SequencePolicy = policy.parse()?;
        self.copy_slice_with(tag, src, dst, policy)
    }

    /// Typed variant of [`copy_slice`](Self::copy_slice).
    pub fn copy_slice_with(
        &self,
        tag: &str,
        src: &dyn Reflect,
        dst: &mut dyn Reflect,
        policy: SequencePolicy,
    ) -> Result<(), ProtectError> {
        trace!(tag, %policy, type_name = src.type_name(), "copy slice");
        let (src, dst) = operands(src, dst)?;

        match (src.reflect_ref(), dst.reflect_mut()) {
            (ReflectRef::Sequence(from), ReflectMut::Sequence(to)) => {
                let _scope = self.scoped_sequence_policy(&*to, policy);
                self.copy_value(Pass::Protected(tag), from.as_reflect(), to.as_reflect_mut(), None)
            }
            (ReflectRef::Pointer(from), ReflectMut::Pointer(to))
                if from.new_target().kind() == Kind::Sequence =>
            {
                match from.target() {
                    None => {
                        to.set_nil();
                        Ok(())
                    }
                    Some(target) => self.copy_slice_with(tag, target, to.get_or_alloc(), policy),
                }
            }
            (from, to) => Err(ProtectError::invalid_argument(format!(
                "src and dst must be sequences, got {} and {}",
                from.kind(),
                to.kind()
            ))),
        }
    }

    /// Overrides the policy of one sequence instance until cleared.
    ///
    /// Prefer [`scoped_sequence_policy`](Self::scoped_sequence_policy), which
    /// cannot leak the override into unrelated operations.
    pub fn set_sequence_policy<C: ?Sized>(&self, container: &C, policy: SequencePolicy) {
        self.sequence_overrides.insert(ContainerId::of(container), policy);
        debug!(%policy, "sequence policy override set");
    }

    /// Removes a sequence policy override.
    pub fn clear_sequence_policy<C: ?Sized>(&self, container: &C) {
        self.clear_override(ContainerId::of(container), OverrideKind::Sequence);
    }

    /// Overrides the policy of one sequence instance until the returned
    /// guard is dropped.
    pub fn scoped_sequence_policy<C: ?Sized>(&self, container: &C, policy: SequencePolicy) -> PolicyGuard<'_> {
        self.set_sequence_policy(container, policy);
        PolicyGuard {
            protector: self,
            id: ContainerId::of(container),
            kind: OverrideKind::Sequence,
        }
    }

    /// Overrides the policy of one map instance until cleared.
    pub fn set_map_policy<C: ?Sized>(&self, container: &C, policy: MapPolicy) {
        self.map_overrides.insert(ContainerId::of(container), policy);
        debug!(%policy, "map policy override set");
    }

    /// Removes a map policy override.
    pub fn clear_map_policy<C: ?Sized>(&self, container: &C) {
        self.clear_override(ContainerId::of(container), OverrideKind::Map);
    }

    /// Overrides the policy of one map instance until the returned guard is
    /// dropped.
    pub fn scoped_map_policy<C: ?Sized>(&self, container: &C, policy: MapPolicy) -> PolicyGuard<'_> {
        self.set_map_policy(container, policy);
        PolicyGuard {
            protector: self,
            id: ContainerId::of(container),
            kind: OverrideKind::Map,
        }
    }

    fn clear_override(&self, id: ContainerId, kind: OverrideKind) {
        let removed = match kind {
            OverrideKind::Sequence => self.sequence_overrides.remove(&id).is_some(),
            OverrideKind::Map => self.map_overrides.remove(&id).is_some(),
        };
        if removed {
            debug!(?kind, "policy override cleared");
        }
    }

    /// Returns the parsed annotations of a struct field, parsing them on
    /// first use.
    pub(super) fn field_rules(&self, owner: TypeId, index: usize, field: &FieldDescriptor) -> Arc<FieldRules> {
        self.field_rules.get_or_insert_with((owner, index), || {
            Arc::new(FieldRules::parse(field.tag, &self.tag_name, &self.option_tag_name))
        })
    }

    /// Resolves a sequence policy: instance override, then the declared field
    /// policy, then `overwrite`.
    pub(super) fn resolve_sequence_policy(
        &self,
        id: ContainerId,
        declared: Option<&str>,
    ) -> Result<SequencePolicy, ProtectError> {
        if let Some(policy) = self.sequence_overrides.get(&id) {
            return Ok(policy);
        }
        declared.map_or(Ok(SequencePolicy::default()), str::parse)
    }

    /// Resolves a map policy: instance override, then the declared field
    /// policy, then `overwrite`.
    pub(super) fn resolve_map_policy(&self, id: ContainerId, declared: Option<&str>) -> Result<MapPolicy, ProtectError> {
        if let Some(policy) = self.map_overrides.get(&id) {
            return Ok(policy);
        }
        declared.map_or(Ok(MapPolicy::default()), str::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverrideKind {
    Sequence,
    Map,
}

/// PolicyGuard removes a container policy override when dropped.
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct PolicyGuard<'p> {
    protector: &'p Protector,
    id: ContainerId,
    kind: OverrideKind,
}

impl fmt::Debug for PolicyGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyGuard")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for PolicyGuard<'_> {
    fn drop(&mut self) {
        self.protector.clear_override(self.id, self.kind);
    }
}

/// Normalizes the operands of a copy: dereferences nilable handles when the
/// types differ, then requires identical types.
fn operands<'s, 'd>(
    src: &'s dyn Reflect,
    dst: &'d mut dyn Reflect,
) -> Result<(&'s dyn Reflect, &'d mut dyn Reflect), ProtectError> {
    if src.reflect_type_id() == dst.reflect_type_id() {
        return Ok((src, dst));
    }

    let src = match src.reflect_ref() {
        ReflectRef::Pointer(pointer) => pointer
            .target()
            .ok_or_else(|| ProtectError::invalid_argument("src must not be a nil pointer"))?,
        _ => src,
    };

    let dst_is_pointer = src.reflect_type_id() != dst.reflect_type_id()
        && matches!(dst.reflect_ref(), ReflectRef::Pointer(_));
    let dst = if dst_is_pointer {
        match dst.reflect_mut() {
            ReflectMut::Pointer(pointer) => pointer
                .target_mut()
                .ok_or_else(|| ProtectError::invalid_argument("dst must not be a nil pointer"))?,
            _ => return Err(ProtectError::invalid_argument("dst must be a pointer")),
        }
    } else {
        dst
    };

    if src.reflect_type_id() != dst.reflect_type_id() {
        return Err(ProtectError::type_mismatch(dst.type_name(), src.type_name()));
    }
    Ok((src, dst))
}
