//! Recursive value traversal.

use tracing::trace;

use super::error::ProtectError;
use super::options::{FieldRules, MapPolicy};
use super::protector::Protector;
use super::registry::ContainerId;
use crate::reflect::{Dynamic, Kind, Pointer, Reflect, ReflectMut, ReflectRef, Struct};

/// Pass selects whether a traversal honours protection annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass<'t> {
    /// Fields protected for the tag are skipped and declared container
    /// policies apply.
    Protected(&'t str),
    /// Every exported field is copied and every container is overwritten.
    Unprotected,
}

impl Protector {
    /// Copies `src` into `dst`, which must have the same concrete type.
    ///
    /// `declared` is the container policy annotated on the enclosing field.
    /// It reaches the field's container through pointer layers only.
    pub(super) fn copy_value(
        &self,
        pass: Pass<'_>,
        src: &dyn Reflect,
        dst: &mut dyn Reflect,
        declared: Option<&str>,
    ) -> Result<(), ProtectError> {
        if self.is_primitive_type(src.reflect_type_id()) {
            return dst.assign(src);
        }

        let (expected, actual) = (dst.type_name(), src.type_name());
        match (src.reflect_ref(), dst.reflect_mut()) {
            (ReflectRef::Struct(from), ReflectMut::Struct(to)) => self.copy_struct(pass, from, to),
            (ReflectRef::Pointer(from), ReflectMut::Pointer(to)) => {
                self.copy_pointer(pass, from, to, declared)
            }
            (ReflectRef::Dynamic(from), ReflectMut::Dynamic(to)) => self.copy_dynamic(pass, from, to),
            (ReflectRef::Sequence(from), ReflectMut::Sequence(to)) => {
                self.copy_sequence(pass, from, to, declared)
            }
            (ReflectRef::Map(from), ReflectMut::Map(to)) => self.copy_map(pass, from, to, declared),
            (ReflectRef::Scalar(from), ReflectMut::Scalar(to)) => to.assign(from),
            _ => Err(ProtectError::type_mismatch(expected, actual)),
        }
    }

    /// Returns a deep copy of `src` made without looking at any annotation.
    pub(super) fn clone_unprotected(&self, src: &dyn Reflect) -> Result<Box<dyn Reflect>, ProtectError> {
        let mut cloned = src.new_zero();
        self.copy_value(Pass::Unprotected, src, &mut *cloned, None)?;
        Ok(cloned)
    }

    fn copy_struct(&self, pass: Pass<'_>, from: &dyn Struct, to: &mut dyn Struct) -> Result<(), ProtectError> {
        let owner = from.as_reflect().reflect_type_id();

        for (index, field) in from.fields().iter().enumerate() {
            if !field.exported {
                continue;
            }

            let rules = match pass {
                Pass::Protected(tag) => {
                    let rules = self.field_rules(owner, index, field);
                    if rules.is_protected_for(tag) {
                        trace!(field = field.name, tag, "skipping protected field");
                        continue;
                    }
                    Some(rules)
                }
                Pass::Unprotected => None,
            };
            let declared = rules.as_deref().and_then(FieldRules::policy);

            let (Some(value), Some(target)) = (from.field(index), to.field_mut(index)) else {
                continue;
            };
            self.copy_value(pass, value, target, declared)
                .map_err(|err| ProtectError::field(field.name, err))?;
        }

        Ok(())
    }

    fn copy_pointer(
        &self,
        pass: Pass<'_>,
        from: &dyn Pointer,
        to: &mut dyn Pointer,
        declared: Option<&str>,
    ) -> Result<(), ProtectError> {
        match from.target() {
            Some(target) => self.copy_value(pass, target, to.get_or_alloc(), declared),
            None => {
                if self.patches_on_nil(pass, to, declared)? {
                    return Ok(());
                }
                to.set_nil();
                Ok(())
            }
        }
    }

    // A nil source map leaves a patched destination map as it is.
    fn patches_on_nil(&self, pass: Pass<'_>, to: &dyn Pointer, declared: Option<&str>) -> Result<bool, ProtectError> {
        if pass == Pass::Unprotected {
            return Ok(false);
        }
        match to.target() {
            Some(target) if target.kind() == Kind::Map => {
                let policy = self.resolve_map_policy(ContainerId::of(target), declared)?;
                Ok(policy == MapPolicy::Patch)
            }
            _ => Ok(false),
        }
    }

    fn copy_dynamic(&self, pass: Pass<'_>, from: &dyn Dynamic, to: &mut dyn Dynamic) -> Result<(), ProtectError> {
        let Some(value) = from.value() else {
            to.replace(None);
            return Ok(());
        };

        let mut fresh = value.new_zero();
        self.copy_value(pass, value, &mut *fresh, None)?;
        to.replace(Some(fresh));
        Ok(())
    }
}
