//! Map merge policies.

use tracing::trace;

use super::copy::Pass;
use super::error::ProtectError;
use super::options::MapPolicy;
use super::protector::Protector;
use super::registry::ContainerId;
use crate::reflect::{Mapping, Reflect};

impl Protector {
    pub(super) fn copy_map(
        &self,
        pass: Pass<'_>,
        from: &dyn Mapping,
        to: &mut dyn Mapping,
        declared: Option<&str>,
    ) -> Result<(), ProtectError> {
        let policy = match pass {
            Pass::Protected(_) => self.resolve_map_policy(ContainerId::of(&*to), declared)?,
            Pass::Unprotected => MapPolicy::Overwrite,
        };
        trace!(%policy, src_len = from.len(), dst_len = to.len(), "copy map");

        match policy {
            MapPolicy::Overwrite => {
                to.clear();
                for key in from.keys() {
                    if let Some(value) = from.get(key) {
                        let cloned = self
                            .clone_unprotected(value)
                            .map_err(|err| ProtectError::entry(render_key(key), err))?;
                        to.insert(key.clone_boxed(), cloned)?;
                    }
                }
                Ok(())
            }
            MapPolicy::Match => {
                let stale: Vec<Box<dyn Reflect>> = to
                    .keys()
                    .into_iter()
                    .filter(|key| from.get(*key).is_none())
                    .map(|key| key.clone_boxed())
                    .collect();
                for key in &stale {
                    to.remove(&**key);
                }
                self.merge_entries(pass, from, to)
            }
            MapPolicy::Patch => self.merge_entries(pass, from, to),
        }
    }

    // Common keys are merged tag-aware into a working copy of the
    // destination value; source-only keys get an unprotected clone.
    fn merge_entries(&self, pass: Pass<'_>, from: &dyn Mapping, to: &mut dyn Mapping) -> Result<(), ProtectError> {
        for key in from.keys() {
            let Some(value) = from.get(key) else {
                continue;
            };
            let merged = match to.get(key) {
                Some(existing) => {
                    let mut working = existing.clone_boxed();
                    self.copy_value(pass, value, &mut *working, None)
                        .map(|()| working)
                }
                None => self.clone_unprotected(value),
            }
            .map_err(|err| ProtectError::entry(render_key(key), err))?;
            to.insert(key.clone_boxed(), merged)?;
        }
        Ok(())
    }
}

/// Renders a map key for error paths: strings and chars quoted, other
/// scalars as written, anything else by type name.
fn render_key(key: &dyn Reflect) -> String {
    macro_rules! render_as {
        ($($type:ty),*) => {
            $(
                if let Some(key) = key.downcast_ref::<$type>() {
                    return format!("{:?}", key);
                }
            )*
        };
    }

    render_as!(String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
    format!("<{}>", key.type_name())
}
