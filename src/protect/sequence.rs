//! Sequence merge policies.

use tracing::trace;

use super::copy::Pass;
use super::error::ProtectError;
use super::options::SequencePolicy;
use super::protector::Protector;
use super::registry::ContainerId;
use crate::reflect::{Reflect, Sequence};

impl Protector {
    pub(super) fn copy_sequence(
        &self,
        pass: Pass<'_>,
        from: &dyn Sequence,
        to: &mut dyn Sequence,
        declared: Option<&str>,
    ) -> Result<(), ProtectError> {
        let policy = match pass {
            Pass::Protected(_) => self.resolve_sequence_policy(ContainerId::of(&*to), declared)?,
            Pass::Unprotected => SequencePolicy::Overwrite,
        };
        trace!(%policy, src_len = from.len(), dst_len = to.len(), "copy sequence");

        let common = from.len().min(to.len());
        match policy {
            SequencePolicy::Overwrite => {
                to.clear();
                self.append_clones(from, to, 0)
            }
            SequencePolicy::Match => {
                self.merge_elements(pass, from, to, common)?;
                to.truncate(from.len());
                for (index, value) in elements(from).skip(common) {
                    let mut element = to.new_element();
                    self.copy_value(pass, value, &mut *element, None)
                        .map_err(|err| ProtectError::element(index, err))?;
                    to.push(element)?;
                }
                Ok(())
            }
            SequencePolicy::Longer => {
                self.merge_elements(pass, from, to, common)?;
                self.append_clones(from, to, common)
            }
            SequencePolicy::Shorter => {
                self.merge_elements(pass, from, to, common)?;
                to.truncate(common);
                Ok(())
            }
        }
    }

    // Tag-aware copy of the first `count` elements into the existing
    // destination elements.
    fn merge_elements(
        &self,
        pass: Pass<'_>,
        from: &dyn Sequence,
        to: &mut dyn Sequence,
        count: usize,
    ) -> Result<(), ProtectError> {
        for (index, value) in elements(from).take(count) {
            if let Some(target) = to.get_mut(index) {
                self.copy_value(pass, value, target, None)
                    .map_err(|err| ProtectError::element(index, err))?;
            }
        }
        Ok(())
    }

    // Appends unprotected clones of the source elements from `start` on.
    fn append_clones(&self, from: &dyn Sequence, to: &mut dyn Sequence, start: usize) -> Result<(), ProtectError> {
        for (index, value) in elements(from).skip(start) {
            let element = self
                .clone_unprotected(value)
                .map_err(|err| ProtectError::element(index, err))?;
            to.push(element)?;
        }
        Ok(())
    }
}

fn elements(sequence: &dyn Sequence) -> impl Iterator<Item = (usize, &dyn Reflect)> + '_ {
    (0..sequence.len()).filter_map(move |index| sequence.get(index).map(|value| (index, value)))
}
