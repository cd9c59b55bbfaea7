//! Container merge policies and field protection rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ProtectError;
use crate::reflect::StructTag;

/// SequencePolicy selects how a source sequence is merged into a destination
/// sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencePolicy {
    /// The destination is replaced by unprotected clones of the source
    /// elements. Element-level exclusions do not apply.
    #[default]
    Overwrite,
    /// The destination takes the source length. Existing elements are
    /// merged with exclusions applied; new elements are built from zero
    /// values with exclusions applied.
    Match,
    /// The destination keeps its length if it is longer. Common elements are
    /// merged with exclusions; extra source elements are appended as
    /// unprotected clones.
    Longer,
    /// The destination is truncated to the shorter length and the common
    /// elements are merged with exclusions.
    Shorter,
}

impl SequencePolicy {
    /// Returns the token naming the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            SequencePolicy::Overwrite => "overwrite",
            SequencePolicy::Match => "match",
            SequencePolicy::Longer => "longer",
            SequencePolicy::Shorter => "shorter",
        }
    }
}

impl FromStr for SequencePolicy {
    type Err = ProtectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "overwrite" => Ok(SequencePolicy::Overwrite),
            "match" => Ok(SequencePolicy::Match),
            "longer" => Ok(SequencePolicy::Longer),
            "shorter" => Ok(SequencePolicy::Shorter),
            other => Err(ProtectError::unknown_policy(other)),
        }
    }
}

impl fmt::Display for SequencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MapPolicy selects how a source map is merged into a destination map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapPolicy {
    /// The destination is replaced by unprotected clones of the source
    /// entries.
    #[default]
    Overwrite,
    /// The destination keeps exactly the source keys. Common entries are
    /// merged with exclusions applied.
    Match,
    /// Like `Match`, but destination-only keys are kept untouched.
    Patch,
}

impl MapPolicy {
    /// Returns the token naming the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapPolicy::Overwrite => "overwrite",
            MapPolicy::Match => "match",
            MapPolicy::Patch => "patch",
        }
    }
}

impl FromStr for MapPolicy {
    type Err = ProtectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "overwrite" => Ok(MapPolicy::Overwrite),
            "match" => Ok(MapPolicy::Match),
            "patch" => Ok(MapPolicy::Patch),
            other => Err(ProtectError::unknown_policy(other)),
        }
    }
}

impl fmt::Display for MapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// FieldRules holds the parsed annotations of one struct field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    protected_for: Vec<String>,
    policy: Option<String>,
}

impl FieldRules {
    /// Parses the field annotation using the given tag names.
    pub fn parse(tag: StructTag<'_>, tag_name: &str, option_tag_name: &str) -> Self {
        let protected_for = tag
            .get(tag_name)
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect();

        let policy = Some(tag.get(option_tag_name).trim())
            .filter(|token| !token.is_empty())
            .map(String::from);

        FieldRules {
            protected_for,
            policy,
        }
    }

    /// Returns true if the field is excluded for the operation tag.
    /// The empty tag never excludes anything.
    pub fn is_protected_for(&self, tag: &str) -> bool {
        !tag.is_empty() && self.protected_for.iter().any(|token| token == tag)
    }

    /// Returns the operation tags the field is excluded for.
    pub fn protected_for(&self) -> &[String] {
        &self.protected_for
    }

    /// Returns the declared container policy token, if any.
    pub fn policy(&self) -> Option<&str> {
        self.policy.as_deref()
    }
}
