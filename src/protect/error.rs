//! Error types for protected copy operations.

use thiserror::Error;

/// ProtectError represents a failure of a copy, clone or slice copy.
///
/// Copies are not transactional: when a nested step fails, fields written
/// before the failure keep their new values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtectError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("unknown policy: {policy}")]
    UnknownPolicy { policy: String },

    #[error("error copying field {field}: {source}")]
    FieldCopy {
        field: String,
        source: Box<ProtectError>,
    },

    #[error("error copying element {index}: {source}")]
    ElementCopy {
        index: usize,
        source: Box<ProtectError>,
    },

    #[error("error copying entry {key}: {source}")]
    EntryCopy {
        key: String,
        source: Box<ProtectError>,
    },
}

impl ProtectError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ProtectError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ProtectError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an unknown policy error.
    pub fn unknown_policy(policy: impl Into<String>) -> Self {
        ProtectError::UnknownPolicy {
            policy: policy.into(),
        }
    }

    /// Wraps an error raised while copying the named field.
    pub fn field(field: impl Into<String>, source: ProtectError) -> Self {
        ProtectError::FieldCopy {
            field: field.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an error raised while copying a sequence element.
    pub fn element(index: usize, source: ProtectError) -> Self {
        ProtectError::ElementCopy {
            index,
            source: Box::new(source),
        }
    }

    /// Wraps an error raised while copying a map entry. `key` is the
    /// rendered key, e.g. `"name"` or `42`.
    pub fn entry(key: impl Into<String>, source: ProtectError) -> Self {
        ProtectError::EntryCopy {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, skipping field and element wrappers.
    pub fn root_cause(&self) -> &ProtectError {
        match self {
            ProtectError::FieldCopy { source, .. }
            | ProtectError::ElementCopy { source, .. }
            | ProtectError::EntryCopy { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the location of the failure relative to the copied value,
    /// e.g. `.items[1].parent.id` or `.labels["env"]`. Empty if the failure is at the root.
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        loop {
            match current {
                ProtectError::FieldCopy { field, source } => {
                    path.push('.');
                    path.push_str(field);
                    current = source;
                }
                ProtectError::ElementCopy { index, source } => {
                    path.push_str(&format!("[{}]", index));
                    current = source;
                }
                ProtectError::EntryCopy { key, source } => {
                    path.push_str(&format!("[{}]", key));
                    current = source;
                }
                _ => return path,
            }
        }
    }
}
