//! Messages that could not be placed on the model tree.

use std::ops::Deref;

use serde::Serialize;
use tracing::warn;

use crate::path::ErrorPath;
use crate::store::Errors;

/// Diagnostic collection of orphaned messages, keyed by full path.
///
/// Created once per binding call and handed back to the caller. A non-empty
/// collection means the response and the model tree disagree on shape:
/// renamed fields, stale client code, or diverging hierarchies. It is meant
/// for logs and reports, not for end users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UnmatchedErrors {
    errors: Errors,
}

impl UnmatchedErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message at `path`.
    pub fn add(&mut self, path: &ErrorPath, message: impl Into<String>) {
        self.errors.add(path.as_str(), message);
    }

    /// Emits one warning per orphaned path.
    pub fn report(&self) {
        for (path, _) in self.errors.iter() {
            warn!(
                path = %path,
                messages = %self.errors.errors_for_display(path),
                "Unmatched validation errors"
            );
        }
    }

    /// Returns the underlying store.
    pub fn into_errors(self) -> Errors {
        self.errors
    }
}

impl Deref for UnmatchedErrors {
    type Target = Errors;

    fn deref(&self) -> &Errors {
        &self.errors
    }
}
