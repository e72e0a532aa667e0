//! Diagnostic paths and wire key normalization.

use std::fmt;

/// A dotted/bracketed address into the response, such as `pipeline.stages[2].name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorPath(String);

impl ErrorPath {
    /// Starts a path at the given root segment.
    pub fn root(segment: impl Into<String>) -> Self {
        Self(segment.into())
    }

    /// Extends the path with a key exactly as spelled on the wire.
    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        Self(format!("{}.{key}", self.0))
    }

    /// Extends the path with a key that has no model counterpart.
    ///
    /// The key is camelCased so the path reads in the model's convention.
    #[must_use]
    pub fn unbound_child(&self, key: &str) -> Self {
        Self(format!("{}.{}", self.0, camel_case(key)))
    }

    /// Appends a collection index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ErrorPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Converts a snake_case key to camelCase.
///
/// Input without underscores is returned unchanged, so the conversion is
/// idempotent. Empty segments from leading, trailing or doubled underscores
/// are dropped.
pub fn camel_case(key: &str) -> String {
    let mut result = String::with_capacity(key.len());
    for segment in key.split('_').filter(|s| !s.is_empty()) {
        if result.is_empty() {
            result.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Derives a default root segment from a Rust type name.
///
/// Module paths and generic arguments are stripped and the first character
/// is lowercased: `app::PipelineConfig<T>` becomes `pipelineConfig`.
pub fn root_segment(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let name = base.rsplit("::").next().unwrap_or(base);
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
