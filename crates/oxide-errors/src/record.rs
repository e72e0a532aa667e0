//! Data-described model nodes.
//!
//! A [`Record`] is a model node whose schema is loaded at runtime instead of
//! being derived from a struct. It lets tooling reconcile a response against
//! a model skeleton written as JSON:
//!
//! ```json
//! {
//!   "type": "Pipeline",
//!   "fields": ["name", "group"],
//!   "has_one": { "origin": { "fields": ["url"] } },
//!   "has_many": { "stages": [{ "fields": ["name"] }] },
//!   "container": "origin"
//! }
//! ```

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consumer::{Association, ErrorsConsumer};
use crate::error::{BindError, Result};
use crate::path::{root_segment, ErrorPath};
use crate::store::Errors;

/// A model node described by data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Type name, used for the default root path.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Plain fields.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub fields: IndexSet<String>,
    /// Singular associations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub has_one: IndexMap<String, Record>,
    /// Collection associations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub has_many: IndexMap<String, Vec<Record>>,
    /// Name of the `has_one` entry that stores this node's messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Bound messages.
    #[serde(default, skip_serializing_if = "Errors::is_empty")]
    pub errors: Errors,
}

impl Record {
    /// Creates an anonymous record with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record with a type name.
    pub fn named(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Declares a plain field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into());
        self
    }

    /// Declares a singular association.
    #[must_use]
    pub fn has_one(mut self, name: impl Into<String>, child: Self) -> Self {
        self.has_one.insert(name.into(), child);
        self
    }

    /// Declares a collection association.
    #[must_use]
    pub fn has_many(mut self, name: impl Into<String>, children: Vec<Self>) -> Self {
        self.has_many.insert(name.into(), children);
        self
    }

    /// Redirects this node's messages to the `has_one` entry `name`.
    #[must_use]
    pub fn container(mut self, name: impl Into<String>) -> Self {
        self.container = Some(name.into());
        self
    }

    /// Parses and validates a model skeleton.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, unknown keys, or a `container` that does not
    /// name a `has_one` entry.
    pub fn from_json(source: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(source)?;
        record.validate()?;
        Ok(record)
    }

    /// Checks that every `container` names an existing `has_one` entry.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::InvalidModel`] for the first offending node.
    pub fn validate(&self) -> Result<()> {
        self.validate_at(&ErrorPath::root(self.root_path()))
    }

    fn validate_at(&self, path: &ErrorPath) -> Result<()> {
        if let Some(container) = &self.container {
            if !self.has_one.contains_key(container) {
                return Err(BindError::InvalidModel {
                    path: path.to_string(),
                    message: format!("container `{container}` is not a has_one association"),
                });
            }
        }
        for (name, child) in &self.has_one {
            child.validate_at(&path.child(name))?;
        }
        for (name, children) in &self.has_many {
            let base = path.child(name);
            for (index, child) in children.iter().enumerate() {
                child.validate_at(&base.index(index))?;
            }
        }
        debug!(path = %path, "Validated record");
        Ok(())
    }
}

impl ErrorsConsumer for Record {
    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.fields.contains(name)
            || self.has_one.contains_key(name)
            || self.has_many.contains_key(name)
    }

    fn association(&mut self, name: &str) -> Option<Association<'_>> {
        if let Some(child) = self.has_one.get_mut(name) {
            return Some(Association::One(child));
        }
        self.has_many.get_mut(name).map(|children| {
            Association::Many(
                children
                    .iter_mut()
                    .map(|child| child as &mut dyn ErrorsConsumer)
                    .collect(),
            )
        })
    }

    fn error_container_for(&mut self, _attr: &str) -> &mut dyn ErrorsConsumer {
        let index = self
            .container
            .as_deref()
            .and_then(|name| self.has_one.get_index_of(name));
        match index {
            Some(index) => &mut self.has_one[index],
            None => self,
        }
    }

    fn root_path(&self) -> String {
        self.kind
            .as_deref()
            .map_or_else(|| "record".to_string(), root_segment)
    }
}
