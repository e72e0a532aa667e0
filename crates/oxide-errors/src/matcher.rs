//! The recursive walk that binds a response onto a model tree.
//!
//! A response fragment is visited together with its model counterpart, if
//! it has one. Messages under `errors` go to the counterpart's store when it
//! declares the attribute, and to [`UnmatchedErrors`] otherwise. Other keys
//! recurse into associations by exact name. Once a subtree has no model
//! counterpart it stays unbound: every message below it is recorded by path.

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::consumer::{Association, ErrorsConsumer};
use crate::error::{BindError, Result};
use crate::path::ErrorPath;
use crate::unmatched::UnmatchedErrors;

/// Key holding the messages of a fragment.
pub const ERRORS_KEY: &str = "errors";

/// Model counterpart of the fragment being walked.
pub enum Binding<'a> {
    /// The fragment corresponds to a live node.
    Bound(&'a mut dyn ErrorsConsumer),
    /// The fragment has no counterpart.
    Unbound,
}

impl Binding<'_> {
    /// Returns the bound node, if any.
    pub fn node(&mut self) -> Option<&mut dyn ErrorsConsumer> {
        match self {
            Self::Bound(node) => Some(&mut **node),
            Self::Unbound => None,
        }
    }

    /// Returns whether the fragment has a counterpart.
    pub const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

impl std::fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.is_bound() { "Bound" } else { "Unbound" })
    }
}

/// Binds error responses onto model trees.
///
/// # Example
///
/// ```rust
/// use oxide_errors::{Errors, ErrorsConsumer, Matcher};
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct Login {
///     errors: Errors,
/// }
///
/// impl ErrorsConsumer for Login {
///     fn errors(&self) -> &Errors {
///         &self.errors
///     }
///
///     fn errors_mut(&mut self) -> &mut Errors {
///         &mut self.errors
///     }
///
///     fn has_attribute(&self, name: &str) -> bool {
///         name == "password"
///     }
/// }
///
/// let mut login = Login::default();
/// let unmatched = Matcher::new()
///     .root_path("form")
///     .consume(&mut login, &json!({ "errors": { "user_name": ["is taken"] } }));
///
/// assert_eq!(unmatched.keys().collect::<Vec<_>>(), vec!["form.userName"]);
/// ```
#[derive(Debug, Clone)]
pub struct Matcher {
    root_path: Option<String>,
    clear_existing: bool,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    /// Creates a matcher that clears reached nodes before binding and derives
    /// the root path from the root node.
    pub const fn new() -> Self {
        Self {
            root_path: None,
            clear_existing: true,
        }
    }

    /// Uses `path` as the first segment of every diagnostic path.
    #[must_use]
    pub fn root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = Some(path.into());
        self
    }

    /// Keeps messages already present on the model tree.
    ///
    /// By default every node reached by the response, and its redirect
    /// target, is cleared before any message is bound, so stale messages do
    /// not survive a later validation.
    #[must_use]
    pub const fn preserve_existing(mut self) -> Self {
        self.clear_existing = false;
        self
    }

    /// Binds `response` onto `root` and returns the unmatched messages.
    pub fn consume<C>(&self, root: &mut C, response: &Value) -> UnmatchedErrors
    where
        C: ErrorsConsumer + ?Sized,
    {
        let path = ErrorPath::root(
            self.root_path
                .clone()
                .unwrap_or_else(|| root.root_path()),
        );
        debug!(root = %path, "Binding errors response");

        if self.clear_existing {
            clear_reached(root.as_errors_consumer(), response);
        }

        let mut unmatched = UnmatchedErrors::new();
        walk(
            Binding::Bound(root.as_errors_consumer()),
            response,
            &path,
            &mut unmatched,
        );

        if unmatched.has_errors() {
            debug!(
                root = %path,
                count = unmatched.count(),
                "Errors response did not fully match the model"
            );
        }
        unmatched
    }

    /// Parses `body` as JSON and binds it onto `root`.
    ///
    /// # Errors
    ///
    /// Fails when `body` is not valid JSON or not a JSON object. The binding
    /// itself never fails.
    pub fn consume_str<C>(&self, root: &mut C, body: &str) -> Result<UnmatchedErrors>
    where
        C: ErrorsConsumer + ?Sized,
    {
        let response: Value = serde_json::from_str(body)?;
        if !response.is_object() {
            return Err(BindError::NotAnObject(json_kind(&response).to_string()));
        }
        Ok(self.consume(root, &response))
    }
}

fn walk(binding: Binding<'_>, value: &Value, path: &ErrorPath, unmatched: &mut UnmatchedErrors) {
    match value {
        Value::Object(fragment) => visit(binding, fragment, path, unmatched),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(Binding::Unbound, item, &path.index(index), unmatched);
            }
        }
        other => trace!(path = %path, kind = json_kind(other), "Skipping scalar"),
    }
}

fn visit(
    mut binding: Binding<'_>,
    fragment: &Map<String, Value>,
    path: &ErrorPath,
    unmatched: &mut UnmatchedErrors,
) {
    trace!(path = %path, bound = binding.is_bound(), "Visiting fragment");

    if let Some(errors) = fragment.get(ERRORS_KEY) {
        bind_messages(&mut binding, errors, path, unmatched);
    }

    for (key, value) in fragment {
        if key != ERRORS_KEY {
            descend(&mut binding, key, value, path, unmatched);
        }
    }
}

fn bind_messages(
    binding: &mut Binding<'_>,
    errors: &Value,
    path: &ErrorPath,
    unmatched: &mut UnmatchedErrors,
) {
    let Value::Object(errors) = errors else {
        warn!(path = %path, kind = json_kind(errors), "Ignoring malformed errors map");
        return;
    };

    let mut target = match (errors.keys().next(), binding.node()) {
        (Some(first), Some(node)) => Some(node.error_container_for(first)),
        _ => None,
    };

    for (attr, messages) in errors {
        match target.as_deref_mut() {
            Some(target) if target.has_attribute(attr) => {
                for message in messages_of(messages) {
                    target.errors_mut().add(attr, message);
                }
            }
            _ => {
                let attr_path = path.unbound_child(attr);
                debug!(path = %attr_path, "Unmatched attribute");
                for message in messages_of(messages) {
                    unmatched.add(&attr_path, message);
                }
            }
        }
    }
}

fn descend(
    binding: &mut Binding<'_>,
    key: &str,
    value: &Value,
    path: &ErrorPath,
    unmatched: &mut UnmatchedErrors,
) {
    let association = binding.node().and_then(|node| node.association(key));

    match (association, value) {
        (Some(Association::One(child)), Value::Object(fragment)) => {
            visit(Binding::Bound(child), fragment, &path.child(key), unmatched);
        }
        (Some(Association::Many(children)), Value::Array(items)) => {
            let base = path.child(key);
            if items.len() != children.len() {
                debug!(
                    path = %base,
                    response = items.len(),
                    model = children.len(),
                    "Collection length differs from model"
                );
            }
            let mut children = children.into_iter();
            for (index, item) in items.iter().enumerate() {
                let binding = children.next().map_or(Binding::Unbound, Binding::Bound);
                walk(binding, item, &base.index(index), unmatched);
            }
        }
        (Some(_), value) => {
            debug!(path = %path.child(key), kind = json_kind(value), "Association shape mismatch");
            walk(Binding::Unbound, value, &path.child(key), unmatched);
        }
        (None, value) => walk(Binding::Unbound, value, &path.unbound_child(key), unmatched),
    }
}

/// Clears every node the response reaches in bound mode.
fn clear_reached(node: &mut dyn ErrorsConsumer, response: &Value) {
    let Value::Object(fragment) = response else {
        return;
    };

    node.errors_mut().clear();
    if let Some(Value::Object(errors)) = fragment.get(ERRORS_KEY) {
        if let Some(first) = errors.keys().next() {
            node.error_container_for(first).errors_mut().clear();
        }
    }

    for (key, value) in fragment {
        if key == ERRORS_KEY {
            continue;
        }
        match (node.association(key), value) {
            (Some(Association::One(child)), Value::Object(_)) => clear_reached(child, value),
            (Some(Association::Many(children)), Value::Array(items)) => {
                for (child, item) in children.into_iter().zip(items) {
                    clear_reached(child, item);
                }
            }
            _ => {}
        }
    }
}

/// Null carries no message, whether it stands for the list or an entry.
fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(message_text).collect(),
        other => message_text(other).into_iter().collect(),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
