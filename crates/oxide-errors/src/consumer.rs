//! The capability a model node implements to receive errors.

use serde_json::Value;

use crate::matcher::Matcher;
use crate::path::root_segment;
use crate::store::Errors;
use crate::unmatched::UnmatchedErrors;

/// A relationship from one model node to others that a response may
/// recurse into.
pub enum Association<'a> {
    /// A singular association.
    One(&'a mut dyn ErrorsConsumer),
    /// A collection association, in model order.
    Many(Vec<&'a mut dyn ErrorsConsumer>),
}

impl std::fmt::Debug for Association<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One(_) => f.write_str("Association::One"),
            Self::Many(children) => write!(f, "Association::Many({})", children.len()),
        }
    }
}

/// Upcast to a trait object.
///
/// Implemented for every sized [`ErrorsConsumer`]; it lets provided methods
/// hand out `self` as `&mut dyn ErrorsConsumer`.
pub trait AsErrorsConsumer {
    /// Returns `self` as a trait object.
    fn as_errors_consumer(&mut self) -> &mut dyn ErrorsConsumer;
}

impl<T: ErrorsConsumer> AsErrorsConsumer for T {
    fn as_errors_consumer(&mut self) -> &mut dyn ErrorsConsumer {
        self
    }
}

/// A model node that can hold validation errors.
///
/// Usually implemented with `#[derive(ErrorsConsumer)]` from
/// `oxide-errors-derive`, which generates the attribute schema and
/// association accessors from the struct definition.
///
/// # Example
///
/// ```rust
/// use oxide_errors::{Errors, ErrorsConsumer};
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct Material {
///     url: String,
///     errors: Errors,
/// }
///
/// impl ErrorsConsumer for Material {
///     fn errors(&self) -> &Errors {
///         &self.errors
///     }
///
///     fn errors_mut(&mut self) -> &mut Errors {
///         &mut self.errors
///     }
///
///     fn has_attribute(&self, name: &str) -> bool {
///         name == "url"
///     }
/// }
///
/// let mut material = Material::default();
/// let unmatched = material.consume_errors_response(
///     &json!({ "errors": { "url": ["is blank"], "branch": ["is unknown"] } }),
///     None,
/// );
///
/// assert_eq!(material.errors().errors_for_display("url"), "is blank.");
/// assert_eq!(unmatched.keys().collect::<Vec<_>>(), vec!["material.branch"]);
/// ```
pub trait ErrorsConsumer: AsErrorsConsumer {
    /// Returns the node's message store.
    fn errors(&self) -> &Errors;

    /// Returns the node's message store for mutation.
    fn errors_mut(&mut self) -> &mut Errors;

    /// Returns whether the node declares a field or association named `name`.
    ///
    /// Only exact names match.
    fn has_attribute(&self, name: &str) -> bool;

    /// Returns the association named `name`, if the node has one.
    fn association(&mut self, _name: &str) -> Option<Association<'_>> {
        None
    }

    /// Returns the node that stores messages addressed to this node.
    ///
    /// Defaults to `self`. Overriding it redirects every attribute in a
    /// fragment's `errors` map, not just `attr`.
    fn error_container_for(&mut self, _attr: &str) -> &mut dyn ErrorsConsumer {
        self.as_errors_consumer()
    }

    /// Returns the default first segment of diagnostic paths.
    fn root_path(&self) -> String {
        root_segment(std::any::type_name::<Self>())
    }

    /// Binds a response onto this node and its associations.
    ///
    /// `root_path` replaces the default root segment when given. Returns the
    /// messages that had no model counterpart.
    fn consume_errors_response(
        &mut self,
        response: &Value,
        root_path: Option<&str>,
    ) -> UnmatchedErrors {
        let matcher = root_path.map_or_else(Matcher::new, |path| Matcher::new().root_path(path));
        matcher.consume(self, response)
    }
}
