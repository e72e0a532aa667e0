//! # oxide-errors
//!
//! Binds server-side validation errors onto an in-memory model tree.
//!
//! A server answers a failed save with a nested document mirroring the
//! submitted object graph:
//!
//! ```json
//! {
//!   "errors": { "name": ["is taken"] },
//!   "origin": { "errors": { "url": ["is blank"] } },
//!   "stages": [ {}, { "errors": { "name": ["is duplicated"] } } ]
//! }
//! ```
//!
//! This crate provides:
//! - [`Errors`], the per-attribute message store each model node owns
//! - [`ErrorsConsumer`], the trait a model node implements to receive errors
//! - [`Matcher`], the walk that places every message on the matching node
//! - [`UnmatchedErrors`], the path-keyed collection of messages that had no
//!   counterpart in the model
//! - [`Record`], a model node described by data instead of a struct
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_errors::{Association, Errors, ErrorsConsumer};
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct Stage {
//!     errors: Errors,
//! }
//!
//! impl ErrorsConsumer for Stage {
//!     fn errors(&self) -> &Errors {
//!         &self.errors
//!     }
//!
//!     fn errors_mut(&mut self) -> &mut Errors {
//!         &mut self.errors
//!     }
//!
//!     fn has_attribute(&self, name: &str) -> bool {
//!         name == "name"
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Pipeline {
//!     stages: Vec<Stage>,
//!     errors: Errors,
//! }
//!
//! impl ErrorsConsumer for Pipeline {
//!     fn errors(&self) -> &Errors {
//!         &self.errors
//!     }
//!
//!     fn errors_mut(&mut self) -> &mut Errors {
//!         &mut self.errors
//!     }
//!
//!     fn has_attribute(&self, name: &str) -> bool {
//!         matches!(name, "name" | "stages")
//!     }
//!
//!     fn association(&mut self, name: &str) -> Option<Association<'_>> {
//!         match name {
//!             "stages" => Some(Association::Many(
//!                 self.stages
//!                     .iter_mut()
//!                     .map(|s| s as &mut dyn ErrorsConsumer)
//!                     .collect(),
//!             )),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut pipeline = Pipeline {
//!     stages: vec![Stage::default(), Stage::default()],
//!     ..Pipeline::default()
//! };
//!
//! let unmatched = pipeline.consume_errors_response(
//!     &json!({
//!         "errors": { "name": ["is taken"] },
//!         "stages": [{}, { "errors": { "name": ["is duplicated"], "job_count": ["is zero"] } }]
//!     }),
//!     None,
//! );
//!
//! assert_eq!(pipeline.errors().errors_for_display("name"), "is taken.");
//! assert_eq!(pipeline.stages[1].errors().errors_for_display("name"), "is duplicated.");
//! assert_eq!(
//!     unmatched.keys().collect::<Vec<_>>(),
//!     vec!["pipeline.stages[1].jobCount"]
//! );
//! ```
//!
//! ## Deriving
//!
//! Writing `ErrorsConsumer` by hand is rarely needed: `oxide-errors-derive`
//! provides `#[derive(ErrorsConsumer)]`, which reads `#[errors(...)]`
//! attributes to find the store field, the associations and an optional
//! redirect target.
//!
//! ## Redirection
//!
//! A wrapper node whose validatable content lives one level deeper can
//! override [`ErrorsConsumer::error_container_for`] to send every message
//! addressed to it to another node.

mod consumer;
mod error;
pub mod matcher;
pub mod path;
mod record;
mod store;
mod unmatched;

pub use consumer::{AsErrorsConsumer, Association, ErrorsConsumer};
pub use error::{BindError, Result};
pub use matcher::{Binding, Matcher};
pub use path::{camel_case, ErrorPath};
pub use record::Record;
pub use store::Errors;
pub use unmatched::UnmatchedErrors;
