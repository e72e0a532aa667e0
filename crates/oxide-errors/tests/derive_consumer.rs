//! Tests for the `#[derive(ErrorsConsumer)]` macro output.
//!
//! These tests verify that the derive macro generates:
//! - `ERROR_ATTRIBUTES` listing declared attributes in field order
//! - `has_attribute` backed by that list
//! - association accessors for every supported field shape
//! - redirection through `#[errors(container = "...")]`
//! - the default root path

use oxide_errors::{Association, Errors, ErrorsConsumer};
use oxide_errors_derive::ErrorsConsumer;
use serde_json::json;

// =============================================================================
// Test: Plain fields and a store named `errors`
// =============================================================================

#[allow(dead_code)]
#[derive(Debug, Default, ErrorsConsumer)]
pub struct Material {
    pub url: String,
    pub branch: String,
    pub errors: Errors,
}

#[test]
fn test_material_attributes() {
    assert_eq!(Material::ERROR_ATTRIBUTES, &["url", "branch"]);
}

#[test]
fn test_material_has_attribute() {
    let material = Material::default();
    assert!(material.has_attribute("url"));
    assert!(material.has_attribute("branch"));
    assert!(!material.has_attribute("errors"));
    assert!(!material.has_attribute("URL"));
}

#[test]
fn test_material_root_path() {
    assert_eq!(Material::default().root_path(), "material");
}

#[test]
fn test_material_store_accessors() {
    let mut material = Material::default();
    material.errors_mut().add("url", "is blank");
    assert_eq!(material.errors().get("url"), &["is blank"]);
    assert_eq!(material.errors.get("url"), &["is blank"]);
}

// =============================================================================
// Test: Custom store, rename, skip and root
// =============================================================================

#[allow(dead_code)]
#[derive(Debug, Default, ErrorsConsumer)]
#[errors(root = "env")]
pub struct EnvironmentVariable {
    #[errors(skip)]
    pub id: u64,
    #[errors(rename = "secure_value")]
    pub secret: String,
    pub r#type: String,
    #[errors(store)]
    pub messages: Errors,
}

#[test]
fn test_renamed_and_skipped_attributes() {
    assert_eq!(EnvironmentVariable::ERROR_ATTRIBUTES, &["secure_value", "type"]);

    let variable = EnvironmentVariable::default();
    assert!(variable.has_attribute("secure_value"));
    assert!(!variable.has_attribute("secret"));
    assert!(!variable.has_attribute("id"));
    assert!(!variable.has_attribute("messages"));
}

#[test]
fn test_custom_root_and_store() {
    let mut variable = EnvironmentVariable::default();
    let unmatched = variable.consume_errors_response(
        &json!({"errors": {"secure_value": ["is required"], "id": ["is read only"]}}),
        None,
    );

    assert_eq!(variable.messages.get("secure_value"), &["is required"]);
    assert_eq!(unmatched.keys().collect::<Vec<_>>(), vec!["env.id"]);
}

// =============================================================================
// Test: Association shapes
// =============================================================================

#[allow(dead_code)]
#[derive(Debug, Default, ErrorsConsumer)]
pub struct Task {
    pub command: String,
    pub errors: Errors,
}

#[allow(dead_code)]
#[derive(Debug, Default, ErrorsConsumer)]
pub struct Job {
    pub name: String,
    #[errors(has_one)]
    pub primary: Task,
    #[errors(has_one)]
    pub boxed: Box<Task>,
    #[errors(has_one)]
    pub cleanup: Option<Task>,
    #[errors(has_one)]
    pub on_cancel: Option<Box<Task>>,
    #[errors(has_many)]
    pub tasks: Vec<Task>,
    #[errors(has_many)]
    pub boxed_tasks: Vec<Box<Task>>,
    pub errors: Errors,
}

fn job() -> Job {
    Job {
        tasks: vec![Task::default(), Task::default()],
        boxed_tasks: vec![Box::default()],
        ..Job::default()
    }
}

#[test]
fn test_job_attributes_include_associations() {
    assert_eq!(
        Job::ERROR_ATTRIBUTES,
        &["name", "primary", "boxed", "cleanup", "on_cancel", "tasks", "boxed_tasks"]
    );
}

#[test]
fn test_singular_shapes() {
    let mut job = job();
    assert!(matches!(job.association("primary"), Some(Association::One(_))));
    assert!(matches!(job.association("boxed"), Some(Association::One(_))));
    assert!(job.association("cleanup").is_none());
    assert!(job.association("on_cancel").is_none());

    job.cleanup = Some(Task::default());
    job.on_cancel = Some(Box::default());
    assert!(matches!(job.association("cleanup"), Some(Association::One(_))));
    assert!(matches!(job.association("on_cancel"), Some(Association::One(_))));
}

#[test]
fn test_collection_shapes() {
    let mut job = job();
    match job.association("tasks") {
        Some(Association::Many(children)) => assert_eq!(children.len(), 2),
        other => panic!("Expected Many, got {other:?}"),
    }
    match job.association("boxed_tasks") {
        Some(Association::Many(children)) => assert_eq!(children.len(), 1),
        other => panic!("Expected Many, got {other:?}"),
    }
    assert!(job.association("name").is_none());
    assert!(job.association("unknown").is_none());
}

#[test]
fn test_binds_through_every_shape() {
    let mut job = job();
    job.on_cancel = Some(Box::default());

    let unmatched = job.consume_errors_response(
        &json!({
            "primary": {"errors": {"command": ["is blank"]}},
            "boxed": {"errors": {"command": ["is boxed"]}},
            "cleanup": {"errors": {"command": ["has no model"]}},
            "on_cancel": {"errors": {"command": ["is cancelled"]}},
            "tasks": [{}, {"errors": {"command": ["is second"]}}],
            "boxed_tasks": [{"errors": {"command": ["is first"]}}]
        }),
        None,
    );

    assert_eq!(job.primary.errors.get("command"), &["is blank"]);
    assert_eq!(job.boxed.errors.get("command"), &["is boxed"]);
    assert_eq!(
        job.on_cancel.as_ref().unwrap().errors.get("command"),
        &["is cancelled"]
    );
    assert_eq!(job.tasks[1].errors.get("command"), &["is second"]);
    assert_eq!(job.boxed_tasks[0].errors.get("command"), &["is first"]);
    assert_eq!(unmatched.keys().collect::<Vec<_>>(), vec!["job.cleanup.command"]);
}

// =============================================================================
// Test: Redirection with #[errors(container = "...")]
// =============================================================================

#[allow(dead_code)]
#[derive(Debug, Default, ErrorsConsumer)]
pub struct Properties {
    pub name: String,
    pub errors: Errors,
}

#[allow(dead_code)]
#[derive(Debug, Default, ErrorsConsumer)]
#[errors(container = "attrs")]
pub struct Wrapper {
    #[errors(has_one)]
    pub attrs: Box<Properties>,
    pub errors: Errors,
}

#[test]
fn test_container_redirects_every_attribute() {
    let mut wrapper = Wrapper::default();
    let unmatched = wrapper.consume_errors_response(
        &json!({"errors": {"name": ["boom"], "attrs": ["not declared on target"]}}),
        None,
    );

    assert!(!wrapper.errors.has_errors());
    assert_eq!(wrapper.attrs.errors.get("name"), &["boom"]);
    assert_eq!(unmatched.keys().collect::<Vec<_>>(), vec!["wrapper.attrs"]);
}
