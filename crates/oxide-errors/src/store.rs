//! Per-attribute message store.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered collection of error messages keyed by attribute name.
///
/// Attributes keep their insertion order and messages keep the order they
/// were added in. An attribute never holds an empty list: clearing it removes
/// the key, so "no messages" and "absent" look the same from the outside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Errors {
    messages: IndexMap<String, Vec<String>>,
}

impl Errors {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message for an attribute.
    pub fn add(&mut self, attr: &str, message: impl Into<String>) {
        self.messages
            .entry(attr.to_string())
            .or_default()
            .push(message.into());
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Removes the messages of one attribute, leaving the others in place.
    pub fn clear_attribute(&mut self, attr: &str) {
        self.messages.shift_remove(attr);
    }

    /// Returns the full attribute to messages mapping.
    pub const fn all(&self) -> &IndexMap<String, Vec<String>> {
        &self.messages
    }

    /// Returns the messages of one attribute, empty when it has none.
    pub fn get(&self, attr: &str) -> &[String] {
        self.messages
            .get(attr)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns whether any attribute holds a message.
    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Returns whether `attr` holds at least one message.
    pub fn has_errors_on(&self, attr: &str) -> bool {
        self.messages.contains_key(attr)
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the number of attributes holding messages.
    ///
    /// This counts attributes, not messages.
    pub fn count(&self) -> usize {
        self.messages.len()
    }

    /// Returns attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Iterates over `(attribute, messages)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages
            .iter()
            .map(|(attr, messages)| (attr.as_str(), messages.as_slice()))
    }

    /// Renders the messages of `attr` as sentences.
    ///
    /// Every message gets a trailing period and the results are joined with a
    /// single space. The period is appended even if the message already ends
    /// in punctuation.
    pub fn errors_for_display(&self, attr: &str) -> String {
        self.get(attr)
            .iter()
            .map(|message| format!("{message}."))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (attr, messages) in &self.messages {
            for message in messages {
                writeln!(f, "{attr}: {message}")?;
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Errors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut messages = IndexMap::<String, Vec<String>>::deserialize(deserializer)?;
        messages.retain(|_, messages| !messages.is_empty());
        Ok(Self { messages })
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_message_order() {
        let mut errors = Errors::new();
        errors.add("name", "is blank");
        errors.add("name", "is too short");

        assert_eq!(errors.get("name"), &["is blank", "is too short"]);
    }

    #[test]
    fn test_keys_in_insertion_order() {
        let mut errors = Errors::new();
        errors.add("zeta", "z");
        errors.add("alpha", "a");
        errors.add("zeta", "again");

        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_count_is_attribute_count() {
        let mut errors = Errors::new();
        errors.add("name", "one");
        errors.add("name", "two");
        errors.add("email", "three");

        assert_eq!(errors.count(), 2);
    }

    #[test]
    fn test_errors_for_display() {
        let mut errors = Errors::new();
        errors.add("name", "is blank");
        errors.add("name", "must be unique");

        assert_eq!(
            errors.errors_for_display("name"),
            "is blank. must be unique."
        );
        assert_eq!(errors.errors_for_display("missing"), "");
    }

    #[test]
    fn test_errors_for_display_always_appends_period() {
        let mut errors = Errors::new();
        errors.add("name", "is blank.");

        assert_eq!(errors.errors_for_display("name"), "is blank..");
    }

    #[test]
    fn test_clear_attribute_leaves_others() {
        let mut errors = Errors::new();
        errors.add("x", "gone");
        errors.add("y", "stays");
        errors.clear_attribute("x");

        assert!(!errors.has_errors_on("x"));
        assert!(errors.get("x").is_empty());
        assert_eq!(errors.get("y"), &["stays"]);
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut errors = Errors::new();
        errors.add("x", "a");
        errors.add("y", "b");
        errors.clear();

        assert!(!errors.has_errors());
        assert_eq!(errors.count(), 0);
        assert_eq!(errors.keys().count(), 0);
    }

    #[test]
    fn test_display() {
        let mut errors = Errors::new();
        errors.add("name", "is blank");
        errors.add("email", "is invalid");

        assert_eq!(errors.to_string(), "name: is blank\nemail: is invalid\n");
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let mut errors = Errors::new();
        errors.add("b", "first");
        errors.add("a", "second");

        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"b":["first"],"a":["second"]}"#);
    }

    #[test]
    fn test_deserialize_drops_empty_attributes() {
        let errors: Errors =
            serde_json::from_str(r#"{"name": [], "email": ["is invalid"]}"#).unwrap();

        assert!(!errors.has_errors_on("name"));
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["email"]);

        let empty: Errors = serde_json::from_str(r#"{"name": []}"#).unwrap();
        assert_eq!(empty, Errors::new());
        assert!(!empty.has_errors());
    }

    #[test]
    fn test_deserialize_round_trip() {
        let mut errors = Errors::new();
        errors.add("b", "first");
        errors.add("a", "second");
        errors.add("b", "third");

        let json = serde_json::to_string(&errors).unwrap();
        let restored: Errors = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, errors);
    }
}
