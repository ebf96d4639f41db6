//! The provisioning environment.
//!
//! An environment maps a logical entity kind (`users`, `computers`, ...) to
//! named entities, each described by an arbitrary attribute object:
//!
//! ```yaml
//! users:
//!   example_com:
//!     ssh_public_key: "ssh-ed25519 AAAA... deploy@example.com"
//! computers:
//!   web1:
//!     host: web1.example.com
//!     recipes: [example_com]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Entity kind holding user accounts.
pub const USERS: &str = "users";

/// Entity kind holding target computers.
pub const COMPUTERS: &str = "computers";

/// Named entities of a single kind.
pub type EntityMap = BTreeMap<String, Value>;

/// Read-only description of users, computers and other entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    entities: BTreeMap<String, EntityMap>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one entity.
    pub fn with_entity(mut self, kind: &str, name: &str, attributes: Value) -> Self {
        self.entities
            .entry(kind.to_string())
            .or_default()
            .insert(name.to_string(), attributes);
        self
    }

    /// All entities of a kind, if the kind is present.
    pub fn entities(&self, kind: &str) -> Option<&EntityMap> {
        self.entities.get(kind)
    }

    /// One entity's attributes.
    pub fn entity(&self, kind: &str, name: &str) -> Option<&Value> {
        self.entities.get(kind)?.get(name)
    }

    /// Whether `name` is a key of the `kind` mapping.
    pub fn contains(&self, kind: &str, name: &str) -> bool {
        self.entity(kind, name).is_some()
    }

    /// Entity kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn user(&self, name: &str) -> Option<&Value> {
        self.entity(USERS, name)
    }

    pub fn computer(&self, name: &str) -> Option<&Value> {
        self.entity(COMPUTERS, name)
    }

    /// Computer names in sorted order.
    pub fn computer_names(&self) -> Vec<&str> {
        self.entities(COMPUTERS)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// A string attribute of an entity.
    pub fn attribute_str(&self, kind: &str, name: &str, attribute: &str) -> Option<&str> {
        self.entity(kind, name)?.get(attribute)?.as_str()
    }

    /// The SSH target for a computer: its `host` attribute, else its name.
    pub fn computer_host<'a>(&'a self, name: &'a str) -> &'a str {
        self.attribute_str(COMPUTERS, name, "host").unwrap_or(name)
    }

    /// The default recipe list for a computer (its `recipes` attribute).
    pub fn computer_recipes(&self, name: &str) -> Vec<String> {
        self.computer(name)
            .and_then(|c| c.get("recipes"))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Environment {
        serde_yaml::from_str(
            r#"
users:
  example_com:
    ssh_public_key: "ssh-ed25519 AAAA test"
computers:
  web1:
    host: web1.example.com
    recipes: [example_com]
  bare: {}
"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_nested_entities() {
        let env = sample();
        assert!(env.contains(USERS, "example_com"));
        assert_eq!(
            env.attribute_str(USERS, "example_com", "ssh_public_key"),
            Some("ssh-ed25519 AAAA test")
        );
    }

    #[test]
    fn missing_kind_is_not_an_error() {
        let env = Environment::new();
        assert!(env.entities(USERS).is_none());
        assert!(!env.contains(USERS, "anyone"));
    }

    #[test]
    fn computer_host_falls_back_to_name() {
        let env = sample();
        assert_eq!(env.computer_host("web1"), "web1.example.com");
        assert_eq!(env.computer_host("bare"), "bare");
    }

    #[test]
    fn computer_recipes_reads_list() {
        let env = sample();
        assert_eq!(env.computer_recipes("web1"), vec!["example_com"]);
        assert!(env.computer_recipes("bare").is_empty());
        assert!(env.computer_recipes("missing").is_empty());
    }

    #[test]
    fn with_entity_builds_programmatically() {
        let env = Environment::new().with_entity(COMPUTERS, "db1", json!({"role": "db"}));
        assert_eq!(env.computer_names(), vec!["db1"]);
        assert_eq!(env.computer("db1").unwrap()["role"], "db");
        assert_eq!(env.kinds().collect::<Vec<_>>(), vec![COMPUTERS]);
    }
}
