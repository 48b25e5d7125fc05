//! World configuration.

use serde::Deserialize;

/// Configuration for a [`World`](crate::World).
///
/// Every field has a default, so a host can load a partial JSON document:
///
/// ```rust
/// use forge_world::WorldConfig;
///
/// let config = WorldConfig::from_json(r#"{ "name": "fleet" }"#).unwrap();
/// assert_eq!(config.name, "fleet");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Human-readable world name, attached to the world's log events.
    pub name: String,
    /// Number of entity slots to reserve up front.
    pub entity_capacity: usize,
}

impl WorldConfig {
    /// Create a config with the given world name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reserve room for `capacity` entities before the first reallocation.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Parse a config from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "world".to_owned(),
            entity_capacity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = WorldConfig::new("fleet").with_entity_capacity(256);
        assert_eq!(config.name, "fleet");
        assert_eq!(config.entity_capacity, 256);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WorldConfig::from_json(r#"{ "entity_capacity": 64 }"#).unwrap();
        assert_eq!(config.name, "world");
        assert_eq!(config.entity_capacity, 64);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(WorldConfig::from_json(r#"{ "entity_capacity": "lots" }"#).is_err());
    }
}
