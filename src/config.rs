//! Charm configuration surface
//!
//! The platform validates config option types against the charm's declared
//! schema, so deserialization here trusts the shapes and only supplies
//! defaults for absent keys.

use serde::Deserialize;

use crate::{Error, Result};

/// Declared configuration for the h2o workload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CharmConfig {
    /// Whether h2o serves directory listings for the static root
    pub dirlisting: bool,

    /// Hostname published on the ingress relation
    pub external_hostname: String,
}

impl Default for CharmConfig {
    fn default() -> Self {
        Self {
            dirlisting: false,
            external_hostname: String::new(),
        }
    }
}

impl CharmConfig {
    /// Parse the JSON document produced by `config-get --format=json`.
    ///
    /// Unknown options are ignored; missing options take their defaults.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::serialization_of("charm config", e.to_string()))
    }
}
