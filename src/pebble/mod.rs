//! Workload control surface
//!
//! The managed h2o process runs in a sidecar container supervised by
//! Pebble. This module defines the capability trait the controller depends
//! on ([`WorkloadApi`]) together with the typed layer/service structures
//! that cross the Pebble API, and re-exports the real unix-socket client.
//!
//! The trait exists so reconciliation logic never touches the transport:
//! production wires in [`PebbleClient`], tests substitute a mock or an
//! in-memory fake.

mod client;

pub use client::PebbleClient;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::{Result, WORKLOAD_SERVICE};

// =============================================================================
// Layer and service types
// =============================================================================

/// A Pebble configuration layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Short human-readable summary
    pub summary: String,

    /// Longer description of what the layer configures
    pub description: String,

    /// Services declared by this layer, keyed by service name
    pub services: BTreeMap<String, ServiceSpec>,
}

/// One service entry inside a layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// How this entry combines with earlier layers for the same service
    #[serde(rename = "override")]
    pub override_: Override,

    /// Short human-readable summary
    pub summary: String,

    /// Command line Pebble supervises
    pub command: String,

    /// Whether the service starts automatically on replan
    pub startup: Startup,
}

/// Layer-merge semantics for a service entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Override {
    /// Replace any earlier definition of the service wholesale
    Replace,
    /// Merge field-by-field over earlier definitions
    Merge,
}

/// Startup policy for a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    /// Started automatically by replan
    Enabled,
    /// Only started on explicit request
    Disabled,
}

/// Runtime information about one supervised service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,

    /// Declared startup policy ("enabled"/"disabled")
    #[serde(default)]
    pub startup: String,

    /// Current state as reported by Pebble ("active", "inactive", ...)
    #[serde(default)]
    pub current: String,
}

impl ServiceInfo {
    /// Whether Pebble reports the service as running
    pub fn is_running(&self) -> bool {
        self.current == "active"
    }
}

/// The layer declaring the supervised h2o process.
///
/// `override: replace` keeps repeated declarations idempotent: adding the
/// layer N times leaves the same plan as adding it once.
pub fn h2o_layer() -> Layer {
    let mut services = BTreeMap::new();
    services.insert(
        WORKLOAD_SERVICE.to_string(),
        ServiceSpec {
            override_: Override::Replace,
            summary: "h2o".to_string(),
            command: "h2o --conf h2o.conf".to_string(),
            startup: Startup::Enabled,
        },
    );

    Layer {
        summary: "h2o-http layer".to_string(),
        description: "pebble config layer for h2o-http".to_string(),
        services,
    }
}

// =============================================================================
// Capability trait
// =============================================================================

/// Control surface of the managed workload container.
///
/// Obtained per-event; the operator never owns the workload, it converges
/// it. All operations are idempotent from the controller's point of view.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkloadApi: Send + Sync {
    /// Whether the Pebble API answers on the container's socket
    async fn reachable(&self) -> bool;

    /// List the services Pebble knows about
    async fn services(&self) -> Result<Vec<ServiceInfo>>;

    /// Write a file into the workload filesystem, creating parent
    /// directories as needed
    async fn push(&self, path: &str, content: &str) -> Result<()>;

    /// Restart a supervised service
    async fn restart(&self, service: &str) -> Result<()>;

    /// Add a configuration layer under the given label, combining with any
    /// existing layer of the same label
    async fn add_layer(&self, label: &str, layer: &Layer) -> Result<()>;

    /// Apply the current plan, starting services with startup enabled
    async fn replan(&self) -> Result<()>;
}
