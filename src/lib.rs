//! h2o-operator - Kubernetes charm for the h2o HTTP server
//!
//! The operator manages the lifecycle of a single h2o web-server workload
//! running in a sidecar container controlled through the Pebble
//! process-supervision API. It is dispatched once per lifecycle event by the
//! platform runtime, converges the workload towards declared configuration,
//! and exits.
//!
//! # Modules
//!
//! - [`controller`] - Reconciliation logic for lifecycle events
//! - [`pebble`] - Workload capability trait and Pebble API client
//! - [`h2o`] - Desired-configuration model and YAML rendering
//! - [`ingress`] - Ingress relation record and requirer
//! - [`juju`] - Hook-tool adapter (config, leadership, status, actions)
//! - [`fetch`] - HTTP fetcher for the pull-example-site action
//! - [`event`] - Dispatch-path parsing
//! - [`config`] - Charm configuration surface
//! - [`telemetry`] - Tracing initialization
//! - [`error`] - Error types for the operator

#![deny(missing_docs)]

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod fetch;
pub mod h2o;
pub mod ingress;
pub mod juju;
pub mod pebble;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Workload Constants
// =============================================================================
// These constants pin down the managed workload's identity and wire paths.
// Centralizing them here keeps the controller, the Pebble layer, and test
// fixtures consistent.

/// Name of the workload container the platform attaches to the unit
pub const WORKLOAD_CONTAINER: &str = "h2o-http";

/// Name of the Pebble service supervising the h2o process
pub const WORKLOAD_SERVICE: &str = "h2o-http";

/// Path inside the workload container where the rendered config is pushed
pub const H2O_CONFIG_PATH: &str = "/home/h2o/h2o.conf";

/// Port h2o listens on; also the ingress service-port
pub const SERVICE_PORT: u16 = 8080;

/// Directory h2o serves static files from
pub const STATIC_ROOT: &str = "/var/www/html";

/// Relation name carrying the ingress databag
pub const INGRESS_RELATION: &str = "ingress";

/// URL fetched by the pull-example-site action
pub const EXAMPLE_SITE_URL: &str = "http://example.com";

/// Local path the fetched example site is written to
pub const EXAMPLE_SITE_PATH: &str = "/srv/index.html";
