//! Desired-configuration model for the h2o server
//!
//! The rendered document is consumed by the real h2o binary, so field names
//! follow h2o's configuration syntax exactly (`file.dir`, `file.dirlisting`,
//! `access-log`, `error-log`).
//!
//! A [`H2oConfig`] is constructed fresh on every reconciliation from the
//! fixed base plus the current `dirlisting` flag. Nothing here is shared
//! mutable state: rendering the same flag twice yields byte-identical
//! output (BTreeMap key ordering plus struct field order).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, SERVICE_PORT, STATIC_ROOT};

/// Host entry the fixed base config binds everything under
const DEFAULT_HOST: &str = "default";

/// Root path mapping served from the static directory
const ROOT_PATH: &str = "/";

/// Top-level h2o configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct H2oConfig {
    /// Virtual-host table; the base config declares a single `default` host
    pub hosts: BTreeMap<String, HostConfig>,

    /// Access log sink
    #[serde(rename = "access-log")]
    pub access_log: String,

    /// Error log sink
    #[serde(rename = "error-log")]
    pub error_log: String,
}

/// Per-host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Listen binding
    pub listen: Listen,

    /// Path-to-handler mapping
    pub paths: BTreeMap<String, PathConfig>,
}

/// Listen binding for a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listen {
    /// TCP port to listen on
    pub port: u16,
}

/// Static-file handler configuration for one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory served for this path
    #[serde(rename = "file.dir")]
    pub file_dir: String,

    /// Whether directory listings are generated
    #[serde(rename = "file.dirlisting")]
    pub file_dirlisting: DirListing,
}

/// h2o's ON/OFF switch for directory listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirListing {
    /// Directory listings enabled
    #[serde(rename = "ON")]
    On,
    /// Directory listings disabled
    #[serde(rename = "OFF")]
    Off,
}

impl From<bool> for DirListing {
    fn from(enabled: bool) -> Self {
        if enabled {
            DirListing::On
        } else {
            DirListing::Off
        }
    }
}

impl H2oConfig {
    /// Build the desired configuration for the current `dirlisting` flag.
    ///
    /// Everything except the listing switch comes from the fixed base:
    /// one `default` host listening on the service port, serving the
    /// static root at `/`, logging to stdout/stderr.
    pub fn new(dirlisting: bool) -> Self {
        let mut paths = BTreeMap::new();
        paths.insert(
            ROOT_PATH.to_string(),
            PathConfig {
                file_dir: STATIC_ROOT.to_string(),
                file_dirlisting: dirlisting.into(),
            },
        );

        let mut hosts = BTreeMap::new();
        hosts.insert(
            DEFAULT_HOST.to_string(),
            HostConfig {
                listen: Listen { port: SERVICE_PORT },
                paths,
            },
        );

        Self {
            hosts,
            access_log: "/dev/stdout".to_string(),
            error_log: "/dev/stderr".to_string(),
        }
    }

    /// Render the configuration to the YAML document h2o reads.
    pub fn render(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::serialization_of("h2o.conf", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_deterministic() {
        for flag in [false, true] {
            let first = H2oConfig::new(flag).render().unwrap();
            let second = H2oConfig::new(flag).render().unwrap();
            assert_eq!(first, second, "flag {flag} must render identically");
        }
    }

    #[test]
    fn dirlisting_flag_maps_to_on_off() {
        let off = H2oConfig::new(false).render().unwrap();
        assert!(off.contains("file.dirlisting: OFF"));

        let on = H2oConfig::new(true).render().unwrap();
        assert!(on.contains("file.dirlisting: ON"));
    }

    #[test]
    fn rendered_document_matches_h2o_syntax() {
        let rendered = H2oConfig::new(false).render().unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();

        assert_eq!(doc["hosts"]["default"]["listen"]["port"], 8080);
        assert_eq!(
            doc["hosts"]["default"]["paths"]["/"]["file.dir"],
            "/var/www/html"
        );
        assert_eq!(doc["hosts"]["default"]["paths"]["/"]["file.dirlisting"], "OFF");
        assert_eq!(doc["access-log"], "/dev/stdout");
        assert_eq!(doc["error-log"], "/dev/stderr");
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let config = H2oConfig::new(true);
        let rendered = config.render().unwrap();
        let parsed: H2oConfig = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn fresh_construction_never_leaks_previous_flag() {
        // Regression guard for the shared-template hazard: building with
        // one flag must not influence a later build with the other.
        let _ = H2oConfig::new(true);
        let off = H2oConfig::new(false);
        assert_eq!(
            off.hosts["default"].paths["/"].file_dirlisting,
            DirListing::Off
        );
    }
}
