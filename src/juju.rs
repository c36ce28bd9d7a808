//! Hook-tool adapter
//!
//! Inside a hook execution the platform exposes its model through hook
//! tools on `$PATH` (`config-get`, `is-leader`, `status-set`, ...). This
//! module wraps them behind the [`HookTools`] trait so the controller can
//! be tested without a running platform, and provides the subprocess
//! runner the ingress relation adapter reuses.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::config::CharmConfig;
use crate::{Error, Result};

// =============================================================================
// Unit status
// =============================================================================

/// Observable status of this unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// The workload is configured and running
    Active,
    /// Waiting on something outside our control; the message says what
    Waiting(String),
    /// Performing an operation; the message says which
    Maintenance(String),
}

impl UnitStatus {
    /// Status name as the platform spells it
    pub fn name(&self) -> &'static str {
        match self {
            UnitStatus::Active => "active",
            UnitStatus::Waiting(_) => "waiting",
            UnitStatus::Maintenance(_) => "maintenance",
        }
    }

    /// Human-readable status message (empty for Active)
    pub fn message(&self) -> &str {
        match self {
            UnitStatus::Active => "",
            UnitStatus::Waiting(msg) | UnitStatus::Maintenance(msg) => msg,
        }
    }
}

// =============================================================================
// Capability trait
// =============================================================================

/// Platform model operations available to hook code.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HookTools: Send + Sync {
    /// Read the charm's declared configuration
    async fn config(&self) -> Result<CharmConfig>;

    /// Whether this unit is the application leader
    async fn is_leader(&self) -> Result<bool>;

    /// Set this unit's observable status
    async fn set_status(&self, status: &UnitStatus) -> Result<()>;

    /// Record results for the currently executing action
    async fn action_set(&self, results: &serde_json::Value) -> Result<()>;

    /// Name of the application this unit belongs to
    fn app_name(&self) -> String;
}

// =============================================================================
// Subprocess runner
// =============================================================================

/// Run a hook tool, returning its stdout.
///
/// A nonzero exit is a hook-tool error; spawning failures (tool not on
/// `$PATH`, i.e. running outside a hook context) surface the same way.
pub(crate) async fn run_tool(tool: &str, args: &[String]) -> Result<String> {
    debug!(tool, ?args, "running hook tool");
    let output = Command::new(tool)
        .args(args)
        .output()
        .await
        .map_err(|e| Error::hook(tool, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::hook(
            tool,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    String::from_utf8(output.stdout).map_err(|e| Error::hook(tool, e.to_string()))
}

/// Run a hook tool with `--format=json` and parse its output.
pub(crate) async fn run_tool_json(tool: &str, args: &[String]) -> Result<serde_json::Value> {
    let mut args = args.to_vec();
    args.push("--format=json".to_string());
    let stdout = run_tool(tool, &args).await?;
    if stdout.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&stdout).map_err(|e| Error::serialization_of(tool, e.to_string()))
}

// =============================================================================
// Production implementation
// =============================================================================

/// Hook tools backed by the platform's subprocess interface
pub struct JujuHookTools {
    app: String,
}

impl JujuHookTools {
    /// Build from the hook environment (`JUJU_UNIT_NAME`, e.g. "h2o-http-k8s/0")
    pub fn from_env() -> Self {
        let unit = std::env::var("JUJU_UNIT_NAME").unwrap_or_default();
        Self {
            app: app_from_unit(&unit),
        }
    }
}

/// Derive the application name from a unit name ("app/0" → "app")
fn app_from_unit(unit: &str) -> String {
    unit.split('/').next().unwrap_or_default().to_string()
}

/// Flatten a JSON object into `key=value` arguments for `action-set`
fn action_args(results: &serde_json::Value) -> Vec<String> {
    match results.as_object() {
        Some(map) => map
            .iter()
            .map(|(key, value)| match value.as_str() {
                Some(s) => format!("{key}={s}"),
                None => format!("{key}={value}"),
            })
            .collect(),
        None => Vec::new(),
    }
}

#[async_trait]
impl HookTools for JujuHookTools {
    async fn config(&self) -> Result<CharmConfig> {
        let value = run_tool_json("config-get", &[]).await?;
        CharmConfig::from_json(value)
    }

    async fn is_leader(&self) -> Result<bool> {
        let value = run_tool_json("is-leader", &[]).await?;
        value
            .as_bool()
            .ok_or_else(|| Error::hook("is-leader", format!("unexpected output: {value}")))
    }

    async fn set_status(&self, status: &UnitStatus) -> Result<()> {
        let mut args = vec![status.name().to_string()];
        if !status.message().is_empty() {
            args.push(status.message().to_string());
        }
        run_tool("status-set", &args).await?;
        Ok(())
    }

    async fn action_set(&self, results: &serde_json::Value) -> Result<()> {
        run_tool("action-set", &action_args(results)).await?;
        Ok(())
    }

    fn app_name(&self) -> String {
        self.app.clone()
    }
}
