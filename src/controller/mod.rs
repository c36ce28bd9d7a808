//! Reconciliation logic for lifecycle events
//!
//! One flat handler set, dispatched once per event: observe what is cheap
//! to observe (Pebble connectivity, the relation databag), compute desired
//! state from declared configuration, and converge with idempotent calls
//! (push the rendered file, restart the service, update the ingress
//! record). Handlers run to completion or raise; the only other outcome is
//! a defer request back to the dispatcher.
//!
//! All side effects go through capability traits ([`WorkloadApi`],
//! [`HookTools`], [`IngressRelation`], [`SiteFetcher`]) so the decision
//! logic is testable with doubles.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::fetch::SiteFetcher;
use crate::h2o::H2oConfig;
use crate::ingress::{IngressRecord, IngressRelation};
use crate::juju::{HookTools, UnitStatus};
use crate::pebble::{h2o_layer, WorkloadApi};
use crate::{Result, EXAMPLE_SITE_PATH, EXAMPLE_SITE_URL, H2O_CONFIG_PATH, WORKLOAD_SERVICE};

/// Status message while the Pebble API is not answering
const WAITING_FOR_PEBBLE: &str = "waiting for Pebble API";

/// Status message while the example site is being fetched
const FETCHING_SITE: &str = "Fetching web site";

/// What the dispatcher should do after a handler ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The unit converged; nothing further to do
    Converged,
    /// Preconditions not met; redeliver this event later
    Defer,
}

/// Shared handler context holding the capability implementations.
///
/// Built once per dispatch from the real adapters; tests construct it
/// from mocks and fakes.
pub struct Context {
    /// Control surface of the workload container
    pub workload: Arc<dyn WorkloadApi>,
    /// Platform model operations
    pub hooks: Arc<dyn HookTools>,
    /// Ingress relation databag access
    pub ingress: Arc<dyn IngressRelation>,
    /// Fetcher for the pull-example-site action
    pub fetcher: Arc<dyn SiteFetcher>,
    /// Where the fetched example site is written
    pub site_path: PathBuf,
}

impl Context {
    /// Create a context with the default example-site path
    pub fn new(
        workload: Arc<dyn WorkloadApi>,
        hooks: Arc<dyn HookTools>,
        ingress: Arc<dyn IngressRelation>,
        fetcher: Arc<dyn SiteFetcher>,
    ) -> Self {
        Self {
            workload,
            hooks,
            ingress,
            fetcher,
            site_path: PathBuf::from(EXAMPLE_SITE_PATH),
        }
    }

    /// Override where the example site is written
    pub fn with_site_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.site_path = path.into();
        self
    }
}

// =============================================================================
// config-changed
// =============================================================================

/// Reconcile the workload against declared configuration.
///
/// If the Pebble API is unreachable or reports no services yet, nothing is
/// written: pushing config into a not-yet-ready filesystem or restarting a
/// nonexistent service is undefined. The event defers and the unit waits.
///
/// Otherwise the leader converges the ingress hostname if the databag
/// disagrees with config, and every unit re-renders the h2o file, pushes
/// it, and restarts the service.
#[instrument(skip(ctx))]
pub async fn config_changed(ctx: &Context) -> Result<Outcome> {
    info!("reconciling workload configuration");

    if !workload_ready(ctx).await? {
        ctx.hooks
            .set_status(&UnitStatus::Waiting(WAITING_FOR_PEBBLE.to_string()))
            .await?;
        info!("pebble not ready, deferring");
        return Ok(Outcome::Defer);
    }

    let config = ctx.hooks.config().await?;

    if ctx.hooks.is_leader().await? {
        let observed = ctx.ingress.observed_hostname().await?;
        if ingress_update_needed(observed.as_deref(), &config.external_hostname) {
            info!(hostname = %config.external_hostname, "updating ingress hostname");
            let record = IngressRecord::new(&config.external_hostname, ctx.hooks.app_name());
            ctx.ingress.update(&record).await?;
        }
    }

    let rendered = H2oConfig::new(config.dirlisting).render()?;
    ctx.workload.push(H2O_CONFIG_PATH, &rendered).await?;
    ctx.workload.restart(WORKLOAD_SERVICE).await?;

    ctx.hooks.set_status(&UnitStatus::Active).await?;
    info!(dirlisting = config.dirlisting, "workload configuration applied");
    Ok(Outcome::Converged)
}

/// Whether the workload control surface answers and supervises something
async fn workload_ready(ctx: &Context) -> Result<bool> {
    if !ctx.workload.reachable().await {
        return Ok(false);
    }
    Ok(!ctx.workload.services().await?.is_empty())
}

/// Whether the databag hostname diverged from the declared one.
///
/// No relation (`None`) never needs an update; the databag is written when
/// the relation is first established.
fn ingress_update_needed(observed: Option<&str>, desired: &str) -> bool {
    matches!(observed, Some(observed) if observed != desired)
}

// =============================================================================
// pebble-ready
// =============================================================================

/// Declare the supervised h2o process and apply the plan.
///
/// The layer uses replace semantics, so redelivery leaves the plan exactly
/// as a single delivery would.
#[instrument(skip(ctx))]
pub async fn pebble_ready(ctx: &Context) -> Result<Outcome> {
    ctx.workload
        .add_layer(WORKLOAD_SERVICE, &h2o_layer())
        .await?;
    ctx.workload.replan().await?;

    ctx.hooks.set_status(&UnitStatus::Active).await?;
    info!("workload layer declared and plan applied");
    Ok(Outcome::Converged)
}

// =============================================================================
// pull-example-site action
// =============================================================================

/// Fetch the example site and drop it next to the unit.
///
/// Fetch and write failures propagate; the platform records the action as
/// failed with no partial result.
#[instrument(skip(ctx))]
pub async fn pull_example_site(ctx: &Context) -> Result<Outcome> {
    ctx.hooks
        .set_status(&UnitStatus::Maintenance(FETCHING_SITE.to_string()))
        .await?;

    let body = ctx.fetcher.fetch(EXAMPLE_SITE_URL).await?;
    tokio::fs::write(&ctx.site_path, &body).await?;

    ctx.hooks.set_status(&UnitStatus::Active).await?;
    ctx.hooks
        .action_set(&serde_json::json!({"result": "site pulled"}))
        .await?;

    info!(
        bytes = body.len(),
        path = %ctx.site_path.display(),
        "example site pulled"
    );
    Ok(Outcome::Converged)
}

// =============================================================================
// Tests
// =============================================================================
