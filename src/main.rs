//! h2o-operator - dispatch entry point
//!
//! The platform runtime invokes this binary once per lifecycle event with
//! the event identity in the environment. The adapter here is deliberately
//! thin: parse the event, wire the real capability implementations into a
//! [`Context`], run exactly one handler, and translate its outcome into
//! the exit-status protocol the dispatcher understands.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};

use h2o_operator::controller::{self, Context, Outcome};
use h2o_operator::event::Event;
use h2o_operator::fetch::HttpSiteFetcher;
use h2o_operator::ingress::JujuIngressRelation;
use h2o_operator::juju::{HookTools, JujuHookTools};
use h2o_operator::pebble::PebbleClient;
use h2o_operator::{telemetry, WORKLOAD_CONTAINER};

/// Exit status asking the dispatcher to redeliver the event later.
///
/// Distinct from 1 (handler error) so redelivery is not mistaken for
/// failure.
const EXIT_DEFER: i32 = 2;

/// Kubernetes charm managing a single h2o web-server workload
#[derive(Parser, Debug)]
#[command(name = "h2o-operator", version, about, long_about = None)]
struct Cli {
    /// Dispatch path of the event being delivered (e.g. "hooks/config-changed")
    #[arg(long, env = "JUJU_DISPATCH_PATH")]
    dispatch_path: Option<String>,

    /// Pebble socket override; defaults to the container's platform-mounted socket
    #[arg(long, env = "PEBBLE_SOCKET")]
    socket: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init()?;

    let cli = Cli::parse();

    let event = match cli.dispatch_path.as_deref() {
        Some(path) => Event::from_dispatch_path(path),
        None => {
            warn!("no dispatch path in environment, nothing to do");
            return Ok(());
        }
    };

    let workload = match cli.socket {
        Some(socket) => PebbleClient::new(socket),
        None => PebbleClient::for_container(WORKLOAD_CONTAINER),
    };
    let hooks = JujuHookTools::from_env();
    let ingress = JujuIngressRelation::new(hooks.app_name());

    let ctx = Context::new(
        Arc::new(workload),
        Arc::new(hooks),
        Arc::new(ingress),
        Arc::new(HttpSiteFetcher::new()),
    );

    info!(event = %event, "dispatching");
    let outcome = match event {
        Event::ConfigChanged => controller::config_changed(&ctx).await?,
        Event::PebbleReady => controller::pebble_ready(&ctx).await?,
        Event::PullExampleSite => controller::pull_example_site(&ctx).await?,
        Event::Other(ref name) => {
            debug!(hook = %name, "no handler for event, ignoring");
            Outcome::Converged
        }
    };

    if outcome == Outcome::Defer {
        info!(event = %event, "requesting redelivery");
        std::process::exit(EXIT_DEFER);
    }

    Ok(())
}
