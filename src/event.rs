//! Lifecycle event identity
//!
//! The platform runtime invokes the operator binary once per event with the
//! event's dispatch path in the environment (`JUJU_DISPATCH_PATH`, e.g.
//! `hooks/config-changed`). This module maps dispatch paths to the events
//! the operator handles; everything else is surfaced as [`Event::Other`] so
//! the dispatcher can treat unhandled hooks as successful no-ops.

/// A lifecycle event delivered by the platform runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Declared configuration changed; reconcile the workload
    ConfigChanged,
    /// The workload container's Pebble API became ready
    PebbleReady,
    /// On-demand action: fetch the example site
    PullExampleSite,
    /// Any other hook or action; handled as a no-op
    Other(String),
}

impl Event {
    /// Parse an event from a dispatch path such as `hooks/config-changed`.
    ///
    /// The leading `hooks/` or `actions/` segment is optional so bare hook
    /// names (from `JUJU_HOOK_NAME`) parse the same way.
    pub fn from_dispatch_path(path: &str) -> Self {
        let name = path
            .trim_start_matches("hooks/")
            .trim_start_matches("actions/");

        match name {
            "config-changed" => Event::ConfigChanged,
            "h2o-http-pebble-ready" => Event::PebbleReady,
            "pull-example-site" => Event::PullExampleSite,
            other => Event::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::ConfigChanged => write!(f, "config-changed"),
            Event::PebbleReady => write!(f, "h2o-http-pebble-ready"),
            Event::PullExampleSite => write!(f, "pull-example-site"),
            Event::Other(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_hooks() {
        assert_eq!(
            Event::from_dispatch_path("hooks/config-changed"),
            Event::ConfigChanged
        );
        assert_eq!(
            Event::from_dispatch_path("hooks/h2o-http-pebble-ready"),
            Event::PebbleReady
        );
        assert_eq!(
            Event::from_dispatch_path("actions/pull-example-site"),
            Event::PullExampleSite
        );
    }

    #[test]
    fn parses_bare_names() {
        assert_eq!(
            Event::from_dispatch_path("config-changed"),
            Event::ConfigChanged
        );
    }

    #[test]
    fn unknown_hooks_become_other() {
        let event = Event::from_dispatch_path("hooks/start");
        assert_eq!(event, Event::Other("start".to_string()));
        assert_eq!(event.to_string(), "start");
    }
}
