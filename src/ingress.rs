//! Ingress relation integration
//!
//! The charm publishes `{service-hostname, service-name, service-port}` on
//! the `ingress` relation's application databag; the ingress controller on
//! the far side turns that into an HTTP route. Only the leader unit may
//! write the databag. The [`IngressRelation`] trait is the seam the
//! controller depends on; [`JujuIngressRelation`] is the hook-tool-backed
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::juju::{run_tool, run_tool_json};
use crate::{Result, INGRESS_RELATION, SERVICE_PORT};

/// Declared ingress route for the workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRecord {
    /// Hostname the route answers on
    #[serde(rename = "service-hostname")]
    pub service_hostname: String,

    /// Kubernetes service the route forwards to
    #[serde(rename = "service-name")]
    pub service_name: String,

    /// Port the route forwards to
    #[serde(rename = "service-port")]
    pub service_port: u16,
}

impl IngressRecord {
    /// Build the record for this application and the declared hostname.
    ///
    /// The service port is fixed: h2o always listens on the service port.
    pub fn new(hostname: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            service_hostname: hostname.into(),
            service_name: app.into(),
            service_port: SERVICE_PORT,
        }
    }

    /// Databag entries as `key=value` arguments for `relation-set`
    fn as_relation_args(&self) -> Vec<String> {
        vec![
            format!("service-hostname={}", self.service_hostname),
            format!("service-name={}", self.service_name),
            format!("service-port={}", self.service_port),
        ]
    }
}

/// View of the ingress relation from this unit.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IngressRelation: Send + Sync {
    /// Hostname currently recorded in the relation's application databag.
    ///
    /// `None` when no ingress relation exists (or the databag has no
    /// hostname yet, which reads the same way to the reconciler).
    async fn observed_hostname(&self) -> Result<Option<String>>;

    /// Replace the databag contents with the given record
    async fn update(&self, record: &IngressRecord) -> Result<()>;
}

/// Hook-tool-backed ingress relation access
pub struct JujuIngressRelation {
    app: String,
}

impl JujuIngressRelation {
    /// Create for the given application name
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }

    /// First established ingress relation id, if any
    async fn relation_id(&self) -> Result<Option<String>> {
        let ids = run_tool_json("relation-ids", &[INGRESS_RELATION.to_string()]).await?;
        Ok(ids
            .as_array()
            .and_then(|ids| ids.first())
            .and_then(|id| id.as_str())
            .map(|id| id.to_string()))
    }
}

#[async_trait]
impl IngressRelation for JujuIngressRelation {
    async fn observed_hostname(&self) -> Result<Option<String>> {
        let relation_id = match self.relation_id().await? {
            Some(id) => id,
            None => return Ok(None),
        };

        let databag = run_tool_json(
            "relation-get",
            &[
                "-r".to_string(),
                relation_id,
                "--app".to_string(),
                "-".to_string(),
                self.app.clone(),
            ],
        )
        .await?;

        Ok(databag["service-hostname"].as_str().map(|s| s.to_string()))
    }

    async fn update(&self, record: &IngressRecord) -> Result<()> {
        let relation_id = match self.relation_id().await? {
            Some(id) => id,
            // No relation to write; nothing to converge.
            None => return Ok(()),
        };

        let mut args = vec!["-r".to_string(), relation_id, "--app".to_string()];
        args.extend(record.as_relation_args());
        run_tool("relation-set", &args).await?;
        Ok(())
    }
}
