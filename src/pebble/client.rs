//! Pebble API client over the container's unix socket
//!
//! The platform mounts one Pebble socket per workload container at
//! `/charm/containers/<name>/pebble.socket`. All requests are plain
//! HTTP/1.1 with JSON bodies except file writes, which use Pebble's
//! multipart form.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use hyperlocal::{UnixConnector, Uri};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Layer, ServiceInfo, WorkloadApi};
use crate::{Error, Result};

/// Boundary used for multipart file writes
const MULTIPART_BOUNDARY: &str = "pebble-write-boundary";

/// Pebble's wrapper around every response body
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "status-code")]
    status_code: u16,
    #[serde(default)]
    result: serde_json::Value,
}

/// HTTP client for one container's Pebble daemon
pub struct PebbleClient {
    socket: PathBuf,
    client: Client<UnixConnector, Full<Bytes>>,
}

impl PebbleClient {
    /// Create a client for an explicit socket path
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
            client: Client::builder(TokioExecutor::new()).build(UnixConnector),
        }
    }

    /// Create a client for the container's platform-mounted socket
    pub fn for_container(container: &str) -> Self {
        Self::new(format!("/charm/containers/{container}/pebble.socket"))
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<serde_json::Value> {
        let uri: hyper::Uri = Uri::new(&self.socket, endpoint).into();
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", content_type)
            .body(Full::new(body))
            .map_err(|e| Error::internal_with_context("pebble", e.to_string()))?;

        // Transport failures mean the socket isn't there yet or the daemon
        // is restarting; both clear up on redelivery.
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| Error::pebble(format!("{endpoint}: {e}")))?;

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::pebble(format!("{endpoint}: reading body: {e}")))?
            .to_bytes();

        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|e| Error::pebble(format!("{endpoint}: malformed response: {e}")))?;

        if !(200..300).contains(&envelope.status_code) {
            let message = envelope.result["message"]
                .as_str()
                .unwrap_or("unknown failure")
                .to_string();
            let message = format!("{endpoint}: {} ({})", message, envelope.status_code);
            return if (400..500).contains(&envelope.status_code) {
                Err(Error::pebble_permanent(message))
            } else {
                Err(Error::pebble(message))
            };
        }

        Ok(envelope.result)
    }

    async fn get(&self, endpoint: &str) -> Result<serde_json::Value> {
        self.request(Method::GET, endpoint, Bytes::new(), "application/json")
            .await
    }

    async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let body = serde_json::to_vec(&body)
            .map_err(|e| Error::serialization_of(endpoint.to_string(), e.to_string()))?;
        self.request(Method::POST, endpoint, body.into(), "application/json")
            .await
    }
}

/// Build the JSON body for an add-layer request.
///
/// The layer itself travels as an embedded YAML document, the format
/// Pebble stores layers in.
fn add_layer_body(label: &str, layer: &Layer) -> Result<serde_json::Value> {
    let layer_yaml = serde_yaml::to_string(layer)
        .map_err(|e| Error::serialization_of("pebble layer", e.to_string()))?;
    Ok(json!({
        "action": "add",
        "combine": true,
        "label": label,
        "format": "yaml",
        "layer": layer_yaml,
    }))
}

/// Build the multipart body for a file write, returning (content-type, body).
fn write_file_body(path: &str, content: &str) -> (String, String) {
    let metadata = json!({
        "action": "write",
        "files": [{"path": path, "make-dirs": true}],
    });

    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"request\"\r\n\
         Content-Type: application/json\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"files\"; filename=\"{path}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n",
        boundary = MULTIPART_BOUNDARY,
    );

    (
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        body,
    )
}

#[async_trait]
impl WorkloadApi for PebbleClient {
    async fn reachable(&self) -> bool {
        self.get("/v1/system-info").await.is_ok()
    }

    async fn services(&self) -> Result<Vec<ServiceInfo>> {
        let result = self.get("/v1/services").await?;
        serde_json::from_value(result)
            .map_err(|e| Error::pebble(format!("/v1/services: unexpected result: {e}")))
    }

    async fn push(&self, path: &str, content: &str) -> Result<()> {
        let (content_type, body) = write_file_body(path, content);
        self.request(
            Method::POST,
            "/v1/files",
            Bytes::from(body),
            &content_type,
        )
        .await?;
        debug!(path, "pushed file to workload");
        Ok(())
    }

    async fn restart(&self, service: &str) -> Result<()> {
        self.post(
            "/v1/services",
            json!({"action": "restart", "services": [service]}),
        )
        .await?;
        debug!(service, "restart requested");
        Ok(())
    }

    async fn add_layer(&self, label: &str, layer: &Layer) -> Result<()> {
        let body = add_layer_body(label, layer)?;
        self.post("/v1/layers", body).await?;
        debug!(label, "layer added");
        Ok(())
    }

    async fn replan(&self) -> Result<()> {
        self.post("/v1/services", json!({"action": "replan"})).await?;
        debug!("replan requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pebble::h2o_layer;

    #[test]
    fn socket_path_follows_platform_layout() {
        let client = PebbleClient::for_container("h2o-http");
        assert_eq!(
            client.socket,
            PathBuf::from("/charm/containers/h2o-http/pebble.socket")
        );
    }

    #[test]
    fn add_layer_body_embeds_yaml_layer() {
        let body = add_layer_body("h2o-http", &h2o_layer()).unwrap();
        assert_eq!(body["action"], "add");
        assert_eq!(body["combine"], true);
        assert_eq!(body["label"], "h2o-http");
        assert_eq!(body["format"], "yaml");

        let embedded: Layer = serde_yaml::from_str(body["layer"].as_str().unwrap()).unwrap();
        assert_eq!(embedded, h2o_layer());
    }

    #[test]
    fn write_file_body_carries_metadata_and_content() {
        let (content_type, body) = write_file_body("/home/h2o/h2o.conf", "hosts: {}\n");
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert!(body.contains("\"action\":\"write\""));
        assert!(body.contains("\"make-dirs\":true"));
        assert!(body.contains("filename=\"/home/h2o/h2o.conf\""));
        assert!(body.contains("hosts: {}"));
        assert!(body.ends_with(&format!("--{MULTIPART_BOUNDARY}--\r\n")));
    }

    #[test]
    fn error_envelope_maps_to_pebble_error() {
        let envelope: Envelope = serde_json::from_value(serde_json::json!({
            "type": "error",
            "status-code": 400,
            "status": "Bad Request",
            "result": {"message": "invalid service name"},
        }))
        .unwrap();
        assert_eq!(envelope.status_code, 400);
        assert_eq!(envelope.result["message"], "invalid service name");
    }
}
