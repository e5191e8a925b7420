//! [`ContainerApi`] over the LXD REST API.
//!
//! Every daemon reply is a JSON envelope (`type` = `sync` | `async` | `error`).
//! Asynchronous replies point at a background operation, which is awaited
//! through `/1.0/operations/<id>/wait` before the call returns, so callers
//! always observe completed state changes.

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use super::api::ContainerApi;
use super::types::{ContainerState, ExecOutput, ImageRecord, StateAction};
use crate::configuration::types::LxdEndpoint;
use crate::error_handling::types::ContainerError;

/// Seconds the daemon is given to carry out a start/stop request.
const STATE_CHANGE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct LxdResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_code: u16,
    #[serde(default)]
    operation: String,
    #[serde(default)]
    metadata: Value,
}

impl LxdResponse {
    fn is_error(&self) -> bool {
        self.kind == "error"
    }
}

#[derive(Debug, Default, Deserialize)]
struct Operation {
    #[serde(default)]
    status: String,
    #[serde(default)]
    status_code: u16,
    #[serde(default)]
    err: String,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    fingerprint: String,
    #[serde(default)]
    architecture: String,
    uploaded_at: DateTime<Utc>,
    #[serde(default)]
    properties: HashMap<String, String>,
}

impl From<RawImage> for ImageRecord {
    fn from(raw: RawImage) -> Self {
        let property = |key: &str| raw.properties.get(key).cloned().unwrap_or_default();
        let architecture = raw
            .properties
            .get("architecture")
            .cloned()
            .unwrap_or_else(|| raw.architecture.clone());
        ImageRecord {
            os: property("os"),
            release: property("release"),
            architecture,
            fingerprint: raw.fingerprint.clone(),
            uploaded_at: raw.uploaded_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExecMetadata {
    #[serde(rename = "return")]
    exit_code: i64,
    #[serde(default)]
    output: HashMap<String, String>,
}

pub struct LxdRestApi {
    client: reqwest::Client,
    base_url: String,
    operation_timeout: Duration,
}

impl LxdRestApi {
    /// Builds a client for `endpoint`. Client certificate files are read here.
    pub fn new(endpoint: &LxdEndpoint, operation_timeout: Duration) -> Result<Self, ContainerError> {
        let builder = reqwest::Client::builder()
            .user_agent(concat!("lazy-lxd/", env!("CARGO_PKG_VERSION")))
            .no_proxy();

        let (builder, base_url) = match endpoint {
            LxdEndpoint::UnixSocket(path) => {
                // the host part is ignored once requests go through the socket
                (builder.unix_socket(path.clone()), "http://lxd".to_string())
            }
            LxdEndpoint::Https {
                url,
                client_cert,
                client_key,
                accept_invalid_certs,
            } => {
                let mut builder = builder.danger_accept_invalid_certs(*accept_invalid_certs);
                if let Some(cert) = client_cert {
                    let mut pem = std::fs::read(cert).map_err(|e| {
                        ContainerError::ConnectionFailed(format!("{}: {}", cert.display(), e))
                    })?;
                    if let Some(key) = client_key {
                        pem.push(b'\n');
                        pem.extend(std::fs::read(key).map_err(|e| {
                            ContainerError::ConnectionFailed(format!("{}: {}", key.display(), e))
                        })?);
                    }
                    builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
                }
                (builder, url.clone())
            }
        };

        Ok(Self {
            client: builder.build()?,
            base_url,
            operation_timeout,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(base_url: &str, operation_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .no_proxy()
                .build()
                .expect("plain client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            operation_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, LxdResponse), ContainerError> {
        debug!("LXD {} {}", method, path);
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let envelope: LxdResponse = response.json().await.map_err(|e| {
            ContainerError::InvalidResponse(format!("{} returned {}: {}", path, status, e))
        })?;
        Ok((status, envelope))
    }

    /// Sends a request and turns error envelopes into [`ContainerError::Api`].
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<LxdResponse, ContainerError> {
        let (status, envelope) = self.request(method, path, body).await?;
        if envelope.is_error() || !status.is_success() {
            return Err(api_error(status, &envelope));
        }
        Ok(envelope)
    }

    /// Waits for the background operation of an `async` reply.
    async fn wait(&self, response: LxdResponse) -> Result<Operation, ContainerError> {
        if response.kind != "async" {
            return Ok(Operation::default());
        }
        let path = format!(
            "{}/wait?timeout={}",
            response.operation,
            self.operation_timeout.as_secs()
        );
        let waited = self.call(Method::GET, &path, None).await?;
        let operation: Operation = serde_json::from_value(waited.metadata)
            .map_err(|e| ContainerError::InvalidResponse(format!("operation: {}", e)))?;

        debug!("Operation {} finished: {}", response.operation, operation.status);
        if operation.status_code >= 400 {
            return Err(ContainerError::Api(if operation.err.is_empty() {
                operation.status
            } else {
                operation.err
            }));
        }
        if operation.status_code < 200 {
            return Err(ContainerError::Api(format!(
                "operation {} did not finish within {}s",
                response.operation,
                self.operation_timeout.as_secs()
            )));
        }
        Ok(operation)
    }

    async fn call_and_wait(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Operation, ContainerError> {
        let response = self.call(method, path, body).await?;
        self.wait(response).await
    }

    /// Raw text of an exec log file.
    async fn fetch_log(&self, path: &str) -> Result<String, ContainerError> {
        let response = self.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(ContainerError::InvalidResponse(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

fn api_error(status: StatusCode, envelope: &LxdResponse) -> ContainerError {
    if envelope.error.is_empty() {
        ContainerError::Api(format!("request failed with status {}", status))
    } else {
        ContainerError::Api(envelope.error.clone())
    }
}

impl ContainerApi for LxdRestApi {
    async fn list_images(&self) -> Result<Vec<ImageRecord>, ContainerError> {
        let response = self.call(Method::GET, "/1.0/images?recursion=1", None).await?;
        let images: Vec<RawImage> = serde_json::from_value(response.metadata)
            .map_err(|e| ContainerError::InvalidResponse(format!("images: {}", e)))?;
        Ok(images.into_iter().map(ImageRecord::from).collect())
    }

    async fn download_image(&self, server: &str, alias: &str) -> Result<(), ContainerError> {
        let body = json!({
            "source": {
                "type": "image",
                "mode": "pull",
                "server": server,
                "protocol": "simplestreams",
                "alias": alias,
            },
            "auto_update": true,
        });
        self.call_and_wait(Method::POST, "/1.0/images", Some(body))
            .await
            .map(|_| ())
    }

    async fn container_exists(&self, name: &str) -> Result<bool, ContainerError> {
        let path = format!("/1.0/containers/{}", name);
        let (status, envelope) = self.request(Method::GET, &path, None).await?;
        if status == StatusCode::NOT_FOUND || envelope.error_code == 404 {
            return Ok(false);
        }
        if envelope.is_error() || !status.is_success() {
            return Err(api_error(status, &envelope));
        }
        Ok(true)
    }

    async fn create_container(&self, name: &str, fingerprint: &str) -> Result<(), ContainerError> {
        let body = json!({
            "name": name,
            "source": { "type": "image", "fingerprint": fingerprint },
        });
        self.call_and_wait(Method::POST, "/1.0/containers", Some(body))
            .await
            .map(|_| ())
    }

    async fn change_state(&self, name: &str, action: StateAction) -> Result<(), ContainerError> {
        let body = json!({
            "action": action.as_str(),
            "timeout": STATE_CHANGE_TIMEOUT_SECS,
            "force": false,
        });
        let path = format!("/1.0/containers/{}/state", name);
        self.call_and_wait(Method::PUT, &path, Some(body))
            .await
            .map(|_| ())
    }

    async fn container_state(&self, name: &str) -> Result<ContainerState, ContainerError> {
        let path = format!("/1.0/containers/{}/state", name);
        let response = self.call(Method::GET, &path, None).await?;
        serde_json::from_value(response.metadata)
            .map_err(|e| ContainerError::InvalidResponse(format!("state: {}", e)))
    }

    async fn delete_container(&self, name: &str) -> Result<(), ContainerError> {
        let path = format!("/1.0/containers/{}", name);
        self.call_and_wait(Method::DELETE, &path, None)
            .await
            .map(|_| ())
    }

    async fn exec(&self, name: &str, command: &[String]) -> Result<ExecOutput, ContainerError> {
        let body = json!({
            "command": command,
            "environment": { "DEBIAN_FRONTEND": "noninteractive" },
            "wait-for-websocket": false,
            "interactive": false,
            "record-output": true,
        });
        let path = format!("/1.0/containers/{}/exec", name);
        let operation = self.call_and_wait(Method::POST, &path, Some(body)).await?;

        let metadata: ExecMetadata =
            serde_json::from_value(operation.metadata.unwrap_or(Value::Null))
                .map_err(|e| ContainerError::InvalidResponse(format!("exec: {}", e)))?;

        let mut output = ExecOutput {
            exit_code: metadata.exit_code,
            ..Default::default()
        };
        if let Some(log) = metadata.output.get("1") {
            output.stdout = self.fetch_log(log).await?;
        }
        if let Some(log) = metadata.output.get("2") {
            output.stderr = self.fetch_log(log).await?;
        }
        Ok(output)
    }

    async fn push_file(
        &self,
        name: &str,
        path: &str,
        content: &[u8],
        mode: u32,
    ) -> Result<(), ContainerError> {
        let url = self.url(&format!("/1.0/containers/{}/files", name));
        debug!("LXD POST {} (path={})", url, path);
        let response = self
            .client
            .post(url)
            .query(&[("path", path)])
            .header("X-LXD-uid", "0")
            .header("X-LXD-gid", "0")
            .header("X-LXD-mode", format!("{:04o}", mode))
            .header("X-LXD-type", "file")
            .header("X-LXD-write", "overwrite")
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await?;
        let status = response.status();
        let envelope: LxdResponse = response.json().await.map_err(|e| {
            ContainerError::InvalidResponse(format!("file push returned {}: {}", status, e))
        })?;
        if envelope.is_error() || !status.is_success() {
            return Err(api_error(status, &envelope));
        }
        Ok(())
    }
}
