//! [`LangserveClient`] — the HTTP implementation of [`ChainHost`] against a
//! LangServe-style service.
//!
//! Chain files live in a local directory the host serves from; each file
//! `<name>.py` is mounted at the route `/<name>`. The two remote operations
//! are `POST /<name>/batch` and `GET /<name>/config_schema`.

use std::{path::PathBuf, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::host::{ChainHost, HostError};

/// Connection settings for the chain host.
#[derive(Debug, Clone)]
pub struct LangserveConfig {
  pub base_url:   String,
  pub chains_dir: PathBuf,
}

/// HTTP client for the chain host.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct LangserveClient {
  client: Client,
  config: LangserveConfig,
}

impl LangserveClient {
  pub fn new(config: LangserveConfig) -> Result<Self, HostError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn route_url(&self, file_name: &str, endpoint: &str) -> String {
    let route = file_name.strip_suffix(".py").unwrap_or(file_name);
    format!(
      "{}/{route}/{endpoint}",
      self.config.base_url.trim_end_matches('/'),
    )
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct BatchRequest {
  inputs: Vec<String>,
  config: BatchConfig,
  kwargs: Map<String, Value>,
}

#[derive(Serialize)]
struct BatchConfig {
  configurable: Map<String, Value>,
}

#[derive(Deserialize)]
struct BatchResponse {
  output: Vec<String>,
}

// ─── ChainHost impl ──────────────────────────────────────────────────────────

impl ChainHost for LangserveClient {
  async fn available_chains(&self) -> Result<Vec<String>, HostError> {
    let dir = &self.config.chains_dir;
    if !dir.is_dir() {
      return Err(HostError::DirectoryMissing(dir.clone()));
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      if !entry.file_type().await?.is_file() {
        continue;
      }
      let name = entry.file_name();
      let Some(name) = name.to_str() else { continue };
      if name.ends_with(".py") {
        files.push(name.to_owned());
      }
    }
    files.sort();

    tracing::debug!(count = files.len(), dir = %dir.display(), "scanned chains directory");
    Ok(files)
  }

  async fn batch_invoke(
    &self,
    file_name: &str,
    inputs: Vec<String>,
    configurable: Map<String, Value>,
  ) -> Result<Vec<String>, HostError> {
    let request = BatchRequest {
      inputs,
      config: BatchConfig { configurable },
      kwargs: Map::new(),
    };

    let response = self
      .client
      .post(self.route_url(file_name, "batch"))
      .json(&request)
      .send()
      .await?;
    if !response.status().is_success() {
      return Err(HostError::Status(response.status().as_u16()));
    }

    let body: BatchResponse = response
      .json()
      .await
      .map_err(|e| HostError::Malformed(e.to_string()))?;
    Ok(body.output)
  }

  async fn config_schema(&self, file_name: &str) -> Result<Value, HostError> {
    let response = self
      .client
      .get(self.route_url(file_name, "config_schema"))
      .send()
      .await?;
    if !response.status().is_success() {
      return Err(HostError::Status(response.status().as_u16()));
    }

    response
      .json()
      .await
      .map_err(|e| HostError::Malformed(e.to_string()))
  }
}
