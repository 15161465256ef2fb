//! The `ChainHost` trait and its error type.
//!
//! The chain host is the external system that owns the executable chain
//! pipelines: a directory of chain files plus an HTTP service that runs them
//! and publishes their configuration schemas. The service layer depends on
//! this abstraction, not on any concrete transport; [`crate::LangserveClient`]
//! is the production implementation.

use std::{future::Future, path::PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum HostError {
  #[error("chains directory not found: {0}")]
  DirectoryMissing(PathBuf),

  #[error("failed to scan chains directory: {0}")]
  Scan(#[from] std::io::Error),

  #[error("chain host request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("chain host returned status {0}")]
  Status(u16),

  #[error("malformed chain host response: {0}")]
  Malformed(String),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the chain-hosting collaborator.
///
/// `file_name` is always a name from [`available_chains`]; how it maps to a
/// hosted route is the implementation's business.
///
/// [`available_chains`]: ChainHost::available_chains
pub trait ChainHost: Send + Sync {
  /// List the chain files currently hosted. Refreshed on every call — the
  /// result is ground truth for chain selection, never cached.
  fn available_chains(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, HostError>> + Send + '_;

  /// Run one batched invocation: every input is submitted in a single
  /// request and the outputs come back positionally aligned with the
  /// inputs. Alignment is the caller's invariant to check.
  fn batch_invoke<'a>(
    &'a self,
    file_name: &'a str,
    inputs: Vec<String>,
    configurable: Map<String, Value>,
  ) -> impl Future<Output = Result<Vec<String>, HostError>> + Send + 'a;

  /// Fetch the configuration schema the host publishes for a chain.
  fn config_schema<'a>(
    &'a self,
    file_name: &'a str,
  ) -> impl Future<Output = Result<Value, HostError>> + Send + 'a;
}
