//! Per-chain configuration CRUD and remote schema fetch.

use std::sync::Arc;

use scorecard_core::{
  chain::Chain,
  configuration::{Configuration, ConfigurationPatch, NewConfiguration},
  store::EvalStore,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{error::ConfigurationError, host::ChainHost};

pub struct ConfigurationService<S, H> {
  store: Arc<S>,
  host:  Arc<H>,
}

impl<S: EvalStore, H: ChainHost> ConfigurationService<S, H> {
  pub fn new(store: Arc<S>, host: Arc<H>) -> Self {
    Self { store, host }
  }

  // ── Validation ────────────────────────────────────────────────────────────

  async fn validate_session(
    &self,
    session_id: Uuid,
  ) -> Result<(), ConfigurationError> {
    self
      .store
      .get_session(session_id)
      .await
      .map_err(|e| ConfigurationError::store("validate session for", e))?
      .ok_or(ConfigurationError::SessionNotFound(session_id))?;
    Ok(())
  }

  async fn validate_session_chain(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
  ) -> Result<Chain, ConfigurationError> {
    self.validate_session(session_id).await?;
    let chain = self
      .store
      .get_chain(chain_id)
      .await
      .map_err(|e| ConfigurationError::store("validate chain for", e))?
      .ok_or(ConfigurationError::ChainNotFound(chain_id))?;
    if chain.session_id != session_id {
      return Err(ConfigurationError::ChainNotFound(chain_id));
    }
    Ok(chain)
  }

  async fn validate_session_configuration(
    &self,
    session_id: Uuid,
    configuration_id: Uuid,
  ) -> Result<Configuration, ConfigurationError> {
    self.validate_session(session_id).await?;
    let configuration = self
      .store
      .get_configuration(configuration_id)
      .await
      .map_err(|e| ConfigurationError::store("validate", e))?
      .ok_or(ConfigurationError::NotFound(configuration_id))?;
    if configuration.session_id != session_id {
      return Err(ConfigurationError::NotFound(configuration_id));
    }
    Ok(configuration)
  }

  // ── CRUD ──────────────────────────────────────────────────────────────────

  /// Create a configuration for a chain.
  ///
  /// When the payload carries no `config_schema`, the chain host is asked
  /// for one so the row caches it. A host failure here only costs the cached
  /// schema — the configuration is still created.
  pub async fn create_configuration(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
    mut new: NewConfiguration,
  ) -> Result<Configuration, ConfigurationError> {
    let chain = self.validate_session_chain(session_id, chain_id).await?;

    if new.config_schema.is_none() {
      match self.host.config_schema(&chain.file_name).await {
        Ok(schema) => new.config_schema = Some(schema),
        Err(e) => {
          tracing::warn!(chain = %chain_id, error = %e, "could not cache chain schema");
        }
      }
    }

    let configuration = self
      .store
      .insert_configuration(session_id, chain_id, new)
      .await
      .map_err(|e| ConfigurationError::store("create", e))?;
    tracing::info!(
      session = %session_id,
      chain = %chain_id,
      configuration = %configuration.configuration_id,
      "created configuration",
    );
    Ok(configuration)
  }

  /// Fetch the live configuration schema for a chain from the host.
  ///
  /// A missing session or chain is a NotFound; a host failure is a distinct
  /// downstream error.
  pub async fn get_chain_schema(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
  ) -> Result<Value, ConfigurationError> {
    let chain = self.validate_session_chain(session_id, chain_id).await?;
    self
      .host
      .config_schema(&chain.file_name)
      .await
      .map_err(ConfigurationError::Schema)
  }

  pub async fn get_session_configurations(
    &self,
    session_id: Uuid,
  ) -> Result<Vec<Configuration>, ConfigurationError> {
    self.validate_session(session_id).await?;
    let configurations = self
      .store
      .list_session_configurations(session_id)
      .await
      .map_err(|e| ConfigurationError::store("list", e))?;
    tracing::info!(
      session = %session_id,
      count = configurations.len(),
      "retrieved configurations",
    );
    Ok(configurations)
  }

  pub async fn get_chain_configurations(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
  ) -> Result<Vec<Configuration>, ConfigurationError> {
    self.validate_session_chain(session_id, chain_id).await?;
    self
      .store
      .list_chain_configurations(chain_id)
      .await
      .map_err(|e| ConfigurationError::store("list", e))
  }

  pub async fn get_configuration_by_id(
    &self,
    session_id: Uuid,
    configuration_id: Uuid,
  ) -> Result<Configuration, ConfigurationError> {
    self
      .validate_session_configuration(session_id, configuration_id)
      .await
  }

  pub async fn update_configuration(
    &self,
    session_id: Uuid,
    configuration_id: Uuid,
    patch: ConfigurationPatch,
  ) -> Result<Configuration, ConfigurationError> {
    self
      .validate_session_configuration(session_id, configuration_id)
      .await?;
    self
      .store
      .update_configuration(configuration_id, patch)
      .await
      .map_err(|e| ConfigurationError::store("update", e))?
      .ok_or(ConfigurationError::NotFound(configuration_id))
  }

  pub async fn delete_configuration(
    &self,
    session_id: Uuid,
    configuration_id: Uuid,
  ) -> Result<Configuration, ConfigurationError> {
    let configuration = self
      .validate_session_configuration(session_id, configuration_id)
      .await?;
    self
      .store
      .delete_configuration(configuration_id)
      .await
      .map_err(|e| ConfigurationError::store("delete", e))?;
    tracing::warn!(
      configuration = %configuration_id,
      session = %session_id,
      "deleted configuration",
    );
    Ok(configuration)
  }
}
