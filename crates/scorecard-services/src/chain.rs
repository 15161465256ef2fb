//! Chain selection and batch invocation.
//!
//! Chains are never executed in-process: selection attaches host-listed file
//! names to a session, and invocation forwards one batched request to the
//! chain host, then persists the generated answers.

use std::{collections::HashSet, sync::Arc};

use scorecard_core::{
  answer::{Answer, NewAnswer},
  chain::Chain,
  store::EvalStore,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{error::ChainError, host::ChainHost};

pub struct ChainService<S, H> {
  store: Arc<S>,
  host:  Arc<H>,
}

impl<S: EvalStore, H: ChainHost> ChainService<S, H> {
  pub fn new(store: Arc<S>, host: Arc<H>) -> Self {
    Self { store, host }
  }

  // ── Validation ────────────────────────────────────────────────────────────

  async fn validate_session(&self, session_id: Uuid) -> Result<(), ChainError> {
    self
      .store
      .get_session(session_id)
      .await
      .map_err(|e| ChainError::store("validate session for", e))?
      .ok_or(ChainError::SessionNotFound(session_id))?;
    Ok(())
  }

  /// Check that the chain exists and belongs to the session. A chain owned
  /// by another session is reported as not found, not as a mismatch.
  async fn validate_session_chain(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
  ) -> Result<Chain, ChainError> {
    self.validate_session(session_id).await?;
    let chain = self
      .store
      .get_chain(chain_id)
      .await
      .map_err(|e| ChainError::store("validate", e))?
      .ok_or(ChainError::NotFound(chain_id))?;
    if chain.session_id != session_id {
      return Err(ChainError::NotFound(chain_id));
    }
    Ok(chain)
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  /// List the chain files the host currently serves. Always a live listing.
  pub async fn get_available_chains(&self) -> Result<Vec<String>, ChainError> {
    Ok(self.host.available_chains().await?)
  }

  /// Attach chain files to a session.
  ///
  /// Every requested file must be in the host's available set. Files already
  /// attached to the session (or repeated within the request) are silently
  /// skipped; only the newly created chains are returned, and an empty
  /// result is success, not an error.
  pub async fn select_chains(
    &self,
    session_id: Uuid,
    file_names: Vec<String>,
  ) -> Result<Vec<Chain>, ChainError> {
    self.validate_session(session_id).await?;

    let available = self.host.available_chains().await?;
    let unknown: Vec<String> = file_names
      .iter()
      .filter(|f| !available.contains(f))
      .cloned()
      .collect();
    if !unknown.is_empty() {
      return Err(ChainError::UnknownFiles(unknown));
    }

    let mut seen: HashSet<String> = self
      .store
      .list_session_chains(session_id)
      .await
      .map_err(|e| ChainError::store("list", e))?
      .into_iter()
      .map(|c| c.file_name)
      .collect();

    let requested = file_names.len();
    let new_files: Vec<String> = file_names
      .into_iter()
      .filter(|f| seen.insert(f.clone()))
      .collect();

    if new_files.is_empty() {
      tracing::info!(session = %session_id, "no new chain files to add");
      return Ok(Vec::new());
    }

    let chains = self
      .store
      .insert_chains(session_id, new_files)
      .await
      .map_err(|e| ChainError::store("create", e))?;
    tracing::info!(
      session = %session_id,
      added = chains.len(),
      skipped = requested - chains.len(),
      "selected chains",
    );
    Ok(chains)
  }

  // ── Scoped CRUD ───────────────────────────────────────────────────────────

  pub async fn get_session_chains(
    &self,
    session_id: Uuid,
  ) -> Result<Vec<Chain>, ChainError> {
    self.validate_session(session_id).await?;
    let chains = self
      .store
      .list_session_chains(session_id)
      .await
      .map_err(|e| ChainError::store("list", e))?;
    tracing::info!(session = %session_id, count = chains.len(), "retrieved chains");
    Ok(chains)
  }

  pub async fn get_chain_by_id(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
  ) -> Result<Chain, ChainError> {
    self.validate_session_chain(session_id, chain_id).await
  }

  pub async fn delete_session_chain(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
  ) -> Result<Chain, ChainError> {
    let chain = self.validate_session_chain(session_id, chain_id).await?;
    self
      .store
      .delete_chain(chain_id)
      .await
      .map_err(|e| ChainError::store("delete", e))?;
    tracing::warn!(chain = %chain_id, session = %session_id, "deleted chain");
    Ok(chain)
  }

  pub async fn delete_session_chains(
    &self,
    session_id: Uuid,
  ) -> Result<Vec<Chain>, ChainError> {
    self.validate_session(session_id).await?;
    let chains = self
      .store
      .list_session_chains(session_id)
      .await
      .map_err(|e| ChainError::store("list", e))?;
    self
      .store
      .delete_session_chains(session_id)
      .await
      .map_err(|e| ChainError::store("delete", e))?;
    tracing::warn!(session = %session_id, count = chains.len(), "deleted all session chains");
    Ok(chains)
  }

  // ── Invocation ────────────────────────────────────────────────────────────

  /// Run a chain over every question in the session and persist one answer
  /// per question.
  ///
  /// The host receives all question texts plus the configuration's values in
  /// a single batched call and must return outputs positionally aligned with
  /// the inputs. The network call and the answer insert are separate steps:
  /// if the insert fails after a successful invocation, the generated text
  /// is lost and the caller must re-invoke.
  pub async fn invoke_chain_batch(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
    configuration_id: Uuid,
  ) -> Result<Vec<Answer>, ChainError> {
    let chain = self.validate_session_chain(session_id, chain_id).await?;

    let questions = self
      .store
      .list_session_questions(session_id)
      .await
      .map_err(|e| ChainError::store("list questions for", e))?;
    if questions.is_empty() {
      tracing::info!(session = %session_id, chain = %chain_id, "no questions to invoke chain on");
      return Ok(Vec::new());
    }

    let configuration = self
      .store
      .get_configuration(configuration_id)
      .await
      .map_err(|e| ChainError::store("fetch configuration for", e))?
      .ok_or(ChainError::ConfigurationNotFound(configuration_id))?;
    if configuration.chain_id != chain_id {
      return Err(ChainError::ConfigurationNotFound(configuration_id));
    }

    let inputs: Vec<String> =
      questions.iter().map(|q| q.question_text.clone()).collect();
    let configurable: Map<String, Value> = match configuration.config_values {
      Some(Value::Object(map)) => map,
      _ => Map::new(),
    };

    let outputs = self
      .host
      .batch_invoke(&chain.file_name, inputs, configurable)
      .await?;
    if outputs.len() != questions.len() {
      return Err(ChainError::OutputMismatch {
        expected: questions.len(),
        got:      outputs.len(),
      });
    }

    let rows: Vec<(Uuid, NewAnswer)> = questions
      .iter()
      .zip(outputs)
      .map(|(question, generated_answer)| {
        (question.question_id, NewAnswer {
          chain_id,
          configuration_id,
          generated_answer,
          score: None,
        })
      })
      .collect();

    let answers = self
      .store
      .insert_answers(rows)
      .await
      .map_err(|e| ChainError::store("create answers for", e))?;
    tracing::info!(
      session = %session_id,
      chain = %chain_id,
      configuration = %configuration_id,
      count = answers.len(),
      "chain invocation generated answers",
    );
    Ok(answers)
  }
}
