//! Session lifecycle — the root of the entity hierarchy.

use std::sync::Arc;

use scorecard_core::{
  session::{NewSession, Session, SessionPatch},
  store::{EvalStore, ListQuery},
};
use uuid::Uuid;

use crate::error::SessionError;

pub struct SessionService<S> {
  store: Arc<S>,
}

impl<S: EvalStore> SessionService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Create a new evaluation session.
  pub async fn create_session(
    &self,
    new: NewSession,
  ) -> Result<Session, SessionError> {
    let session = self
      .store
      .insert_session(new)
      .await
      .map_err(|e| SessionError::store("create", e))?;
    tracing::info!(session = %session.session_id, name = %session.name, "created session");
    Ok(session)
  }

  /// List sessions, most recently modified first.
  pub async fn get_sessions(
    &self,
    skip: usize,
    limit: Option<usize>,
  ) -> Result<Vec<Session>, SessionError> {
    let sessions = self
      .store
      .list_sessions(ListQuery {
        skip,
        limit,
        order_by: Some("last_modified".to_owned()),
        ascending: false,
      })
      .await
      .map_err(|e| SessionError::store("list", e))?;
    tracing::info!(count = sessions.len(), "retrieved sessions");
    Ok(sessions)
  }

  pub async fn get_session_by_id(
    &self,
    session_id: Uuid,
  ) -> Result<Session, SessionError> {
    self
      .store
      .get_session(session_id)
      .await
      .map_err(|e| SessionError::store("fetch", e))?
      .ok_or(SessionError::NotFound(session_id))
  }

  pub async fn update_session(
    &self,
    session_id: Uuid,
    patch: SessionPatch,
  ) -> Result<Session, SessionError> {
    self
      .store
      .update_session(session_id, patch)
      .await
      .map_err(|e| SessionError::store("update", e))?
      .ok_or(SessionError::NotFound(session_id))
  }

  /// Delete a session and, via the store's cascades, everything it owns.
  pub async fn delete_session(
    &self,
    session_id: Uuid,
  ) -> Result<Session, SessionError> {
    let session = self.get_session_by_id(session_id).await?;
    self
      .store
      .delete_session(session_id)
      .await
      .map_err(|e| SessionError::store("delete", e))?;
    tracing::warn!(session = %session_id, "deleted session");
    Ok(session)
  }
}
