//! Per-session question CRUD, including the asymmetric bulk operations:
//! bulk create is all-or-nothing, bulk delete is best-effort.

use std::sync::Arc;

use scorecard_core::{
  question::{NewQuestion, Question, QuestionPatch},
  store::EvalStore,
};
use uuid::Uuid;

use crate::error::QuestionError;

pub struct QuestionService<S> {
  store: Arc<S>,
}

impl<S: EvalStore> QuestionService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  // ── Validation ────────────────────────────────────────────────────────────

  async fn validate_session(&self, session_id: Uuid) -> Result<(), QuestionError> {
    self
      .store
      .get_session(session_id)
      .await
      .map_err(|e| QuestionError::store("validate session for", e))?
      .ok_or(QuestionError::SessionNotFound(session_id))?;
    Ok(())
  }

  async fn validate_session_question(
    &self,
    session_id: Uuid,
    question_id: Uuid,
  ) -> Result<Question, QuestionError> {
    self.validate_session(session_id).await?;
    let question = self
      .store
      .get_question(question_id)
      .await
      .map_err(|e| QuestionError::store("validate", e))?
      .ok_or(QuestionError::NotFound(question_id))?;
    if question.session_id != session_id {
      return Err(QuestionError::NotFound(question_id));
    }
    Ok(question)
  }

  // ── CRUD ──────────────────────────────────────────────────────────────────

  pub async fn create_question(
    &self,
    session_id: Uuid,
    new: NewQuestion,
  ) -> Result<Question, QuestionError> {
    self.validate_session(session_id).await?;
    let question = self
      .store
      .insert_question(session_id, new)
      .await
      .map_err(|e| QuestionError::store("create", e))?;
    tracing::info!(session = %session_id, question = %question.question_id, "created question");
    Ok(question)
  }

  /// Create all questions in one transaction; any failure rolls back the
  /// whole batch.
  pub async fn create_questions_bulk(
    &self,
    session_id: Uuid,
    new: Vec<NewQuestion>,
  ) -> Result<Vec<Question>, QuestionError> {
    self.validate_session(session_id).await?;
    let questions = self
      .store
      .insert_questions(session_id, new)
      .await
      .map_err(|e| QuestionError::store("bulk create", e))?;
    tracing::info!(session = %session_id, count = questions.len(), "created questions in bulk");
    Ok(questions)
  }

  pub async fn get_session_questions(
    &self,
    session_id: Uuid,
  ) -> Result<Vec<Question>, QuestionError> {
    self.validate_session(session_id).await?;
    let questions = self
      .store
      .list_session_questions(session_id)
      .await
      .map_err(|e| QuestionError::store("list", e))?;
    tracing::info!(session = %session_id, count = questions.len(), "retrieved questions");
    Ok(questions)
  }

  pub async fn update_question(
    &self,
    session_id: Uuid,
    question_id: Uuid,
    patch: QuestionPatch,
  ) -> Result<Question, QuestionError> {
    self
      .validate_session_question(session_id, question_id)
      .await?;
    self
      .store
      .update_question(question_id, patch)
      .await
      .map_err(|e| QuestionError::store("update", e))?
      .ok_or(QuestionError::NotFound(question_id))
  }

  pub async fn delete_question(
    &self,
    session_id: Uuid,
    question_id: Uuid,
  ) -> Result<Question, QuestionError> {
    let question = self
      .validate_session_question(session_id, question_id)
      .await?;
    self
      .store
      .delete_question(question_id)
      .await
      .map_err(|e| QuestionError::store("delete", e))?;
    tracing::warn!(question = %question_id, session = %session_id, "deleted question");
    Ok(question)
  }

  /// Delete a set of questions, tolerating ids that do not resolve.
  ///
  /// Unlike bulk create, each id is validated independently: an id that is
  /// unknown or belongs to another session is skipped with a warning rather
  /// than aborting the batch. Only the validated subset is deleted and
  /// returned. A missing session still fails the whole call.
  pub async fn delete_questions_bulk(
    &self,
    session_id: Uuid,
    question_ids: Vec<Uuid>,
  ) -> Result<Vec<Question>, QuestionError> {
    let mut doomed = Vec::new();
    for question_id in question_ids {
      match self
        .validate_session_question(session_id, question_id)
        .await
      {
        Ok(question) => doomed.push(question),
        Err(QuestionError::NotFound(_)) => {
          tracing::warn!(
            question = %question_id,
            session = %session_id,
            "question not found in session, skipping",
          );
        }
        Err(e) => return Err(e),
      }
    }

    if doomed.is_empty() {
      return Ok(Vec::new());
    }

    self
      .store
      .delete_questions(doomed.iter().map(|q| q.question_id).collect())
      .await
      .map_err(|e| QuestionError::store("bulk delete", e))?;
    tracing::warn!(session = %session_id, count = doomed.len(), "deleted questions in bulk");
    Ok(doomed)
  }

  pub async fn delete_session_questions(
    &self,
    session_id: Uuid,
  ) -> Result<Vec<Question>, QuestionError> {
    self.validate_session(session_id).await?;
    let questions = self
      .store
      .list_session_questions(session_id)
      .await
      .map_err(|e| QuestionError::store("list", e))?;
    self
      .store
      .delete_questions(questions.iter().map(|q| q.question_id).collect())
      .await
      .map_err(|e| QuestionError::store("delete", e))?;
    tracing::warn!(session = %session_id, count = questions.len(), "deleted all session questions");
    Ok(questions)
  }
}
