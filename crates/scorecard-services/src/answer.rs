//! Answer CRUD, score updates, average-score aggregation, and reviewer
//! comments.
//!
//! An answer references a chain, a question, and a configuration; dangling
//! references surface as the referenced family's NotFound kind, so callers
//! of this service handle `ChainNotFound`, `QuestionNotFound`, and
//! `ConfigurationNotFound` alongside the answer's own kinds.

use std::{collections::BTreeSet, sync::Arc};

use scorecard_core::{
  answer::{
    Answer, AnswerComment, CommentPatch, NewAnswer, NewComment, Score,
    ScoreUpdate,
  },
  store::EvalStore,
};
use uuid::Uuid;

use crate::error::AnswerError;

pub struct AnswerService<S> {
  store: Arc<S>,
}

impl<S: EvalStore> AnswerService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  // ── Validation ────────────────────────────────────────────────────────────

  /// Check that each id given actually resolves, raising the missing
  /// family's NotFound kind. Ids not given are not checked.
  async fn validate_references(
    &self,
    chain_id: Option<Uuid>,
    question_id: Option<Uuid>,
    configuration_id: Option<Uuid>,
  ) -> Result<(), AnswerError> {
    if let Some(chain_id) = chain_id {
      self
        .store
        .get_chain(chain_id)
        .await
        .map_err(|e| AnswerError::store("validate chain for", e))?
        .ok_or(AnswerError::ChainNotFound(chain_id))?;
    }
    if let Some(question_id) = question_id {
      self
        .store
        .get_question(question_id)
        .await
        .map_err(|e| AnswerError::store("validate question for", e))?
        .ok_or(AnswerError::QuestionNotFound(question_id))?;
    }
    if let Some(configuration_id) = configuration_id {
      self
        .store
        .get_configuration(configuration_id)
        .await
        .map_err(|e| AnswerError::store("validate configuration for", e))?
        .ok_or(AnswerError::ConfigurationNotFound(configuration_id))?;
    }
    Ok(())
  }

  /// Check that the answer exists and belongs to the question. An answer
  /// owned by another question is reported as not found.
  async fn validate_question_answer(
    &self,
    question_id: Uuid,
    answer_id: Uuid,
  ) -> Result<Answer, AnswerError> {
    self
      .validate_references(None, Some(question_id), None)
      .await?;
    let answer = self
      .store
      .get_answer(answer_id)
      .await
      .map_err(|e| AnswerError::store("validate", e))?
      .ok_or(AnswerError::NotFound(answer_id))?;
    if answer.question_id != question_id {
      return Err(AnswerError::NotFound(answer_id));
    }
    Ok(answer)
  }

  // ── CRUD ──────────────────────────────────────────────────────────────────

  pub async fn create_answer(
    &self,
    question_id: Uuid,
    new: NewAnswer,
  ) -> Result<Answer, AnswerError> {
    self
      .validate_references(
        Some(new.chain_id),
        Some(question_id),
        Some(new.configuration_id),
      )
      .await?;
    let answer = self
      .store
      .insert_answer(question_id, new)
      .await
      .map_err(|e| AnswerError::store("create", e))?;
    tracing::info!(
      question = %question_id,
      chain = %answer.chain_id,
      configuration = %answer.configuration_id,
      "created answer",
    );
    Ok(answer)
  }

  /// Create multiple answers for one question in a single transaction.
  ///
  /// The question is validated once, and the union of distinct chain and
  /// configuration ids across the batch is validated once per id. Any
  /// dangling reference fails the whole batch before the insert; the insert
  /// itself is all-or-nothing.
  pub async fn create_answers_bulk(
    &self,
    question_id: Uuid,
    new: Vec<NewAnswer>,
  ) -> Result<Vec<Answer>, AnswerError> {
    self
      .validate_references(None, Some(question_id), None)
      .await?;

    let chain_ids: BTreeSet<Uuid> = new.iter().map(|a| a.chain_id).collect();
    let configuration_ids: BTreeSet<Uuid> =
      new.iter().map(|a| a.configuration_id).collect();
    for chain_id in chain_ids {
      self.validate_references(Some(chain_id), None, None).await?;
    }
    for configuration_id in configuration_ids {
      self
        .validate_references(None, None, Some(configuration_id))
        .await?;
    }

    let rows: Vec<(Uuid, NewAnswer)> =
      new.into_iter().map(|a| (question_id, a)).collect();
    let answers = self
      .store
      .insert_answers(rows)
      .await
      .map_err(|e| AnswerError::store("bulk create", e))?;
    tracing::info!(question = %question_id, count = answers.len(), "created answers in bulk");
    Ok(answers)
  }

  pub async fn get_answers_by_question(
    &self,
    question_id: Uuid,
  ) -> Result<Vec<Answer>, AnswerError> {
    self
      .validate_references(None, Some(question_id), None)
      .await?;
    let answers = self
      .store
      .list_question_answers(question_id)
      .await
      .map_err(|e| AnswerError::store("list", e))?;
    tracing::info!(question = %question_id, count = answers.len(), "retrieved answers");
    Ok(answers)
  }

  pub async fn get_answers_by_configuration(
    &self,
    configuration_id: Uuid,
  ) -> Result<Vec<Answer>, AnswerError> {
    self
      .validate_references(None, None, Some(configuration_id))
      .await?;
    let answers = self
      .store
      .list_configuration_answers(configuration_id)
      .await
      .map_err(|e| AnswerError::store("list", e))?;
    tracing::info!(
      configuration = %configuration_id,
      count = answers.len(),
      "retrieved answers",
    );
    Ok(answers)
  }

  // ── Scoring ───────────────────────────────────────────────────────────────

  /// Arithmetic mean over the configuration's scored answers.
  ///
  /// Returns exactly `0.0` when no answer has a score — a sentinel, not an
  /// absence signal; callers must not conflate it with a real average of
  /// zero.
  pub async fn get_average_score_by_configuration(
    &self,
    configuration_id: Uuid,
  ) -> Result<f64, AnswerError> {
    self
      .validate_references(None, None, Some(configuration_id))
      .await?;
    let answers = self
      .store
      .list_configuration_answers(configuration_id)
      .await
      .map_err(|e| AnswerError::store("list", e))?;

    let scores: Vec<u8> = answers
      .iter()
      .filter_map(|a| a.score.map(Score::value))
      .collect();
    if scores.is_empty() {
      tracing::info!(configuration = %configuration_id, "no scored answers");
      return Ok(0.0);
    }

    let total: u32 = scores.iter().copied().map(u32::from).sum();
    let average = f64::from(total) / scores.len() as f64;
    tracing::info!(
      configuration = %configuration_id,
      average,
      scored = scores.len(),
      total_answers = answers.len(),
      "computed average score",
    );
    Ok(average)
  }

  /// Update an answer's score; only the score field is mutable.
  pub async fn update_answer_score(
    &self,
    question_id: Uuid,
    answer_id: Uuid,
    update: ScoreUpdate,
  ) -> Result<Answer, AnswerError> {
    self.validate_question_answer(question_id, answer_id).await?;
    let answer = self
      .store
      .update_answer_score(answer_id, update.score)
      .await
      .map_err(|e| AnswerError::store("update", e))?
      .ok_or(AnswerError::NotFound(answer_id))?;
    tracing::info!(
      answer = %answer_id,
      score = answer.score.map(Score::value),
      "updated answer score",
    );
    Ok(answer)
  }

  // ── Deletion ──────────────────────────────────────────────────────────────

  pub async fn delete_answer(
    &self,
    question_id: Uuid,
    answer_id: Uuid,
  ) -> Result<Answer, AnswerError> {
    let answer = self.validate_question_answer(question_id, answer_id).await?;
    self
      .store
      .delete_answer(answer_id)
      .await
      .map_err(|e| AnswerError::store("delete", e))?;
    tracing::warn!(answer = %answer_id, "deleted answer");
    Ok(answer)
  }

  pub async fn delete_answers_by_question(
    &self,
    question_id: Uuid,
  ) -> Result<Vec<Answer>, AnswerError> {
    self
      .validate_references(None, Some(question_id), None)
      .await?;
    let answers = self
      .store
      .list_question_answers(question_id)
      .await
      .map_err(|e| AnswerError::store("list", e))?;
    self
      .store
      .delete_question_answers(question_id)
      .await
      .map_err(|e| AnswerError::store("delete", e))?;
    tracing::warn!(question = %question_id, count = answers.len(), "deleted question answers");
    Ok(answers)
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn validate_answer_comment(
    &self,
    answer_id: Uuid,
    comment_id: Uuid,
  ) -> Result<AnswerComment, AnswerError> {
    self.validate_answer(answer_id).await?;
    let comment = self
      .store
      .get_comment(comment_id)
      .await
      .map_err(|e| AnswerError::store("validate comment for", e))?
      .ok_or(AnswerError::CommentNotFound(comment_id))?;
    if comment.answer_id != answer_id {
      return Err(AnswerError::CommentNotFound(comment_id));
    }
    Ok(comment)
  }

  async fn validate_answer(&self, answer_id: Uuid) -> Result<(), AnswerError> {
    self
      .store
      .get_answer(answer_id)
      .await
      .map_err(|e| AnswerError::store("validate", e))?
      .ok_or(AnswerError::NotFound(answer_id))?;
    Ok(())
  }

  pub async fn create_answer_comment(
    &self,
    answer_id: Uuid,
    new: NewComment,
  ) -> Result<AnswerComment, AnswerError> {
    self.validate_answer(answer_id).await?;
    let comment = self
      .store
      .insert_comment(answer_id, new)
      .await
      .map_err(|e| AnswerError::store("create comment for", e))?;
    tracing::info!(answer = %answer_id, comment = %comment.comment_id, "created comment");
    Ok(comment)
  }

  pub async fn get_answer_comments(
    &self,
    answer_id: Uuid,
  ) -> Result<Vec<AnswerComment>, AnswerError> {
    self.validate_answer(answer_id).await?;
    self
      .store
      .list_answer_comments(answer_id)
      .await
      .map_err(|e| AnswerError::store("list comments for", e))
  }

  pub async fn update_answer_comment(
    &self,
    answer_id: Uuid,
    comment_id: Uuid,
    patch: CommentPatch,
  ) -> Result<AnswerComment, AnswerError> {
    self.validate_answer_comment(answer_id, comment_id).await?;
    self
      .store
      .update_comment(comment_id, patch)
      .await
      .map_err(|e| AnswerError::store("update comment for", e))?
      .ok_or(AnswerError::CommentNotFound(comment_id))
  }

  pub async fn delete_answer_comment(
    &self,
    answer_id: Uuid,
    comment_id: Uuid,
  ) -> Result<AnswerComment, AnswerError> {
    let comment = self.validate_answer_comment(answer_id, comment_id).await?;
    self
      .store
      .delete_comment(comment_id)
      .await
      .map_err(|e| AnswerError::store("delete comment for", e))?;
    tracing::warn!(comment = %comment_id, answer = %answer_id, "deleted comment");
    Ok(comment)
  }
}
