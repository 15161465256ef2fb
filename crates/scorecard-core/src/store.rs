//! The `EvalStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `scorecard-store-sqlite`). The service layer depends on this abstraction,
//! not on any concrete backend.
//!
//! Every method is a single commit-or-rollback unit: a bulk insert either
//! lands completely or not at all, and no method spans more than one
//! top-level transaction. Sequences of calls are NOT atomic with respect to
//! each other; callers needing validate-then-write semantics accept the
//! interleaving window.

use std::future::Future;

use uuid::Uuid;

use crate::{
  answer::{Answer, AnswerComment, CommentPatch, NewAnswer, NewComment, Score},
  chain::Chain,
  configuration::{Configuration, ConfigurationPatch, NewConfiguration},
  question::{NewQuestion, Question, QuestionPatch},
  session::{NewSession, Session, SessionPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for paginated listings.
///
/// An `order_by` naming a column the entity does not have falls back to
/// `created_at` with a logged diagnostic; it never fails the call.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
  pub skip:      usize,
  pub limit:     Option<usize>,
  pub order_by:  Option<String>,
  pub ascending: bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Scorecard storage backend.
///
/// `get_*` and `update_*` return `None` when the row is absent; `delete_*`
/// returns whether a row was removed. Interpreting absence (not-found errors,
/// belongs-to checks) is the service layer's job.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EvalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Create and persist a new session. Id and timestamps are store-assigned.
  fn insert_session(
    &self,
    new: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn list_sessions(
    &self,
    query: ListQuery,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Apply the given fields and bump `last_modified`. Returns the refreshed
  /// session, or `None` if it does not exist.
  fn update_session(
    &self,
    id: Uuid,
    patch: SessionPatch,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Delete a session; the schema cascades to all descendant rows.
  fn delete_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Chains ────────────────────────────────────────────────────────────

  /// Attach chain files to a session in one transaction. Rows that collide
  /// with the `(session_id, file_name)` uniqueness constraint are skipped,
  /// and only the rows actually inserted are returned.
  fn insert_chains(
    &self,
    session_id: Uuid,
    file_names: Vec<String>,
  ) -> impl Future<Output = Result<Vec<Chain>, Self::Error>> + Send + '_;

  fn get_chain(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Chain>, Self::Error>> + Send + '_;

  fn list_session_chains(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Chain>, Self::Error>> + Send + '_;

  fn delete_chain(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every chain in a session; returns the number removed.
  fn delete_session_chains(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Questions ─────────────────────────────────────────────────────────

  fn insert_question(
    &self,
    session_id: Uuid,
    new: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  /// Insert all questions in one transaction; any failure rolls back the
  /// entire batch.
  fn insert_questions(
    &self,
    session_id: Uuid,
    new: Vec<NewQuestion>,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  fn get_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  fn list_session_questions(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  fn update_question(
    &self,
    id: Uuid,
    patch: QuestionPatch,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  fn delete_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete the given questions in one transaction; returns the number
  /// removed.
  fn delete_questions(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Configurations ────────────────────────────────────────────────────

  fn insert_configuration(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
    new: NewConfiguration,
  ) -> impl Future<Output = Result<Configuration, Self::Error>> + Send + '_;

  fn get_configuration(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Configuration>, Self::Error>> + Send + '_;

  fn list_session_configurations(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Configuration>, Self::Error>> + Send + '_;

  fn list_chain_configurations(
    &self,
    chain_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Configuration>, Self::Error>> + Send + '_;

  fn update_configuration(
    &self,
    id: Uuid,
    patch: ConfigurationPatch,
  ) -> impl Future<Output = Result<Option<Configuration>, Self::Error>> + Send + '_;

  fn delete_configuration(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Answers ───────────────────────────────────────────────────────────

  fn insert_answer(
    &self,
    question_id: Uuid,
    new: NewAnswer,
  ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + '_;

  /// Insert all `(question_id, answer)` pairs in one transaction; any
  /// failure rolls back the entire batch.
  fn insert_answers(
    &self,
    rows: Vec<(Uuid, NewAnswer)>,
  ) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  fn get_answer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Answer>, Self::Error>> + Send + '_;

  fn list_question_answers(
    &self,
    question_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  fn list_configuration_answers(
    &self,
    configuration_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  /// Set or clear the score. Returns the refreshed answer, or `None` if it
  /// does not exist.
  fn update_answer_score(
    &self,
    id: Uuid,
    score: Option<Score>,
  ) -> impl Future<Output = Result<Option<Answer>, Self::Error>> + Send + '_;

  fn delete_answer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every answer for a question; returns the number removed.
  fn delete_question_answers(
    &self,
    question_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Answer comments ───────────────────────────────────────────────────

  fn insert_comment(
    &self,
    answer_id: Uuid,
    new: NewComment,
  ) -> impl Future<Output = Result<AnswerComment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AnswerComment>, Self::Error>> + Send + '_;

  fn list_answer_comments(
    &self,
    answer_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AnswerComment>, Self::Error>> + Send + '_;

  fn update_comment(
    &self,
    id: Uuid,
    patch: CommentPatch,
  ) -> impl Future<Output = Result<Option<AnswerComment>, Self::Error>> + Send + '_;

  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
