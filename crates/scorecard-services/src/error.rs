//! Per-family service error enums.
//!
//! Every family has a `NotFound` kind (plus cross-family NotFound variants
//! where a service validates another family's ids) and a `Store` kind that
//! wraps an unexpected backend failure with the operation it interrupted.
//! The transport layer maps NotFound kinds to 404, validation-shaped kinds
//! to 400, and everything else to 500.

use thiserror::Error;
use uuid::Uuid;

use crate::host::HostError;

/// A boxed storage-backend error, attached as the cause of a `Store` kind.
pub type StoreFailure = Box<dyn std::error::Error + Send + Sync>;

// ─── Sessions ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("session '{0}' not found")]
  NotFound(Uuid),

  #[error("failed to {op} session")]
  Store {
    op:     &'static str,
    #[source]
    source: StoreFailure,
  },
}

impl SessionError {
  pub(crate) fn store<E>(op: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(op, error = %source, "session store failure");
    Self::Store { op, source: Box::new(source) }
  }
}

// ─── Chains ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChainError {
  #[error("session '{0}' not found")]
  SessionNotFound(Uuid),

  #[error("chain '{0}' not found")]
  NotFound(Uuid),

  #[error("configuration '{0}' not found")]
  ConfigurationNotFound(Uuid),

  #[error("chain files not available from the chain host: {}", .0.join(", "))]
  UnknownFiles(Vec<String>),

  #[error("chain host error: {0}")]
  Host(#[from] HostError),

  #[error("chain returned {got} outputs for {expected} questions")]
  OutputMismatch { expected: usize, got: usize },

  #[error("failed to {op} chain")]
  Store {
    op:     &'static str,
    #[source]
    source: StoreFailure,
  },
}

impl ChainError {
  pub(crate) fn store<E>(op: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(op, error = %source, "chain store failure");
    Self::Store { op, source: Box::new(source) }
  }
}

// ─── Configurations ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("session '{0}' not found")]
  SessionNotFound(Uuid),

  #[error("chain '{0}' not found")]
  ChainNotFound(Uuid),

  #[error("configuration '{0}' not found")]
  NotFound(Uuid),

  #[error("failed to fetch chain schema: {0}")]
  Schema(#[source] HostError),

  #[error("failed to {op} configuration")]
  Store {
    op:     &'static str,
    #[source]
    source: StoreFailure,
  },
}

impl ConfigurationError {
  pub(crate) fn store<E>(op: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(op, error = %source, "configuration store failure");
    Self::Store { op, source: Box::new(source) }
  }
}

// ─── Questions ───────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum QuestionError {
  #[error("session '{0}' not found")]
  SessionNotFound(Uuid),

  #[error("question '{0}' not found")]
  NotFound(Uuid),

  #[error("failed to {op} question")]
  Store {
    op:     &'static str,
    #[source]
    source: StoreFailure,
  },
}

impl QuestionError {
  pub(crate) fn store<E>(op: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(op, error = %source, "question store failure");
    Self::Store { op, source: Box::new(source) }
  }
}

// ─── Answers ─────────────────────────────────────────────────────────────────

/// Since an answer references a chain, a question, and a configuration, this
/// family raises the *referenced* family's NotFound kind for a dangling id
/// rather than inventing answer-specific variants.
#[derive(Debug, Error)]
pub enum AnswerError {
  #[error("chain '{0}' not found")]
  ChainNotFound(Uuid),

  #[error("question '{0}' not found")]
  QuestionNotFound(Uuid),

  #[error("configuration '{0}' not found")]
  ConfigurationNotFound(Uuid),

  #[error("answer '{0}' not found")]
  NotFound(Uuid),

  #[error("comment '{0}' not found")]
  CommentNotFound(Uuid),

  #[error("failed to {op} answer")]
  Store {
    op:     &'static str,
    #[source]
    source: StoreFailure,
  },
}

impl AnswerError {
  pub(crate) fn store<E>(op: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(op, error = %source, "answer store failure");
    Self::Store { op, source: Box::new(source) }
  }
}
