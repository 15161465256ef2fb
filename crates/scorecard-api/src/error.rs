//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every service-family error maps here through a `From` impl: NotFound
//! kinds become 404 with a message naming the missing entity and id,
//! validation-shaped kinds become 400, and everything else becomes a 500
//! whose cause is logged internally but never sent to the caller.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use scorecard_services::{
  AnswerError, ChainError, ConfigurationError, QuestionError, SessionError,
};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_owned(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<SessionError> for ApiError {
  fn from(e: SessionError) -> Self {
    match e {
      SessionError::NotFound(id) => {
        ApiError::NotFound(format!("session '{id}' not found"))
      }
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<ChainError> for ApiError {
  fn from(e: ChainError) -> Self {
    match e {
      ChainError::SessionNotFound(id) => {
        ApiError::NotFound(format!("session '{id}' not found"))
      }
      ChainError::NotFound(id) => {
        ApiError::NotFound(format!("chain '{id}' not found"))
      }
      ChainError::ConfigurationNotFound(id) => {
        ApiError::NotFound(format!("configuration '{id}' not found"))
      }
      e @ ChainError::UnknownFiles(_) => ApiError::BadRequest(e.to_string()),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<ConfigurationError> for ApiError {
  fn from(e: ConfigurationError) -> Self {
    match e {
      ConfigurationError::SessionNotFound(id) => {
        ApiError::NotFound(format!("session '{id}' not found"))
      }
      ConfigurationError::ChainNotFound(id) => {
        ApiError::NotFound(format!("chain '{id}' not found"))
      }
      ConfigurationError::NotFound(id) => {
        ApiError::NotFound(format!("configuration '{id}' not found"))
      }
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<QuestionError> for ApiError {
  fn from(e: QuestionError) -> Self {
    match e {
      QuestionError::SessionNotFound(id) => {
        ApiError::NotFound(format!("session '{id}' not found"))
      }
      QuestionError::NotFound(id) => {
        ApiError::NotFound(format!("question '{id}' not found"))
      }
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<AnswerError> for ApiError {
  fn from(e: AnswerError) -> Self {
    match e {
      AnswerError::ChainNotFound(id) => {
        ApiError::NotFound(format!("chain '{id}' not found"))
      }
      AnswerError::QuestionNotFound(id) => {
        ApiError::NotFound(format!("question '{id}' not found"))
      }
      AnswerError::ConfigurationNotFound(id) => {
        ApiError::NotFound(format!("configuration '{id}' not found"))
      }
      AnswerError::NotFound(id) => {
        ApiError::NotFound(format!("answer '{id}' not found"))
      }
      AnswerError::CommentNotFound(id) => {
        ApiError::NotFound(format!("comment '{id}' not found"))
      }
      other => ApiError::Internal(Box::new(other)),
    }
  }
}
