//! Question — a reference question belonging to a session, optionally
//! carrying a gold answer for comparison.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub question_id:     Uuid,
  pub created_at:      DateTime<Utc>,
  pub session_id:      Uuid,
  pub question_text:   String,
  /// Reference answer used when judging generated answers.
  pub expected_answer: Option<String>,
  pub last_modified:   DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
  pub question_text:   String,
  #[serde(default)]
  pub expected_answer: Option<String>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionPatch {
  #[serde(default)]
  pub question_text:   Option<String>,
  #[serde(default)]
  pub expected_answer: Option<String>,
}
