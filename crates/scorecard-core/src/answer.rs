//! Answer types — a generated answer to a question, produced by a chain
//! under a configuration, plus free-text reviewer comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// ─── Score ───────────────────────────────────────────────────────────────────

/// A reviewer score, constrained to the closed range `0..=5`.
///
/// Out-of-range input fails at deserialization, before any service or store
/// sees it; the store carries a matching check constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
  pub const MAX: u8 = 5;

  pub fn new(value: u8) -> Result<Self, Error> {
    if value <= Self::MAX {
      Ok(Self(value))
    } else {
      Err(Error::ScoreOutOfRange(i64::from(value)))
    }
  }

  pub fn value(self) -> u8 {
    self.0
  }
}

impl TryFrom<u8> for Score {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Error> {
    Self::new(value)
  }
}

impl TryFrom<i64> for Score {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self, Error> {
    u8::try_from(value)
      .map_err(|_| Error::ScoreOutOfRange(value))
      .and_then(Self::new)
  }
}

impl From<Score> for u8 {
  fn from(score: Score) -> u8 {
    score.0
  }
}

// ─── Answer ──────────────────────────────────────────────────────────────────

/// A generated answer. All three parent references are required and are
/// validated to exist before insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
  pub answer_id:        Uuid,
  pub created_at:       DateTime<Utc>,
  pub chain_id:         Uuid,
  pub question_id:      Uuid,
  pub configuration_id: Uuid,
  pub generated_answer: String,
  pub score:            Option<Score>,
}

/// Input for creating an answer; the owning question id travels separately.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAnswer {
  pub chain_id:         Uuid,
  pub configuration_id: Uuid,
  pub generated_answer: String,
  #[serde(default)]
  pub score:            Option<Score>,
}

/// Update payload for an answer: only the score is mutable.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreUpdate {
  pub score: Option<Score>,
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// A free-text reviewer comment attached to an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerComment {
  pub comment_id:    Uuid,
  pub created_at:    DateTime<Utc>,
  pub answer_id:     Uuid,
  pub comment_text:  String,
  pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
  pub comment_text: String,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPatch {
  #[serde(default)]
  pub comment_text: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::Score;

  #[test]
  fn score_accepts_bounds() {
    assert_eq!(Score::new(0).unwrap().value(), 0);
    assert_eq!(Score::new(5).unwrap().value(), 5);
  }

  #[test]
  fn score_rejects_out_of_range() {
    assert!(Score::new(6).is_err());
    assert!(Score::try_from(-1i64).is_err());
  }

  #[test]
  fn score_rejects_out_of_range_json() {
    assert!(serde_json::from_str::<Score>("6").is_err());
    assert!(serde_json::from_str::<Score>("-1").is_err());
    assert_eq!(serde_json::from_str::<Score>("4").unwrap(), Score::new(4).unwrap());
  }
}
