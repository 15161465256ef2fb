//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Configuration schemas and values are stored
//! as compact JSON text.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use scorecard_core::{
  answer::{Answer, AnswerComment, Score},
  chain::Chain,
  configuration::Configuration,
  question::Question,
  session::Session,
};
use uuid::Uuid;

use crate::{repo::Table, Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_json(value: &serde_json::Value) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json(s: &str) -> Result<serde_json::Value> {
  Ok(serde_json::from_str(s)?)
}

// ─── Column values ───────────────────────────────────────────────────────────

fn text(s: &str) -> Value { Value::Text(s.to_owned()) }

fn opt_text(s: &Option<String>) -> Value {
  s.clone().map_or(Value::Null, Value::Text)
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub session_id:    String,
  pub created_at:    String,
  pub name:          String,
  pub description:   Option<String>,
  pub last_modified: String,
}

impl RawSession {
  pub fn from_session(s: &Session) -> Self {
    Self {
      session_id:    encode_uuid(s.session_id),
      created_at:    encode_dt(s.created_at),
      name:          s.name.clone(),
      description:   s.description.clone(),
      last_modified: encode_dt(s.last_modified),
    }
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id:    decode_uuid(&self.session_id)?,
      created_at:    decode_dt(&self.created_at)?,
      name:          self.name,
      description:   self.description,
      last_modified: decode_dt(&self.last_modified)?,
    })
  }
}

impl Table for RawSession {
  const TABLE: &'static str = "sessions";
  const ID: &'static str = "session_id";
  const COLUMNS: &'static [&'static str] =
    &["session_id", "created_at", "name", "description", "last_modified"];

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:    row.get(0)?,
      created_at:    row.get(1)?,
      name:          row.get(2)?,
      description:   row.get(3)?,
      last_modified: row.get(4)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      text(&self.session_id),
      text(&self.created_at),
      text(&self.name),
      opt_text(&self.description),
      text(&self.last_modified),
    ]
  }
}

// ─── Chains ──────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `chains` row.
pub struct RawChain {
  pub chain_id:   String,
  pub created_at: String,
  pub session_id: String,
  pub file_name:  String,
}

impl RawChain {
  pub fn from_chain(c: &Chain) -> Self {
    Self {
      chain_id:   encode_uuid(c.chain_id),
      created_at: encode_dt(c.created_at),
      session_id: encode_uuid(c.session_id),
      file_name:  c.file_name.clone(),
    }
  }

  pub fn into_chain(self) -> Result<Chain> {
    Ok(Chain {
      chain_id:   decode_uuid(&self.chain_id)?,
      created_at: decode_dt(&self.created_at)?,
      session_id: decode_uuid(&self.session_id)?,
      file_name:  self.file_name,
    })
  }
}

impl Table for RawChain {
  const TABLE: &'static str = "chains";
  const ID: &'static str = "chain_id";
  const COLUMNS: &'static [&'static str] =
    &["chain_id", "created_at", "session_id", "file_name"];

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      chain_id:   row.get(0)?,
      created_at: row.get(1)?,
      session_id: row.get(2)?,
      file_name:  row.get(3)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      text(&self.chain_id),
      text(&self.created_at),
      text(&self.session_id),
      text(&self.file_name),
    ]
  }
}

// ─── Questions ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `questions` row.
pub struct RawQuestion {
  pub question_id:     String,
  pub created_at:      String,
  pub session_id:      String,
  pub question_text:   String,
  pub expected_answer: Option<String>,
  pub last_modified:   String,
}

impl RawQuestion {
  pub fn from_question(q: &Question) -> Self {
    Self {
      question_id:     encode_uuid(q.question_id),
      created_at:      encode_dt(q.created_at),
      session_id:      encode_uuid(q.session_id),
      question_text:   q.question_text.clone(),
      expected_answer: q.expected_answer.clone(),
      last_modified:   encode_dt(q.last_modified),
    }
  }

  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      question_id:     decode_uuid(&self.question_id)?,
      created_at:      decode_dt(&self.created_at)?,
      session_id:      decode_uuid(&self.session_id)?,
      question_text:   self.question_text,
      expected_answer: self.expected_answer,
      last_modified:   decode_dt(&self.last_modified)?,
    })
  }
}

impl Table for RawQuestion {
  const TABLE: &'static str = "questions";
  const ID: &'static str = "question_id";
  const COLUMNS: &'static [&'static str] = &[
    "question_id",
    "created_at",
    "session_id",
    "question_text",
    "expected_answer",
    "last_modified",
  ];

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      question_id:     row.get(0)?,
      created_at:      row.get(1)?,
      session_id:      row.get(2)?,
      question_text:   row.get(3)?,
      expected_answer: row.get(4)?,
      last_modified:   row.get(5)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      text(&self.question_id),
      text(&self.created_at),
      text(&self.session_id),
      text(&self.question_text),
      opt_text(&self.expected_answer),
      text(&self.last_modified),
    ]
  }
}

// ─── Configurations ──────────────────────────────────────────────────────────

/// Raw strings read directly from a `configurations` row.
pub struct RawConfiguration {
  pub configuration_id: String,
  pub created_at:       String,
  pub session_id:       String,
  pub chain_id:         String,
  pub config_schema:    Option<String>,
  pub config_values:    Option<String>,
}

impl RawConfiguration {
  pub fn from_configuration(c: &Configuration) -> Result<Self> {
    Ok(Self {
      configuration_id: encode_uuid(c.configuration_id),
      created_at:       encode_dt(c.created_at),
      session_id:       encode_uuid(c.session_id),
      chain_id:         encode_uuid(c.chain_id),
      config_schema:    c.config_schema.as_ref().map(encode_json).transpose()?,
      config_values:    c.config_values.as_ref().map(encode_json).transpose()?,
    })
  }

  pub fn into_configuration(self) -> Result<Configuration> {
    Ok(Configuration {
      configuration_id: decode_uuid(&self.configuration_id)?,
      created_at:       decode_dt(&self.created_at)?,
      session_id:       decode_uuid(&self.session_id)?,
      chain_id:         decode_uuid(&self.chain_id)?,
      config_schema:    self.config_schema.as_deref().map(decode_json).transpose()?,
      config_values:    self.config_values.as_deref().map(decode_json).transpose()?,
    })
  }
}

impl Table for RawConfiguration {
  const TABLE: &'static str = "configurations";
  const ID: &'static str = "configuration_id";
  const COLUMNS: &'static [&'static str] = &[
    "configuration_id",
    "created_at",
    "session_id",
    "chain_id",
    "config_schema",
    "config_values",
  ];

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      configuration_id: row.get(0)?,
      created_at:       row.get(1)?,
      session_id:       row.get(2)?,
      chain_id:         row.get(3)?,
      config_schema:    row.get(4)?,
      config_values:    row.get(5)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      text(&self.configuration_id),
      text(&self.created_at),
      text(&self.session_id),
      text(&self.chain_id),
      opt_text(&self.config_schema),
      opt_text(&self.config_values),
    ]
  }
}

// ─── Answers ─────────────────────────────────────────────────────────────────

/// Raw values read directly from an `answers` row.
pub struct RawAnswer {
  pub answer_id:        String,
  pub created_at:       String,
  pub chain_id:         String,
  pub question_id:      String,
  pub configuration_id: String,
  pub generated_answer: String,
  pub score:            Option<i64>,
}

impl RawAnswer {
  pub fn from_answer(a: &Answer) -> Self {
    Self {
      answer_id:        encode_uuid(a.answer_id),
      created_at:       encode_dt(a.created_at),
      chain_id:         encode_uuid(a.chain_id),
      question_id:      encode_uuid(a.question_id),
      configuration_id: encode_uuid(a.configuration_id),
      generated_answer: a.generated_answer.clone(),
      score:            a.score.map(|s| i64::from(s.value())),
    }
  }

  pub fn into_answer(self) -> Result<Answer> {
    Ok(Answer {
      answer_id:        decode_uuid(&self.answer_id)?,
      created_at:       decode_dt(&self.created_at)?,
      chain_id:         decode_uuid(&self.chain_id)?,
      question_id:      decode_uuid(&self.question_id)?,
      configuration_id: decode_uuid(&self.configuration_id)?,
      generated_answer: self.generated_answer,
      score:            self.score.map(Score::try_from).transpose()?,
    })
  }
}

impl Table for RawAnswer {
  const TABLE: &'static str = "answers";
  const ID: &'static str = "answer_id";
  const COLUMNS: &'static [&'static str] = &[
    "answer_id",
    "created_at",
    "chain_id",
    "question_id",
    "configuration_id",
    "generated_answer",
    "score",
  ];

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      answer_id:        row.get(0)?,
      created_at:       row.get(1)?,
      chain_id:         row.get(2)?,
      question_id:      row.get(3)?,
      configuration_id: row.get(4)?,
      generated_answer: row.get(5)?,
      score:            row.get(6)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      text(&self.answer_id),
      text(&self.created_at),
      text(&self.chain_id),
      text(&self.question_id),
      text(&self.configuration_id),
      text(&self.generated_answer),
      self.score.map_or(Value::Null, Value::Integer),
    ]
  }
}

// ─── Answer comments ─────────────────────────────────────────────────────────

/// Raw strings read directly from an `answer_comments` row.
pub struct RawComment {
  pub comment_id:    String,
  pub created_at:    String,
  pub answer_id:     String,
  pub comment_text:  String,
  pub last_modified: String,
}

impl RawComment {
  pub fn from_comment(c: &AnswerComment) -> Self {
    Self {
      comment_id:    encode_uuid(c.comment_id),
      created_at:    encode_dt(c.created_at),
      answer_id:     encode_uuid(c.answer_id),
      comment_text:  c.comment_text.clone(),
      last_modified: encode_dt(c.last_modified),
    }
  }

  pub fn into_comment(self) -> Result<AnswerComment> {
    Ok(AnswerComment {
      comment_id:    decode_uuid(&self.comment_id)?,
      created_at:    decode_dt(&self.created_at)?,
      answer_id:     decode_uuid(&self.answer_id)?,
      comment_text:  self.comment_text,
      last_modified: decode_dt(&self.last_modified)?,
    })
  }
}

impl Table for RawComment {
  const TABLE: &'static str = "answer_comments";
  const ID: &'static str = "comment_id";
  const COLUMNS: &'static [&'static str] =
    &["comment_id", "created_at", "answer_id", "comment_text", "last_modified"];

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:    row.get(0)?,
      created_at:    row.get(1)?,
      answer_id:     row.get(2)?,
      comment_text:  row.get(3)?,
      last_modified: row.get(4)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      text(&self.comment_id),
      text(&self.created_at),
      text(&self.answer_id),
      text(&self.comment_text),
      text(&self.last_modified),
    ]
  }
}
