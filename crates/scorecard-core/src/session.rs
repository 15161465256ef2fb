//! Session — the top-level grouping of questions, chains, and configurations
//! under evaluation together. Root of the ownership hierarchy: deleting a
//! session cascades to every descendant row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An evaluation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub session_id:    Uuid,
  pub created_at:    DateTime<Utc>,
  /// Unique per deployment.
  pub name:          String,
  pub description:   Option<String>,
  pub last_modified: DateTime<Utc>,
}

/// Input for creating a session. `name` is required; a body without one is
/// rejected at deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSession {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPatch {
  #[serde(default)]
  pub name:        Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}
