//! Chain — a reference to an externally-hosted LLM pipeline, attached to a
//! session by file name. The pipeline itself never runs in-process; it is
//! addressed through the chain host by its file name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chain file selected into a session.
///
/// `(session_id, file_name)` is unique: re-selecting an already-attached
/// file is a no-op, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
  pub chain_id:   Uuid,
  pub created_at: DateTime<Utc>,
  pub session_id: Uuid,
  pub file_name:  String,
}
