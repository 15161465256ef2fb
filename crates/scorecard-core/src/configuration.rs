//! Configuration — a named set of parameter values applied to a chain when
//! generating answers.
//!
//! A configuration belongs to a chain within a session. `config_schema` is a
//! cached copy of the schema document the chain host publishes for that
//! chain; `config_values` is the free-form value set sent along with each
//! batch invocation. Both are stored as opaque JSON — the core never
//! introspects chain internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
  pub configuration_id: Uuid,
  pub created_at:       DateTime<Utc>,
  pub session_id:       Uuid,
  pub chain_id:         Uuid,
  pub config_schema:    Option<Value>,
  pub config_values:    Option<Value>,
}

/// Input for creating a configuration. When `config_schema` is absent the
/// service fetches it from the chain host and caches the result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewConfiguration {
  #[serde(default)]
  pub config_values: Option<Value>,
  #[serde(default)]
  pub config_schema: Option<Value>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigurationPatch {
  #[serde(default)]
  pub config_values: Option<Value>,
  #[serde(default)]
  pub config_schema: Option<Value>,
}
