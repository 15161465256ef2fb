//! JSON REST API for Scorecard.
//!
//! Exposes an axum [`Router`] backed by any
//! [`EvalStore`](scorecard_core::store::EvalStore) and
//! [`ChainHost`](scorecard_services::ChainHost). TLS and deployment concerns
//! are the caller's responsibility; the service layer owns all validation,
//! so the handlers here only translate between HTTP and service calls.

pub mod answers;
pub mod chains;
pub mod configurations;
pub mod error;
pub mod questions;
pub mod sessions;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use scorecard_core::store::EvalStore;
use scorecard_services::ChainHost;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Base URL of the LangServe-style chain host.
  pub chain_base_url: String,
  /// Directory holding the chain files the host serves.
  pub chains_dir:     PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, H> {
  pub store: Arc<S>,
  pub host:  Arc<H>,
}

impl<S, H> Clone for AppState<S, H> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), host: self.host.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, H>(state: AppState<S, H>) -> Router<()>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  Router::new()
    // Sessions
    .route(
      "/sessions",
      get(sessions::list::<S, H>).post(sessions::create::<S, H>),
    )
    .route(
      "/sessions/{session_id}",
      get(sessions::get_one::<S, H>)
        .patch(sessions::update::<S, H>)
        .delete(sessions::delete_one::<S, H>),
    )
    // Chains
    .route("/available-chains", get(chains::available::<S, H>))
    .route(
      "/sessions/{session_id}/select-chains",
      post(chains::select::<S, H>),
    )
    .route(
      "/sessions/{session_id}/chains",
      get(chains::list::<S, H>).delete(chains::delete_all::<S, H>),
    )
    .route(
      "/sessions/{session_id}/chains/{chain_id}",
      get(chains::get_one::<S, H>).delete(chains::delete_one::<S, H>),
    )
    .route(
      "/sessions/{session_id}/chains/{chain_id}/invoke",
      post(chains::invoke::<S, H>),
    )
    .route(
      "/sessions/{session_id}/chains/{chain_id}/config-schema",
      get(chains::config_schema::<S, H>),
    )
    // Configurations
    .route(
      "/sessions/{session_id}/chains/{chain_id}/configurations",
      get(configurations::list_for_chain::<S, H>)
        .post(configurations::create::<S, H>),
    )
    .route(
      "/sessions/{session_id}/configurations",
      get(configurations::list_for_session::<S, H>),
    )
    .route(
      "/sessions/{session_id}/configurations/{configuration_id}",
      get(configurations::get_one::<S, H>)
        .patch(configurations::update::<S, H>)
        .delete(configurations::delete_one::<S, H>),
    )
    // Questions
    .route(
      "/sessions/{session_id}/questions",
      get(questions::list::<S, H>)
        .post(questions::create::<S, H>)
        .delete(questions::delete_all::<S, H>),
    )
    .route(
      "/sessions/{session_id}/questions/bulk",
      post(questions::create_bulk::<S, H>)
        .delete(questions::delete_bulk::<S, H>),
    )
    .route(
      "/sessions/{session_id}/questions/{question_id}",
      axum::routing::patch(questions::update::<S, H>)
        .delete(questions::delete_one::<S, H>),
    )
    // Answers
    .route(
      "/questions/{question_id}/answers",
      get(answers::list_by_question::<S, H>)
        .post(answers::create::<S, H>)
        .delete(answers::delete_by_question::<S, H>),
    )
    .route(
      "/questions/{question_id}/answers/bulk",
      post(answers::create_bulk::<S, H>),
    )
    .route(
      "/questions/{question_id}/answers/{answer_id}",
      axum::routing::patch(answers::update_score::<S, H>)
        .delete(answers::delete_one::<S, H>),
    )
    .route(
      "/configurations/{configuration_id}/answers",
      get(answers::list_by_configuration::<S, H>),
    )
    .route(
      "/configurations/{configuration_id}/score",
      get(answers::average_score::<S, H>),
    )
    // Comments
    .route(
      "/answers/{answer_id}/comments",
      get(answers::list_comments::<S, H>)
        .post(answers::create_comment::<S, H>),
    )
    .route(
      "/answers/{answer_id}/comments/{comment_id}",
      axum::routing::patch(answers::update_comment::<S, H>)
        .delete(answers::delete_comment::<S, H>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use scorecard_services::HostError;
  use scorecard_store_sqlite::SqliteStore;
  use serde_json::{Map, Value, json};
  use tower::ServiceExt as _;

  /// Chain host stub: one hosted file, echo-style invocation.
  struct StubHost;

  impl ChainHost for StubHost {
    async fn available_chains(&self) -> Result<Vec<String>, HostError> {
      Ok(vec!["rag_chain.py".to_owned()])
    }

    async fn batch_invoke(
      &self,
      _file_name: &str,
      inputs: Vec<String>,
      _configurable: Map<String, Value>,
    ) -> Result<Vec<String>, HostError> {
      Ok(inputs.iter().map(|i| format!("answer to: {i}")).collect())
    }

    async fn config_schema(&self, _file_name: &str) -> Result<Value, HostError> {
      Ok(json!({ "properties": {} }))
    }
  }

  async fn make_state() -> AppState<SqliteStore, StubHost> {
    AppState {
      store: Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      host:  Arc::new(StubHost),
    }
  }

  async fn oneshot_json(
    state:  AppState<SqliteStore, StubHost>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        builder.body(Body::from(v.to_string())).unwrap()
      }
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = api_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  fn id_of(value: &Value, field: &str) -> String {
    value[field].as_str().expect(field).to_owned()
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_session_returns_201_and_roundtrips() {
    let state = make_state().await;

    let (status, created) = oneshot_json(
      state.clone(),
      "POST",
      "/sessions",
      Some(json!({ "name": "demo", "description": "smoke test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let session_id = id_of(&created, "session_id");
    let (status, fetched) =
      oneshot_json(state, "GET", &format!("/sessions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
  }

  #[tokio::test]
  async fn get_unknown_session_returns_404() {
    let state = make_state().await;
    let (status, body) = oneshot_json(
      state,
      "GET",
      &format!("/sessions/{}", uuid::Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("session"));
  }

  #[tokio::test]
  async fn create_session_without_name_is_rejected() {
    let state = make_state().await;
    let (status, _) = oneshot_json(
      state,
      "POST",
      "/sessions",
      Some(json!({ "description": "nameless" })),
    )
    .await;
    assert!(status.is_client_error(), "got {status}");
  }

  // ── Chains ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn select_unknown_chain_file_returns_400() {
    let state = make_state().await;
    let (_, session) = oneshot_json(
      state.clone(),
      "POST",
      "/sessions",
      Some(json!({ "name": "chains" })),
    )
    .await;
    let session_id = id_of(&session, "session_id");

    let (status, body) = oneshot_json(
      state,
      "POST",
      &format!("/sessions/{session_id}/select-chains"),
      Some(json!({ "file_names": ["missing.py"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("missing.py"));
  }

  // ── End-to-end scoring flow ─────────────────────────────────────────────────

  #[tokio::test]
  async fn scoring_flow_end_to_end() {
    let state = make_state().await;

    let (_, session) = oneshot_json(
      state.clone(),
      "POST",
      "/sessions",
      Some(json!({ "name": "flow" })),
    )
    .await;
    let session_id = id_of(&session, "session_id");

    let (status, chains) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/sessions/{session_id}/select-chains"),
      Some(json!({ "file_names": ["rag_chain.py"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chain_id = id_of(&chains[0], "chain_id");

    let (status, configuration) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/sessions/{session_id}/chains/{chain_id}/configurations"),
      Some(json!({ "config_values": { "temperature": 0.2 } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let configuration_id = id_of(&configuration, "configuration_id");

    let (status, question) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/sessions/{session_id}/questions"),
      Some(json!({ "question_text": "What is RAG?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let question_id = id_of(&question, "question_id");

    // Invoke the chain over the session's questions.
    let (status, answers) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/sessions/{session_id}/chains/{chain_id}/invoke"),
      Some(json!({ "configuration_id": configuration_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answers.as_array().unwrap().len(), 1);
    assert_eq!(answers[0]["generated_answer"], "answer to: What is RAG?");
    let answer_id = id_of(&answers[0], "answer_id");

    // An out-of-range score never reaches the service layer.
    let (status, _) = oneshot_json(
      state.clone(),
      "PATCH",
      &format!("/questions/{question_id}/answers/{answer_id}"),
      Some(json!({ "score": 6 })),
    )
    .await;
    assert!(status.is_client_error(), "got {status}");

    // A valid score lands.
    let (status, scored) = oneshot_json(
      state.clone(),
      "PATCH",
      &format!("/questions/{question_id}/answers/{answer_id}"),
      Some(json!({ "score": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scored["score"], 5);

    let (status, average) = oneshot_json(
      state,
      "GET",
      &format!("/configurations/{configuration_id}/score"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(average, json!(5.0));
  }

  // ── Cascade over HTTP ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn deleting_session_cascades_to_questions() {
    let state = make_state().await;

    let (_, session) = oneshot_json(
      state.clone(),
      "POST",
      "/sessions",
      Some(json!({ "name": "doomed" })),
    )
    .await;
    let session_id = id_of(&session, "session_id");

    let (_, question) = oneshot_json(
      state.clone(),
      "POST",
      &format!("/sessions/{session_id}/questions"),
      Some(json!({ "question_text": "orphan?" })),
    )
    .await;
    let question_id = id_of(&question, "question_id");

    let (status, _) = oneshot_json(
      state.clone(),
      "DELETE",
      &format!("/sessions/{session_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = oneshot_json(
      state,
      "GET",
      &format!("/questions/{question_id}/answers"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
