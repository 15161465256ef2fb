//! Handlers for `/sessions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sessions` | Optional `?skip=<n>&limit=<n>` |
//! | `POST`   | `/sessions` | Body: `{"name":"...","description":"..."}` |
//! | `GET`    | `/sessions/:id` | 404 if not found |
//! | `PATCH`  | `/sessions/:id` | Partial body |
//! | `DELETE` | `/sessions/:id` | Returns the deleted session |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use scorecard_core::{
  session::{NewSession, Session, SessionPatch},
  store::EvalStore,
};
use scorecard_services::{ChainHost, SessionService};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub skip:  usize,
  #[serde(default)]
  pub limit: Option<usize>,
}

/// `GET /sessions[?skip=<n>&limit=<n>]`
pub async fn list<S, H>(
  State(state): State<AppState<S, H>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Session>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let sessions = SessionService::new(state.store.clone())
    .get_sessions(params.skip, params.limit)
    .await?;
  Ok(Json(sessions))
}

/// `POST /sessions`
pub async fn create<S, H>(
  State(state): State<AppState<S, H>>,
  Json(body): Json<NewSession>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let session = SessionService::new(state.store.clone())
    .create_session(body)
    .await?;
  Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /sessions/:id`
pub async fn get_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let session = SessionService::new(state.store.clone())
    .get_session_by_id(session_id)
    .await?;
  Ok(Json(session))
}

/// `PATCH /sessions/:id`
pub async fn update<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<SessionPatch>,
) -> Result<Json<Session>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let session = SessionService::new(state.store.clone())
    .update_session(session_id, body)
    .await?;
  Ok(Json(session))
}

/// `DELETE /sessions/:id`
pub async fn delete_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let session = SessionService::new(state.store.clone())
    .delete_session(session_id)
    .await?;
  Ok(Json(session))
}
