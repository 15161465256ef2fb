//! Handlers for question endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/sessions/:id/questions` | |
//! | `GET`    | `/sessions/:id/questions` | |
//! | `DELETE` | `/sessions/:id/questions` | Removes every question |
//! | `POST`   | `/sessions/:id/questions/bulk` | All-or-nothing |
//! | `DELETE` | `/sessions/:id/questions/bulk` | Best-effort by id list |
//! | `PATCH`  | `/sessions/:id/questions/:question_id` | |
//! | `DELETE` | `/sessions/:id/questions/:question_id` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use scorecard_core::{
  question::{NewQuestion, Question, QuestionPatch},
  store::EvalStore,
};
use scorecard_services::{ChainHost, QuestionService};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct QuestionsBulk {
  pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionIds {
  pub question_ids: Vec<Uuid>,
}

/// `POST /sessions/:id/questions`
pub async fn create<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<NewQuestion>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let question = QuestionService::new(state.store.clone())
    .create_question(session_id, body)
    .await?;
  Ok((StatusCode::CREATED, Json(question)))
}

/// `POST /sessions/:id/questions/bulk`
pub async fn create_bulk<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<QuestionsBulk>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let questions = QuestionService::new(state.store.clone())
    .create_questions_bulk(session_id, body.questions)
    .await?;
  Ok((StatusCode::CREATED, Json(questions)))
}

/// `GET /sessions/:id/questions`
pub async fn list<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Question>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let questions = QuestionService::new(state.store.clone())
    .get_session_questions(session_id)
    .await?;
  Ok(Json(questions))
}

/// `PATCH /sessions/:id/questions/:question_id`
pub async fn update<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, question_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<QuestionPatch>,
) -> Result<Json<Question>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let question = QuestionService::new(state.store.clone())
    .update_question(session_id, question_id, body)
    .await?;
  Ok(Json(question))
}

/// `DELETE /sessions/:id/questions/:question_id`
pub async fn delete_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Question>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let question = QuestionService::new(state.store.clone())
    .delete_question(session_id, question_id)
    .await?;
  Ok(Json(question))
}

/// `DELETE /sessions/:id/questions/bulk`
pub async fn delete_bulk<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<QuestionIds>,
) -> Result<Json<Vec<Question>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let questions = QuestionService::new(state.store.clone())
    .delete_questions_bulk(session_id, body.question_ids)
    .await?;
  Ok(Json(questions))
}

/// `DELETE /sessions/:id/questions`
pub async fn delete_all<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Question>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let questions = QuestionService::new(state.store.clone())
    .delete_session_questions(session_id)
    .await?;
  Ok(Json(questions))
}
