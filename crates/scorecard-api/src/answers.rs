//! Handlers for answer, scoring, and comment endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/questions/:id/answers` | |
//! | `POST`   | `/questions/:id/answers/bulk` | All-or-nothing |
//! | `GET`    | `/questions/:id/answers` | |
//! | `DELETE` | `/questions/:id/answers` | Removes every answer |
//! | `PATCH`  | `/questions/:id/answers/:answer_id` | Score only |
//! | `DELETE` | `/questions/:id/answers/:answer_id` | |
//! | `GET`    | `/configurations/:id/answers` | |
//! | `GET`    | `/configurations/:id/score` | Average; 0.0 when unscored |
//! | `POST`   | `/answers/:id/comments` | |
//! | `GET`    | `/answers/:id/comments` | |
//! | `PATCH`  | `/answers/:id/comments/:comment_id` | |
//! | `DELETE` | `/answers/:id/comments/:comment_id` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use scorecard_core::{
  answer::{
    Answer, AnswerComment, CommentPatch, NewAnswer, NewComment, ScoreUpdate,
  },
  store::EvalStore,
};
use scorecard_services::{AnswerService, ChainHost};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AnswersBulk {
  pub answers: Vec<NewAnswer>,
}

/// `POST /questions/:id/answers`
pub async fn create<S, H>(
  State(state): State<AppState<S, H>>,
  Path(question_id): Path<Uuid>,
  Json(body): Json<NewAnswer>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answer = AnswerService::new(state.store.clone())
    .create_answer(question_id, body)
    .await?;
  Ok((StatusCode::CREATED, Json(answer)))
}

/// `POST /questions/:id/answers/bulk`
pub async fn create_bulk<S, H>(
  State(state): State<AppState<S, H>>,
  Path(question_id): Path<Uuid>,
  Json(body): Json<AnswersBulk>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answers = AnswerService::new(state.store.clone())
    .create_answers_bulk(question_id, body.answers)
    .await?;
  Ok((StatusCode::CREATED, Json(answers)))
}

/// `GET /questions/:id/answers`
pub async fn list_by_question<S, H>(
  State(state): State<AppState<S, H>>,
  Path(question_id): Path<Uuid>,
) -> Result<Json<Vec<Answer>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answers = AnswerService::new(state.store.clone())
    .get_answers_by_question(question_id)
    .await?;
  Ok(Json(answers))
}

/// `GET /configurations/:id/answers`
pub async fn list_by_configuration<S, H>(
  State(state): State<AppState<S, H>>,
  Path(configuration_id): Path<Uuid>,
) -> Result<Json<Vec<Answer>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answers = AnswerService::new(state.store.clone())
    .get_answers_by_configuration(configuration_id)
    .await?;
  Ok(Json(answers))
}

/// `GET /configurations/:id/score`
pub async fn average_score<S, H>(
  State(state): State<AppState<S, H>>,
  Path(configuration_id): Path<Uuid>,
) -> Result<Json<f64>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let average = AnswerService::new(state.store.clone())
    .get_average_score_by_configuration(configuration_id)
    .await?;
  Ok(Json(average))
}

/// `PATCH /questions/:id/answers/:answer_id`
pub async fn update_score<S, H>(
  State(state): State<AppState<S, H>>,
  Path((question_id, answer_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<ScoreUpdate>,
) -> Result<Json<Answer>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answer = AnswerService::new(state.store.clone())
    .update_answer_score(question_id, answer_id, body)
    .await?;
  Ok(Json(answer))
}

/// `DELETE /questions/:id/answers/:answer_id`
pub async fn delete_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path((question_id, answer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Answer>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answer = AnswerService::new(state.store.clone())
    .delete_answer(question_id, answer_id)
    .await?;
  Ok(Json(answer))
}

/// `DELETE /questions/:id/answers`
pub async fn delete_by_question<S, H>(
  State(state): State<AppState<S, H>>,
  Path(question_id): Path<Uuid>,
) -> Result<Json<Vec<Answer>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answers = AnswerService::new(state.store.clone())
    .delete_answers_by_question(question_id)
    .await?;
  Ok(Json(answers))
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// `POST /answers/:id/comments`
pub async fn create_comment<S, H>(
  State(state): State<AppState<S, H>>,
  Path(answer_id): Path<Uuid>,
  Json(body): Json<NewComment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let comment = AnswerService::new(state.store.clone())
    .create_answer_comment(answer_id, body)
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /answers/:id/comments`
pub async fn list_comments<S, H>(
  State(state): State<AppState<S, H>>,
  Path(answer_id): Path<Uuid>,
) -> Result<Json<Vec<AnswerComment>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let comments = AnswerService::new(state.store.clone())
    .get_answer_comments(answer_id)
    .await?;
  Ok(Json(comments))
}

/// `PATCH /answers/:id/comments/:comment_id`
pub async fn update_comment<S, H>(
  State(state): State<AppState<S, H>>,
  Path((answer_id, comment_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<CommentPatch>,
) -> Result<Json<AnswerComment>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let comment = AnswerService::new(state.store.clone())
    .update_answer_comment(answer_id, comment_id, body)
    .await?;
  Ok(Json(comment))
}

/// `DELETE /answers/:id/comments/:comment_id`
pub async fn delete_comment<S, H>(
  State(state): State<AppState<S, H>>,
  Path((answer_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AnswerComment>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let comment = AnswerService::new(state.store.clone())
    .delete_answer_comment(answer_id, comment_id)
    .await?;
  Ok(Json(comment))
}
