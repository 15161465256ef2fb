//! Handlers for chain selection and invocation endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/available-chains` | Live host listing |
//! | `POST`   | `/sessions/:id/select-chains` | Body: `{"file_names":[...]}` |
//! | `GET`    | `/sessions/:id/chains` | |
//! | `DELETE` | `/sessions/:id/chains` | Removes every chain |
//! | `GET`    | `/sessions/:id/chains/:chain_id` | |
//! | `DELETE` | `/sessions/:id/chains/:chain_id` | |
//! | `POST`   | `/sessions/:id/chains/:chain_id/invoke` | Body: `{"configuration_id":"..."}` |
//! | `GET`    | `/sessions/:id/chains/:chain_id/config-schema` | |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scorecard_core::{answer::Answer, chain::Chain, store::EvalStore};
use scorecard_services::{ChainHost, ChainService, ConfigurationService};

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct AvailableChain {
  pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChainSelection {
  pub file_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvokeBody {
  pub configuration_id: Uuid,
}

/// `GET /available-chains`
pub async fn available<S, H>(
  State(state): State<AppState<S, H>>,
) -> Result<Json<Vec<AvailableChain>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let files = ChainService::new(state.store.clone(), state.host.clone())
    .get_available_chains()
    .await?;
  Ok(Json(
    files
      .into_iter()
      .map(|file_name| AvailableChain { file_name })
      .collect(),
  ))
}

/// `POST /sessions/:id/select-chains`
pub async fn select<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<ChainSelection>,
) -> Result<Json<Vec<Chain>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let chains = ChainService::new(state.store.clone(), state.host.clone())
    .select_chains(session_id, body.file_names)
    .await?;
  Ok(Json(chains))
}

/// `GET /sessions/:id/chains`
pub async fn list<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Chain>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let chains = ChainService::new(state.store.clone(), state.host.clone())
    .get_session_chains(session_id)
    .await?;
  Ok(Json(chains))
}

/// `GET /sessions/:id/chains/:chain_id`
pub async fn get_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, chain_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Chain>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let chain = ChainService::new(state.store.clone(), state.host.clone())
    .get_chain_by_id(session_id, chain_id)
    .await?;
  Ok(Json(chain))
}

/// `DELETE /sessions/:id/chains/:chain_id`
pub async fn delete_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, chain_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Chain>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let chain = ChainService::new(state.store.clone(), state.host.clone())
    .delete_session_chain(session_id, chain_id)
    .await?;
  Ok(Json(chain))
}

/// `DELETE /sessions/:id/chains`
pub async fn delete_all<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Chain>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let chains = ChainService::new(state.store.clone(), state.host.clone())
    .delete_session_chains(session_id)
    .await?;
  Ok(Json(chains))
}

/// `POST /sessions/:id/chains/:chain_id/invoke`
pub async fn invoke<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, chain_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<InvokeBody>,
) -> Result<Json<Vec<Answer>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let answers = ChainService::new(state.store.clone(), state.host.clone())
    .invoke_chain_batch(session_id, chain_id, body.configuration_id)
    .await?;
  Ok(Json(answers))
}

/// `GET /sessions/:id/chains/:chain_id/config-schema`
pub async fn config_schema<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, chain_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let schema =
    ConfigurationService::new(state.store.clone(), state.host.clone())
      .get_chain_schema(session_id, chain_id)
      .await?;
  Ok(Json(schema))
}
