//! Handlers for configuration endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/sessions/:id/chains/:chain_id/configurations` | |
//! | `GET`    | `/sessions/:id/chains/:chain_id/configurations` | |
//! | `GET`    | `/sessions/:id/configurations` | |
//! | `GET`    | `/sessions/:id/configurations/:config_id` | |
//! | `PATCH`  | `/sessions/:id/configurations/:config_id` | |
//! | `DELETE` | `/sessions/:id/configurations/:config_id` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;

use scorecard_core::{
  configuration::{Configuration, ConfigurationPatch, NewConfiguration},
  store::EvalStore,
};
use scorecard_services::{ChainHost, ConfigurationService};

use crate::{AppState, error::ApiError};

/// `POST /sessions/:id/chains/:chain_id/configurations`
pub async fn create<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, chain_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<NewConfiguration>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let configuration =
    ConfigurationService::new(state.store.clone(), state.host.clone())
      .create_configuration(session_id, chain_id, body)
      .await?;
  Ok((StatusCode::CREATED, Json(configuration)))
}

/// `GET /sessions/:id/chains/:chain_id/configurations`
pub async fn list_for_chain<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, chain_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Configuration>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let configurations =
    ConfigurationService::new(state.store.clone(), state.host.clone())
      .get_chain_configurations(session_id, chain_id)
      .await?;
  Ok(Json(configurations))
}

/// `GET /sessions/:id/configurations`
pub async fn list_for_session<S, H>(
  State(state): State<AppState<S, H>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Configuration>>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let configurations =
    ConfigurationService::new(state.store.clone(), state.host.clone())
      .get_session_configurations(session_id)
      .await?;
  Ok(Json(configurations))
}

/// `GET /sessions/:id/configurations/:config_id`
pub async fn get_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, configuration_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Configuration>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let configuration =
    ConfigurationService::new(state.store.clone(), state.host.clone())
      .get_configuration_by_id(session_id, configuration_id)
      .await?;
  Ok(Json(configuration))
}

/// `PATCH /sessions/:id/configurations/:config_id`
pub async fn update<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, configuration_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<ConfigurationPatch>,
) -> Result<Json<Configuration>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let configuration =
    ConfigurationService::new(state.store.clone(), state.host.clone())
      .update_configuration(session_id, configuration_id, body)
      .await?;
  Ok(Json(configuration))
}

/// `DELETE /sessions/:id/configurations/:config_id`
pub async fn delete_one<S, H>(
  State(state): State<AppState<S, H>>,
  Path((session_id, configuration_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Configuration>, ApiError>
where
  S: EvalStore + 'static,
  H: ChainHost + 'static,
{
  let configuration =
    ConfigurationService::new(state.store.clone(), state.host.clone())
      .delete_configuration(session_id, configuration_id)
      .await?;
  Ok(Json(configuration))
}
