use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::ens::{self, ClaimEnsRequest, ClaimEnsResponse};

pub async fn claim(
    State(state): State<AppState>,
    body: Result<Json<ClaimEnsRequest>, JsonRejection>,
) -> Result<Json<ClaimEnsResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let resp = ens::claim(&req, &state.ens_base_domain)?;
    tracing::info!(agent_id = req.agent_id, ens_name = %resp.ens_name, "ENS name prepared");
    Ok(Json(resp))
}
