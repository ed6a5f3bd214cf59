use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::Beneficiary;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::BeneficiaryPayload;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Terms the beneficiary name must contain, separated by spaces or commas
    pub search: Option<String>,
}

/// GET /beneficiaries/ - List beneficiaries, optionally filtered by name
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Beneficiary>> {
    let records = state.beneficiaries.list(query.search.as_deref()).await?;
    Ok(ApiResponse::success(records))
}

/// POST /beneficiaries/ - Create a beneficiary
///
/// Anonymous callers may create; `creator_email` is taken from the token,
/// never from the body.
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<BeneficiaryPayload>, JsonRejection>,
) -> ApiResult<Beneficiary> {
    let Json(payload) = payload?;
    let created = state.beneficiaries.create(&caller, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// POST /beneficiaries/create_random/ - Create a beneficiary with a random name
pub async fn create_random(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Beneficiary> {
    let created = state.beneficiaries.create_random(&caller).await?;
    Ok(ApiResponse::created(created))
}
