use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::Beneficiary;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::BeneficiaryPayload;

/// A path id that isn't an integer can't name a row.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found("Not found"))
}

/// GET /beneficiaries/:id/
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Beneficiary> {
    let record = state.beneficiaries.get(parse_id(&id)?).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /beneficiaries/:id/ - Replace the mutable fields
pub async fn put(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    payload: Result<Json<BeneficiaryPayload>, JsonRejection>,
) -> ApiResult<Beneficiary> {
    update(state, caller, &id, payload, false).await
}

/// PATCH /beneficiaries/:id/ - Change only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    payload: Result<Json<BeneficiaryPayload>, JsonRejection>,
) -> ApiResult<Beneficiary> {
    update(state, caller, &id, payload, true).await
}

async fn update(
    state: AppState,
    caller: Caller,
    id: &str,
    payload: Result<Json<BeneficiaryPayload>, JsonRejection>,
    partial: bool,
) -> ApiResult<Beneficiary> {
    // Anonymous callers get 401 before the body or id are looked at
    if !caller.is_authenticated() {
        return Err(ApiError::unauthorized("Authentication credentials were not provided"));
    }
    let id = parse_id(id)?;
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            // An unknown id wins over an unreadable body
            state.beneficiaries.get(id).await?;
            return Err(rejection.into());
        }
    };

    let updated = state.beneficiaries.update(&caller, id, &payload, partial).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /beneficiaries/:id/
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    if !caller.is_authenticated() {
        return Err(ApiError::unauthorized("Authentication credentials were not provided"));
    }
    state.beneficiaries.delete(&caller, parse_id(&id)?).await?;
    Ok(ApiResponse::no_content())
}
