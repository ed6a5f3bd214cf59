use axum::Extension;
use serde::Serialize;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub username: String,
    pub email: Option<String>,
}

/// GET /users/me/ - The authenticated caller's account
pub async fn get(Extension(caller): Extension<Caller>) -> ApiResult<CurrentUser> {
    let user = caller
        .user()
        .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided"))?;

    Ok(ApiResponse::success(CurrentUser {
        username: user.username.clone(),
        email: user.email.clone(),
    }))
}
