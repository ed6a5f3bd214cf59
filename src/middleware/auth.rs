use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::Caller;
use crate::error::ApiError;

/// Resolves the caller for every request and stores it as a [`Caller`]
/// request extension.
///
/// No `Authorization` header, or one using a scheme other than `Bearer`,
/// means an anonymous caller. A malformed bearer header, or a token that
/// fails verification, is rejected with 401 whatever the route.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = match extract_bearer_token(request.headers()) {
        Ok(None) => Caller::Anonymous,
        Ok(Some(token)) => match state.authenticator.verify(&token) {
            Ok(user) => {
                tracing::debug!(username = %user.username, "authenticated request");
                Caller::User(user)
            }
            Err(e) => {
                tracing::warn!(path = %request.uri().path(), "token rejected: {}", e);
                return Err(ApiError::unauthorized("Given token not valid for any token type"));
            }
        },
        Err(msg) => {
            tracing::warn!(path = %request.uri().path(), "{}", msg);
            return Err(ApiError::unauthorized(msg));
        }
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Extract the bearer token, if a Bearer Authorization header was sent.
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    // Other schemes belong to other authenticators; the caller stays anonymous
    let mut parts = auth_str.split_whitespace();
    if parts.next() != Some("Bearer") {
        return Ok(None);
    }
    match (parts.next(), parts.next()) {
        (Some(token), None) => Ok(Some(token.to_string())),
        (None, _) => Err("Empty JWT token".to_string()),
        (Some(_), Some(_)) => {
            Err("Authorization header must contain two space-delimited values".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")), Ok(Some("abc.def.ghi".to_string())));
    }

    #[test]
    fn other_schemes_are_anonymous() {
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")), Ok(None));
        assert_eq!(extract_bearer_token(&headers("Token abc")), Ok(None));
    }

    #[test]
    fn rejects_empty_or_split_bearer_tokens() {
        assert!(extract_bearer_token(&headers("Bearer")).is_err());
        assert!(extract_bearer_token(&headers("Bearer   ")).is_err());
        assert!(extract_bearer_token(&headers("Bearer abc def")).is_err());
    }
}
