mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

#[tokio::test]
async fn invalid_token_rejected_on_create() -> Result<()> {
    let app = common::test_app();

    let (status, body) = app
        .send(
            Method::POST,
            "/beneficiaries/",
            Some("invalid auth"),
            Some(json!({"name": "Jane Doe", "avatar_url": "https://example.com/avatar.jpg"})),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    // Nothing was written
    let (_, list) = app.get("/beneficiaries/").await?;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn invalid_token_rejected_on_public_reads() -> Result<()> {
    let app = common::test_app();
    let (status, _) = app.send(Method::GET, "/beneficiaries/", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_rejected() -> Result<()> {
    let app = common::test_app();
    let foreign = beneficiary_api::auth::Authenticator::new("someone-else", 1).issue("mallory", None)?;
    let (status, _) = app.send(Method::GET, "/users/me/", Some(&foreign), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_anonymous() -> Result<()> {
    let app = common::test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/beneficiaries/")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())?;
    let (status, _) = app.send_raw(request).await?;
    assert_eq!(status, StatusCode::OK);

    // Still anonymous, so routes that need a user refuse it
    let request = Request::builder()
        .method(Method::GET)
        .uri("/users/me/")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())?;
    let (status, _) = app.send_raw(request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn empty_bearer_token_rejected() -> Result<()> {
    let app = common::test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/beneficiaries/")
        .header(header::AUTHORIZATION, "Bearer")
        .body(Body::empty())?;
    let (status, _) = app.send_raw(request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn health_ignores_credentials() -> Result<()> {
    let app = common::test_app();
    let (status, body) = app.send(Method::GET, "/health", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}
