use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::Authenticator;
use crate::config::{AppConfig, Environment, SecurityConfig};
use crate::handlers;
use crate::services::BeneficiaryService;

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub beneficiaries: Arc<BeneficiaryService>,
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(beneficiaries: BeneficiaryService, authenticator: Authenticator) -> Self {
        Self {
            beneficiaries: Arc::new(beneficiaries),
            authenticator: Arc::new(authenticator),
        }
    }
}

/// Routes and authentication, without the transport layers.
pub fn router(state: AppState) -> Router {
    let api = Router::new();
    let api = with_trailing_slash(
        api,
        "/beneficiaries",
        get(handlers::beneficiary_list).post(handlers::beneficiary_create),
    );
    let api = with_trailing_slash(
        api,
        "/beneficiaries/create_random",
        post(handlers::beneficiary_create_random),
    );
    let api = with_trailing_slash(
        api,
        "/beneficiaries/:id",
        get(handlers::beneficiary_get)
            .put(handlers::beneficiary_put)
            .patch(handlers::beneficiary_patch)
            .delete(handlers::beneficiary_delete),
    );
    let api = with_trailing_slash(api, "/users/me", get(handlers::user_me));

    api.route_layer(middleware::from_fn_with_state(
        state.clone(),
        crate::middleware::authenticate,
    ))
    // Health stays outside authentication
    .route("/health", get(handlers::health::get))
    .with_state(state)
}

/// Full application: routes plus CORS, tracing and body size limit.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    router(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(build_cors(&config.security, config.environment))
        .layer(TraceLayer::new_for_http())
}

fn with_trailing_slash(
    router: Router<AppState>,
    path: &str,
    method_router: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, method_router.clone())
        .route(&format!("{}/", path), method_router)
}

fn build_cors(security: &SecurityConfig, environment: Environment) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
