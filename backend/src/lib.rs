//! Backend library - espone i moduli principali per il binario e per i test

pub mod core;
pub mod dtos;
pub mod email;
pub mod entities;
pub mod initial_data;
pub mod openapi;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, Config, auth, config};
pub use services::root;

use axum::{
    Json, Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut api = Router::new()
        .merge(configure_login_routes(state.clone()))
        .merge(configure_user_routes(state.clone()))
        .merge(configure_item_routes(state.clone()))
        .merge(configure_utils_routes(state.clone()))
        .route("/openapi.json", get(openapi_json));

    // le route private esistono solo in sviluppo locale
    if state.config.environment == crate::core::Environment::Local {
        api = api.merge(configure_private_routes());
    }

    Router::new()
        .route("/", get(root))
        .nest(crate::core::API_V1_STR, api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

/// CORS dalle origini configurate (BACKEND_CORS_ORIGINS + FRONTEND_HOST)
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .all_cors_origins()
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Login, verifica del token e recupero password
fn configure_login_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, superuser_middleware};
    use services::*;

    let public_routes = Router::new()
        .route("/login/access-token", post(login_user))
        .route("/password-recovery/{email}", post(recover_password))
        .route("/reset-password", post(reset_password));

    let auth_routes = Router::new()
        .route("/login/test-token", post(test_token))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // i layer vengono eseguiti dal più esterno: prima autenticazione, poi controllo superuser
    let superuser_routes = Router::new()
        .route(
            "/password-recovery-html-content/{email}",
            post(recover_password_html_content),
        )
        .layer(middleware::from_fn(superuser_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(auth_routes).merge(superuser_routes)
}

/// Configura le routes per la gestione degli utenti
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, superuser_middleware};
    use services::*;

    let public_routes = Router::new().route("/users/signup", post(register_user));

    // GET /users/{id} controlla da solo i privilegi: l'utente può leggere sé stesso
    let auth_routes = Router::new()
        .route(
            "/users/me",
            get(get_me).patch(update_me).delete(delete_my_account),
        )
        .route("/users/me/password", patch(update_my_password))
        .route("/users/{user_id}", get(get_user_by_id))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    let superuser_routes = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", patch(update_user).delete(delete_user))
        .layer(middleware::from_fn(superuser_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(auth_routes).merge(superuser_routes)
}

/// Configura le routes per la gestione degli item
fn configure_item_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_utils_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, superuser_middleware};
    use services::*;

    let public_routes = Router::new().route("/utils/health-check", get(health_check));

    let superuser_routes = Router::new()
        .route("/utils/test-email", post(test_email))
        .layer(middleware::from_fn(superuser_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(superuser_routes)
}

fn configure_private_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new().route("/private/users", post(create_private_user))
}
