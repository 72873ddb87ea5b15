#![allow(dead_code)]

use axum_test::TestServer;
use backend::core::{AppState, Config, Environment, encode_jwt};
use backend::dtos::TokenDTO;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Password di tutti gli utenti in fixtures/users.sql
pub const FIXTURE_PASSWORD: &str = "Password123";

pub const ALICE_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const BOB_ID: &str = "22222222-2222-2222-2222-222222222222";
pub const CAROL_ID: &str = "33333333-3333-3333-3333-333333333333";
pub const ROOT_ID: &str = "44444444-4444-4444-4444-444444444444";

pub const ALICE_ITEM_ID: &str = "aaaaaaaa-0000-0000-0000-000000000001";
pub const BOB_ITEM_ID: &str = "bbbbbbbb-0000-0000-0000-000000000001";

/// Configurazione di test: ambiente locale, SMTP disabilitato
pub fn test_config() -> Config {
    Config {
        environment: Environment::Local,
        secret_key: TEST_SECRET.to_string(),
        first_superuser: "root@example.com".to_string(),
        first_superuser_password: FIXTURE_PASSWORD.to_string(),
        ..Config::default()
    }
}

/// Crea un AppState per i test
pub fn create_test_state(pool: PgPool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, test_config()))
}

/// Crea un TestServer per i test
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = backend::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT di accesso valido per `user_id` senza passare dal login
pub fn create_test_jwt(user_id: &str) -> String {
    let user_id = Uuid::parse_str(user_id).expect("valid uuid");
    encode_jwt(user_id, chrono::Duration::hours(1), TEST_SECRET).expect("Failed to create JWT token")
}

/// Login tramite POST /api/v1/login/access-token, restituisce il token
pub async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/v1/login/access-token")
        .form(&json!({ "username": email, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<TokenDTO>().access_token
}
