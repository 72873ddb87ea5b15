//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod item;
pub mod private;
pub mod user;
pub mod utils;

// Re-exports per facilitare l'import
pub use auth::{
    login_user, recover_password, recover_password_html_content, reset_password, test_token,
};
pub use item::{create_item, delete_item, get_item, list_items, update_item};
pub use private::create_private_user;
pub use user::{
    create_user, delete_my_account, delete_user, get_me, get_user_by_id, list_users,
    register_user, update_me, update_my_password, update_user,
};
pub use utils::{health_check, test_email};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - liveness
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
