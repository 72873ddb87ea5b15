//! Initial data - crea il primo superuser se non esiste

use crate::core::{AppError, AppState};
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use crate::services::user::insert_user;
use tracing::{info, instrument};

/// Idempotente: se FIRST_SUPERUSER è già registrato non fa nulla
#[instrument(skip(state), fields(email = %state.config.first_superuser))]
pub async fn init_db(state: &AppState) -> Result<Option<User>, AppError> {
    let email = &state.config.first_superuser;
    if state.user.find_by_email(email).await?.is_some() {
        info!("First superuser already exists");
        return Ok(None);
    }

    let user = insert_user(
        state,
        CreateUserDTO {
            email: email.clone(),
            password: state.config.first_superuser_password.clone(),
            full_name: None,
            is_active: true,
            is_superuser: true,
        },
    )
    .await?;

    info!("First superuser created with id {}", user.id);
    Ok(Some(user))
}
