//! Private services - route montate solo con ENVIRONMENT=local

use super::user::insert_user;
use crate::core::extract::Json;
use crate::core::{AppError, AppState};
use crate::dtos::{CreateUserDTO, PrivateCreateUserDTO, UserDTO};
use axum::extract::State;
use std::sync::Arc;
use tracing::{info, instrument};

#[utoipa::path(
    post,
    path = "/api/v1/private/users",
    tag = "private",
    request_body = PrivateCreateUserDTO,
    responses(
        (status = 200, description = "User created", body = UserDTO),
        (status = 400, description = "Email already registered")
    )
)]
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn create_private_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PrivateCreateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    // nessuna validazione oltre all'unicità dell'email
    let user = insert_user(
        &state,
        CreateUserDTO {
            email: body.email,
            password: body.password,
            full_name: Some(body.full_name),
            is_active: true,
            is_superuser: false,
        },
    )
    .await?;

    info!("Private user created with id {}", user.id);
    Ok(Json(UserDTO::from(user)))
}
