//! User services - Gestione utenti

use crate::core::extract::{Json, Path, Query};
use crate::core::{AppError, AppState, require_superuser};
use crate::dtos::{
    CreateUserDTO, MessageDTO, PaginationQuery, RegisterUserDTO, UpdateMeDTO, UpdatePasswordDTO,
    UpdateUserDTO, UserDTO, UsersPageDTO,
};
use crate::email::generate_new_account_email;
use crate::entities::{NewUser, User};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{Extension, extract::State};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

fn email_already_registered() -> AppError {
    AppError::bad_request("The user with this email already exists in the system.")
}

/// Hash della password e inserimento; BAD_REQUEST se l'email è già registrata
pub(crate) async fn insert_user(state: &AppState, data: CreateUserDTO) -> Result<User, AppError> {
    if state.user.find_by_email(&data.email).await?.is_some() {
        warn!("Email already registered");
        return Err(email_already_registered());
    }

    let hashed_password = User::hash_password(&data.password)?;
    let user = state
        .user
        .create(&NewUser {
            email: data.email,
            hashed_password,
            full_name: data.full_name,
            is_active: data.is_active,
            is_superuser: data.is_superuser,
        })
        .await
        .map_err(|e| match e {
            // due registrazioni concorrenti possono superare entrambe il controllo sopra
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                warn!("Email registered concurrently");
                email_already_registered()
            }
            other => AppError::from(other),
        })?;
    Ok(user)
}

/// CONFLICT se `email` appartiene a un utente diverso da `user_id`
async fn ensure_email_free(state: &AppState, email: &str, user_id: Uuid) -> Result<(), AppError> {
    if let Some(existing) = state.user.find_by_email(email).await? {
        if existing.id != user_id {
            warn!("Email already taken by user {}", existing.id);
            return Err(AppError::conflict("User with this email already exists"));
        }
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer" = [])),
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of users", body = UsersPageDTO),
        (status = 403, description = "Not a superuser")
    )
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PaginationQuery>, // /users?skip=0&limit=100
) -> Result<Json<UsersPageDTO>, AppError> {
    let (skip, limit) = page.bounds();
    let (count, users) = tokio::try_join!(state.user.count(), state.user.list(skip, limit))?;

    info!("Listed {} of {} users", users.len(), count);
    Ok(Json(UsersPageDTO {
        data: users.into_iter().map(UserDTO::from).collect(),
        count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer" = [])),
    request_body = CreateUserDTO,
    responses(
        (status = 200, description = "User created", body = UserDTO),
        (status = 400, description = "Email already registered"),
        (status = 403, description = "Not a superuser")
    )
)]
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    // 1. Validare il DTO (email, lunghezza password e nome)
    // 2. Creare l'utente (errore se l'email esiste già)
    // 3. Se le email sono abilitate, inviare le credenziali al nuovo utente
    body.validate()?;
    let password = body.password.clone();
    let user = insert_user(&state, body).await?;

    if state.email.is_enabled() {
        let email_data = generate_new_account_email(&state.config, &user.email, &password);
        // l'utente è già stato creato: un errore SMTP non deve far fallire la richiesta
        if let Err(e) = state.email.send(&user.email, email_data).await {
            error!("Failed to send new account email: {}", e);
        }
    }

    Ok(Json(UserDTO::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses((status = 200, description = "Current user", body = UserDTO))
)]
pub async fn get_me(Extension(current_user): Extension<User>) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    request_body = UpdateMeDTO,
    responses(
        (status = 200, description = "Updated user", body = UserDTO),
        (status = 409, description = "Email already taken")
    )
)]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateMeDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;
    if let Some(email) = &body.email {
        ensure_email_free(&state, email, current_user.id).await?;
    }

    let user = state
        .user
        .update(&current_user.id, &UpdateUserDTO::from(body))
        .await?;
    info!("Profile updated");
    Ok(Json(UserDTO::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/me/password",
    tag = "users",
    security(("bearer" = [])),
    request_body = UpdatePasswordDTO,
    responses(
        (status = 200, description = "Password updated", body = MessageDTO),
        (status = 400, description = "Incorrect current password or unchanged password")
    )
)]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn update_my_password(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdatePasswordDTO>,
) -> Result<Json<MessageDTO>, AppError> {
    body.validate()?;
    if !current_user.verify_password(&body.current_password) {
        warn!("Incorrect current password");
        return Err(AppError::bad_request("Incorrect password"));
    }
    if body.current_password == body.new_password {
        return Err(AppError::bad_request(
            "New password cannot be the same as the current one",
        ));
    }

    let hashed_password = User::hash_password(&body.new_password)?;
    state
        .user
        .update_password(&current_user.id, &hashed_password)
        .await?;
    Ok(Json(MessageDTO::new("Password updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account deleted", body = MessageDTO),
        (status = 403, description = "Superusers cannot delete themselves")
    )
)]
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn delete_my_account(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MessageDTO>, AppError> {
    if current_user.is_superuser {
        warn!("Superuser tried to delete their own account");
        return Err(AppError::forbidden(
            "Super users are not allowed to delete themselves",
        ));
    }

    // gli item dell'utente vengono rimossi da ON DELETE CASCADE
    state.user.delete(&current_user.id).await?;
    info!("Account deleted successfully");
    Ok(Json(MessageDTO::new("User deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/signup",
    tag = "users",
    request_body = RegisterUserDTO,
    responses(
        (status = 200, description = "User registered", body = UserDTO),
        (status = 400, description = "Email already registered")
    )
)]
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;
    let user = insert_user(&state, CreateUserDTO::from(body)).await?;
    info!("User registered with id {}", user.id);
    Ok(Json(UserDTO::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    security(("bearer" = [])),
    params(("user_id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserDTO),
        (status = 403, description = "Not enough privileges"),
        (status = 404, description = "User not found")
    )
)]
#[instrument(skip(state, current_user), fields(user_id = %user_id))]
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>, // parametro dalla URL /users/{user_id}
    Extension(current_user): Extension<User>,
) -> Result<Json<UserDTO>, AppError> {
    // 1. Se l'id è quello dell'utente corrente, restituirlo direttamente
    // 2. Altrimenti serve essere superuser
    // 3. NOT_FOUND se l'utente non esiste
    if user_id == current_user.id {
        return Ok(Json(UserDTO::from(current_user)));
    }
    require_superuser(&current_user)?;

    debug!("Fetching user by ID");
    let user = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserDTO::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    security(("bearer" = [])),
    params(("user_id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserDTO,
    responses(
        (status = 200, description = "Updated user", body = UserDTO),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already taken")
    )
)]
#[instrument(skip(state, body), fields(user_id = %user_id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(mut body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;
    if state.user.read(&user_id).await?.is_none() {
        return Err(AppError::not_found(
            "The user with this id does not exist in the system",
        ));
    }
    if let Some(email) = &body.email {
        ensure_email_free(&state, email, user_id).await?;
    }
    // il repository salva il valore così com'è: va hashata qui
    if let Some(password) = body.password.take() {
        body.password = Some(User::hash_password(&password)?);
    }

    let user = state.user.update(&user_id, &body).await?;
    info!("User updated by superuser");
    Ok(Json(UserDTO::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    security(("bearer" = [])),
    params(("user_id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageDTO),
        (status = 403, description = "Superusers cannot delete themselves"),
        (status = 404, description = "User not found")
    )
)]
#[instrument(skip(state, current_user), fields(user_id = %user_id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MessageDTO>, AppError> {
    let user = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if user.id == current_user.id {
        return Err(AppError::forbidden(
            "Super users are not allowed to delete themselves",
        ));
    }

    state.user.delete(&user.id).await?;
    info!("User deleted by superuser");
    Ok(Json(MessageDTO::new("User deleted successfully")))
}
