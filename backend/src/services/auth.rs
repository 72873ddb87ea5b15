//! Auth services - Login, verifica del token e recupero password

use crate::core::auth::{generate_password_reset_token, verify_password_reset_token};
use crate::core::extract::{Form, Json, Path};
use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{LoginForm, MessageDTO, NewPasswordDTO, TokenDTO, UserDTO};
use crate::email::{EmailError, generate_reset_password_email};
use crate::entities::User;
use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{Html, IntoResponse},
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v1/login/access-token",
    tag = "login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token", body = TokenDTO),
        (status = 400, description = "Incorrect email or password, or inactive user")
    )
)]
#[instrument(skip(state, form), fields(email = %form.username))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>, // OAuth2 password form: username = email
) -> Result<Json<TokenDTO>, AppError> {
    // 1. Cercare l'utente tramite email (il campo del form si chiama username)
    // 2. Se non esiste o la password non corrisponde all'hash, BAD_REQUEST con lo stesso messaggio
    // 3. Se l'utente è disattivato, BAD_REQUEST "Inactive user"
    // 4. Generare il token JWT con scadenza ACCESS_TOKEN_EXPIRE_MINUTES
    debug!("Login attempt");
    let user = state
        .user
        .find_by_email(&form.username)
        .await?
        .filter(|user| user.verify_password(&form.password))
        .ok_or_else(|| {
            warn!("Incorrect email or password");
            AppError::bad_request("Incorrect email or password")
        })?;

    if !user.is_active {
        warn!("Inactive user tried to log in");
        return Err(AppError::bad_request("Inactive user"));
    }

    let expires_in = Duration::minutes(state.config.access_token_expire_minutes);
    let token = encode_jwt(user.id, expires_in, &state.config.secret_key)?;

    info!("User logged in");
    Ok(Json(TokenDTO::bearer(token)))
}

#[utoipa::path(
    post,
    path = "/api/v1/login/test-token",
    tag = "login",
    security(("bearer" = [])),
    responses((status = 200, description = "Current user", body = UserDTO))
)]
pub async fn test_token(Extension(current_user): Extension<User>) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}

#[utoipa::path(
    post,
    path = "/api/v1/password-recovery/{email}",
    tag = "login",
    params(("email" = String, Path, description = "Email of the account to recover")),
    responses(
        (status = 200, description = "Recovery email sent", body = MessageDTO),
        (status = 404, description = "No user with this email")
    )
)]
#[instrument(skip(state))]
pub async fn recover_password(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<MessageDTO>, AppError> {
    let user = state.user.find_by_email(&email).await?.ok_or_else(|| {
        warn!("Password recovery requested for unknown email");
        AppError::not_found("The user with this email does not exist in the system.")
    })?;

    let expires_in = Duration::hours(state.config.email_reset_token_expire_hours);
    let token = generate_password_reset_token(&user.email, expires_in, &state.config.secret_key)?;
    let email_data = generate_reset_password_email(&state.config, &user.email, &token);

    match state.email.send(&user.email, email_data).await {
        Ok(()) => info!("Password recovery email sent"),
        Err(EmailError::Disabled) => warn!("Emails are disabled, recovery email not sent"),
        Err(e) => {
            error!("Failed to send recovery email: {}", e);
            return Err(AppError::internal_server_error("Failed to send email"));
        }
    }

    Ok(Json(MessageDTO::new("Password recovery email sent")))
}

#[utoipa::path(
    post,
    path = "/api/v1/reset-password",
    tag = "login",
    request_body = NewPasswordDTO,
    responses(
        (status = 200, description = "Password updated", body = MessageDTO),
        (status = 400, description = "Invalid token or inactive user"),
        (status = 404, description = "User not found")
    )
)]
#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPasswordDTO>,
) -> Result<Json<MessageDTO>, AppError> {
    body.validate()?;

    let email = verify_password_reset_token(&body.token, &state.config.secret_key)
        .ok_or_else(|| AppError::bad_request("Invalid token"))?;

    let user = state.user.find_by_email(&email).await?.ok_or_else(|| {
        warn!("Reset token for a user that no longer exists");
        AppError::not_found("The user with this email does not exist in the system.")
    })?;

    if !user.is_active {
        return Err(AppError::bad_request("Inactive user"));
    }

    let hashed_password = User::hash_password(&body.new_password)?;
    state.user.update_password(&user.id, &hashed_password).await?;

    info!("Password reset completed");
    Ok(Json(MessageDTO::new("Password updated successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/password-recovery-html-content/{email}",
    tag = "login",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Email of the account to recover")),
    responses(
        (status = 200, description = "Rendered recovery email", content_type = "text/html", body = String),
        (status = 404, description = "No user with this email")
    )
)]
#[instrument(skip(state))]
pub async fn recover_password_html_content(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::not_found("The user with this username does not exist in the system."))?;

    let expires_in = Duration::hours(state.config.email_reset_token_expire_hours);
    let token = generate_password_reset_token(&user.email, expires_in, &state.config.secret_key)?;
    let email_data = generate_reset_password_email(&state.config, &user.email, &token);

    let mut headers = HeaderMap::new();
    headers.insert("subject", subject_header(&email_data.subject));

    Ok((headers, Html(email_data.html_content)))
}

/// Header `subject`: testo invariato se ASCII visibile, altrimenti percent-encoded
fn subject_header(subject: &str) -> HeaderValue {
    HeaderValue::from_str(subject).unwrap_or_else(|_| {
        debug!("Subject is not a valid header value, percent-encoding it");
        // l'output di encode contiene solo caratteri ASCII non riservati e `%XX`
        HeaderValue::from_str(&urlencoding::encode(subject))
            .unwrap_or_else(|_| HeaderValue::from_static("password-recovery"))
    })
}
