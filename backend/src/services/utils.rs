//! Utils services - email di prova e health check

use crate::core::extract::{Json, Query};
use crate::core::{AppError, AppState};
use crate::dtos::{MessageDTO, TestEmailQuery};
use crate::email::{EmailError, generate_test_email};
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v1/utils/test-email",
    tag = "utils",
    security(("bearer" = [])),
    params(TestEmailQuery),
    responses(
        (status = 201, description = "Test email sent", body = MessageDTO),
        (status = 403, description = "Not a superuser"),
        (status = 503, description = "Emails are not enabled")
    )
)]
#[instrument(skip(state, query), fields(email_to = %query.email_to))]
pub async fn test_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TestEmailQuery>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    query.validate()?;

    let email_data = generate_test_email(&state.config, &query.email_to);
    match state.email.send(&query.email_to, email_data).await {
        Ok(()) => {
            info!("Test email sent");
            Ok((StatusCode::CREATED, Json(MessageDTO::new("Test email sent"))))
        }
        Err(EmailError::Disabled) => {
            warn!("Test email requested but emails are disabled");
            Err(AppError::service_unavailable("Emails are not enabled"))
        }
        Err(e) => {
            error!("Failed to send test email: {}", e);
            Err(AppError::internal_server_error("Failed to send email"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/utils/health-check",
    tag = "utils",
    responses((status = 200, description = "Service is up", body = bool))
)]
pub async fn health_check() -> Json<bool> {
    Json(true)
}
