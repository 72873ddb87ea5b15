use crate::core::{AppError, AppState};
use crate::entities::User;
use crate::repositories::Read;
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::HeaderMap, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// struct che codifica il contenuto del token jwt di accesso
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub sub: String, // user id
}

// token per il reset della password: il subject è l'email
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub exp: usize,
    pub nbf: usize,
    pub sub: String,
}

#[instrument(skip(secret), fields(user_id = %user_id))]
pub fn encode_jwt(
    user_id: Uuid,
    expires_in: Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let claim = Claims {
        iat: now.timestamp() as usize,
        exp: (now + expires_in).timestamp() as usize,
        sub: user_id.to_string(),
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .inspect(|_| info!("JWT token encoded successfully"))
    .inspect_err(|e| error!("Failed to encode JWT token: {:?}", e))
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(
    jwt_token: &str,
    secret: &str,
) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .inspect(|data| debug!("JWT token decoded for subject {}", data.claims.sub))
}

#[instrument(skip(secret))]
pub fn generate_password_reset_token(
    email: &str,
    expires_in: Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = ResetClaims {
        nbf: now.timestamp() as usize,
        exp: (now + expires_in).timestamp() as usize,
        sub: email.to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

/// Restituisce l'email contenuta nel token se firma e scadenza sono valide
#[instrument(skip(token, secret))]
pub fn verify_password_reset_token(token: &str, secret: &str) -> Option<String> {
    let mut validation = Validation::default();
    validation.validate_nbf = true;
    match decode::<ResetClaims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            warn!("Invalid password reset token: {:?}", e);
            None
        }
    }
}

/// Estrae il token da `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            Some(token.to_string())
        }
        _ => None,
    }
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = bearer_token(req.headers()).ok_or_else(|| {
        warn!("Missing or malformed authorization header");
        AppError::unauthorized("Not authenticated")
    })?;

    let token_data = decode_jwt(&token, &state.config.secret_key).map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        AppError::forbidden("Could not validate credentials")
    })?;

    let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| {
        warn!("Token subject is not a user id");
        AppError::forbidden("Could not validate credentials")
    })?;

    // Fetch the user details from the database
    let current_user = state.user.read(&user_id).await?.ok_or_else(|| {
        warn!("User not found in database: {}", user_id);
        AppError::not_found("User not found")
    })?;

    if !current_user.is_active {
        warn!("Inactive user tried to authenticate: {}", user_id);
        return Err(AppError::bad_request("Inactive user"));
    }

    info!("User authenticated: {}", current_user.email);
    // l'utente si recupera negli handler con Extension<User>
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Middleware che lascia passare solo i superuser.
/// Va applicato dopo `authentication_middleware` (layer più interno).
#[instrument(skip(req, next))]
pub async fn superuser_middleware(req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let current_user = req.extensions().get::<User>().ok_or_else(|| {
        warn!("User not found in request extensions");
        AppError::unauthorized("Not authenticated")
    })?;

    require_superuser(current_user)?;
    Ok(next.run(req).await)
}

pub fn require_superuser(user: &User) -> Result<(), AppError> {
    if !user.is_superuser {
        warn!("User {} is not a superuser", user.id);
        return Err(AppError::forbidden(
            "The user doesn't have enough privileges",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trip() {
        let id = Uuid::new_v4();
        let token = encode_jwt(id, Duration::minutes(5), SECRET).unwrap();
        let data = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(data.claims.sub, id.to_string());
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn access_token_with_wrong_secret_fails() {
        let token = encode_jwt(Uuid::new_v4(), Duration::minutes(5), SECRET).unwrap();
        assert!(decode_jwt(&token, "another-secret").is_err());
    }

    #[test]
    fn expired_access_token_fails() {
        let token = encode_jwt(Uuid::new_v4(), Duration::hours(-2), SECRET).unwrap();
        assert!(decode_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn reset_token_carries_email() {
        let token =
            generate_password_reset_token("someone@example.com", Duration::hours(48), SECRET)
                .unwrap();
        assert_eq!(
            verify_password_reset_token(&token, SECRET).as_deref(),
            Some("someone@example.com")
        );
        assert!(verify_password_reset_token(&token, "wrong").is_none());
        assert!(verify_password_reset_token("garbage", SECRET).is_none());
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def"),
        );
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic abc"),
        );
        assert_eq!(bearer_token(&headers), None);
    }
}
