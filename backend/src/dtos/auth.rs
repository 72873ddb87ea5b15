//! Auth DTOs - login, token e reset della password

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Form OAuth2 "password": `username` contiene l'email
#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TokenDTO {
    pub access_token: String,
    pub token_type: String,
}

impl TokenDTO {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct NewPasswordDTO {
    pub token: String,

    #[validate(length(min = 8, max = 40, message = "Password must be between 8 and 40 characters"))]
    pub new_password: String,
}
