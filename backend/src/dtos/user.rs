//! User DTOs - Data Transfer Objects per utenti
//!
//! I campi condivisi (email, full_name) hanno gli stessi vincoli in tutti i payload:
//! email valida di al massimo 255 caratteri, nome al massimo 255, password 8..=40.

use super::nullable;
use crate::entities::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Rappresentazione pubblica di un utente, senza hash della password
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct UserDTO {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            email: value.email,
            is_active: value.is_active,
            is_superuser: value.is_superuser,
            full_name: value.full_name,
            created_at: value.created_at,
        }
    }
}

/// Pagina di utenti con il conteggio totale
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UsersPageDTO {
    pub data: Vec<UserDTO>,
    pub count: i64,
}

fn default_true() -> bool {
    true
}

/// DTO per creare un utente da parte di un superuser
#[derive(Serialize, Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDTO {
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: String,

    #[validate(length(min = 8, max = 40, message = "Password must be between 8 and 40 characters"))]
    pub password: String,

    #[validate(length(max = 255, message = "Full name must be at most 255 characters"))]
    pub full_name: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_superuser: bool,
}

/// DTO per la registrazione pubblica (signup)
#[derive(Serialize, Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct RegisterUserDTO {
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: String,

    #[validate(length(min = 8, max = 40, message = "Password must be between 8 and 40 characters"))]
    pub password: String,

    #[validate(length(max = 255, message = "Full name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

impl From<RegisterUserDTO> for CreateUserDTO {
    fn from(value: RegisterUserDTO) -> Self {
        Self {
            email: value.email,
            password: value.password,
            full_name: value.full_name,
            is_active: true,
            is_superuser: false,
        }
    }
}

/// DTO per aggiornare un utente (tutti i campi opzionali, quelli assenti restano invariati)
///
/// `"full_name": null` azzera il nome. Quando arriva al repository `password`
/// deve contenere già l'hash.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUserDTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, max = 40, message = "Password must be between 8 and 40 characters"))]
    pub password: Option<String>,

    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255, message = "Full name must be at most 255 characters"))]
    pub full_name: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
}

/// DTO con cui un utente aggiorna il proprio profilo
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateMeDTO {
    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255, message = "Full name must be at most 255 characters"))]
    pub full_name: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: Option<String>,
}

impl From<UpdateMeDTO> for UpdateUserDTO {
    fn from(value: UpdateMeDTO) -> Self {
        Self {
            email: value.email,
            full_name: value.full_name,
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdatePasswordDTO {
    #[validate(length(min = 8, max = 40, message = "Password must be between 8 and 40 characters"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 40, message = "Password must be between 8 and 40 characters"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_user_defaults() {
        let dto: CreateUserDTO = serde_json::from_value(json!({
            "email": "new@example.com",
            "password": "Password123"
        }))
        .unwrap();
        assert!(dto.is_active);
        assert!(!dto.is_superuser);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let dto = RegisterUserDTO {
            email: "new@example.com".to_string(),
            password: "short".to_string(),
            full_name: None,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let dto = UpdateMeDTO {
            full_name: None,
            email: Some("not-an-email".to_string()),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateUserDTO::default().validate().is_ok());
    }

    #[test]
    fn null_full_name_survives_conversion() {
        let dto: UpdateMeDTO = serde_json::from_value(json!({ "full_name": null })).unwrap();
        let update = UpdateUserDTO::from(dto);
        assert_eq!(update.full_name, Some(None));
        assert_eq!(update.email, None);
    }

    #[test]
    fn long_full_name_is_rejected() {
        let dto = UpdateMeDTO {
            full_name: Some(Some("x".repeat(256))),
            email: None,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("full_name"));
    }

    #[test]
    fn public_user_hides_password() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            is_active: true,
            is_superuser: false,
            full_name: Some("A".to_string()),
            hashed_password: "$2b$12$secret".to_string(),
            created_at: Utc::now(),
        };
        let body = serde_json::to_value(UserDTO::from(user)).unwrap();
        assert!(body.get("hashed_password").is_none());
        assert!(body.get("password").is_none());
        assert_eq!(body["email"], "a@example.com");
    }
}
