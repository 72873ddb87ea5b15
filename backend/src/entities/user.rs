//! User entity - Entità utente con metodi per gestione password

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
    /// Hash bcrypt, mai esposto al client (vedi `UserDTO`)
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// Riga da inserire: la password è già hashata
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.hashed_password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(hashed_password: String) -> User {
        User {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            is_active: true,
            is_superuser: false,
            full_name: None,
            hashed_password,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hashed_password_verifies() {
        let hashed = User::hash_password("Password123").unwrap();
        assert_ne!(hashed, "Password123");
        let user = user_with_hash(hashed);
        assert!(user.verify_password("Password123"));
        assert!(!user.verify_password("password123"));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let user = user_with_hash("not-a-bcrypt-hash".to_string());
        assert!(!user.verify_password("not-a-bcrypt-hash"));
    }
}
