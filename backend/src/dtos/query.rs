//! Query DTOs - parametri di query e risposte generiche

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Paginazione offset/limit: /items?skip=0&limit=100
#[derive(Serialize, Deserialize, Debug, Clone, Copy, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PaginationQuery {
    /// Valori normalizzati: skip non negativo, limit in 1..=MAX_LIMIT
    pub fn bounds(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, MAX_LIMIT))
    }
}

/// /utils/test-email?email_to=...
#[derive(Serialize, Deserialize, Debug, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TestEmailQuery {
    #[validate(email(message = "Invalid email address"))]
    pub email_to: String,
}

/// Risposta generica con un solo messaggio
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct MessageDTO {
    pub message: String,
}

impl MessageDTO {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let q = PaginationQuery {
            skip: -5,
            limit: 10_000,
        };
        assert_eq!(q.bounds(), (0, MAX_LIMIT));

        let q = PaginationQuery { skip: 3, limit: 0 };
        assert_eq!(q.bounds(), (3, 1));
    }

    #[test]
    fn pagination_defaults() {
        let q: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.bounds(), (0, DEFAULT_LIMIT));
    }
}
