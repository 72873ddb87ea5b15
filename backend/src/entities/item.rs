//! Item entity - Entità item, appartiene sempre a un utente (owner_id)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
}

impl Item {
    /// L'owner e i superuser possono vedere e modificare l'item
    pub fn is_visible_to(&self, user_id: Uuid, is_superuser: bool) -> bool {
        is_superuser || self.owner_id == user_id
    }
}
