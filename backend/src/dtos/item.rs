//! Item DTOs - Data Transfer Objects per item

use super::nullable;
use crate::entities::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ItemDTO {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Item> for ItemDTO {
    fn from(value: Item) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            owner_id: value.owner_id,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ItemsPageDTO {
    pub data: Vec<ItemDTO>,
    pub count: i64,
}

/// DTO per creare un nuovo item (l'owner è sempre l'utente corrente)
#[derive(Serialize, Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateItemDTO {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
}

/// DTO per aggiornare un item (i campi assenti restano invariati)
///
/// `"description": null` azzera la descrizione.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateItemDTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<Option<String>>,
}
