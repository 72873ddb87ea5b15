//! Private DTOs - usati solo dalle route disponibili in ambiente locale

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PrivateCreateUserDTO {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub is_verified: bool,
}
