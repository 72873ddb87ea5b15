//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod auth;
pub mod item;
pub mod nullable;
pub mod private;
pub mod query;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{LoginForm, NewPasswordDTO, TokenDTO};
pub use item::{CreateItemDTO, ItemDTO, ItemsPageDTO, UpdateItemDTO};
pub use private::PrivateCreateUserDTO;
pub use query::{MessageDTO, PaginationQuery, TestEmailQuery};
pub use user::{
    CreateUserDTO, RegisterUserDTO, UpdateMeDTO, UpdatePasswordDTO, UpdateUserDTO, UserDTO,
    UsersPageDTO,
};
