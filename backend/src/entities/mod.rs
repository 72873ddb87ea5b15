//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod item;
pub mod user;

// Re-exports per facilitare l'import
pub use item::{Item, NewItem};
pub use user::{NewUser, User};
