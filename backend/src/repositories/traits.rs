//! Common repository traits
//!
//! Generic CRUD interfaces shared by every repository. Each operation returns
//! `sqlx::Error` untouched so services can map it to an HTTP status through `AppError`.

/// Insert a new row and return the persisted entity
///
/// `Input` carries everything the database does not generate itself
/// (id and `created_at` are assigned on insert).
pub trait Create<Entity, Input> {
    async fn create(&self, data: &Input) -> Result<Entity, sqlx::Error>;
}

/// Read a single entity by primary key
///
/// Returns `Ok(None)` when no row matches.
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Partial update: only the `Some(_)` fields of `Changes` are written
///
/// Returns `sqlx::Error::RowNotFound` when the entity does not exist.
pub trait Update<Entity, Changes, Id> {
    async fn update(&self, id: &Id, data: &Changes) -> Result<Entity, sqlx::Error>;
}

/// Delete an entity by primary key
///
/// Returns `sqlx::Error::RowNotFound` when nothing was deleted.
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
