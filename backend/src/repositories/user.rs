//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Delete, PoolType, Read, Update};
use crate::dtos::UpdateUserDTO;
use crate::entities::{NewUser, User};
use sqlx::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, is_active, is_superuser, full_name, hashed_password, created_at";

// USER REPO
pub struct UserRepository {
    connection_pool: PoolType,
}

impl UserRepository {
    pub fn new(connection_pool: PoolType) -> UserRepository {
        Self { connection_pool }
    }

    /// L'email è univoca (vincolo UNIQUE su users.email)
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        debug!("Finding user by email");
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    /// Pagina di utenti, dal più recente
    #[instrument(skip(self))]
    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id OFFSET $1 LIMIT $2"
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.connection_pool)
            .await
    }

    /// Sostituisce l'hash della password
    #[instrument(skip(self, hashed_password))]
    pub async fn update_password(&self, id: &Uuid, hashed_password: &str) -> Result<(), Error> {
        let result = sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
            .bind(hashed_password)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Password updated");
        Ok(())
    }
}

impl Create<User, NewUser> for UserRepository {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create(&self, data: &NewUser) -> Result<User, Error> {
        debug!("Creating new user");
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, is_active, is_superuser, full_name, hashed_password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(data.is_active)
        .bind(data.is_superuser)
        .bind(&data.full_name)
        .bind(&data.hashed_password)
        .fetch_one(&self.connection_pool)
        .await?;

        info!("User created with id {}", user.id);
        Ok(user)
    }
}

impl Read<User, Uuid> for UserRepository {
    async fn read(&self, id: &Uuid) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Update<User, UpdateUserDTO, Uuid> for UserRepository {
    /// `data.password`, se presente, deve essere già hashata dal service
    #[instrument(skip(self, data))]
    async fn update(&self, id: &Uuid, data: &UpdateUserDTO) -> Result<User, Error> {
        debug!("Updating user");
        // COALESCE lascia invariati i campi non forniti; full_name è nullable,
        // quindi $4 indica se è presente e $5 porta il valore (anche NULL)
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                hashed_password = COALESCE($3, hashed_password),
                full_name = CASE WHEN $4 THEN $5 ELSE full_name END,
                is_active = COALESCE($6, is_active),
                is_superuser = COALESCE($7, is_superuser)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&data.email)
        .bind(&data.password)
        .bind(data.full_name.is_some())
        .bind(data.full_name.as_ref().and_then(|v| v.as_deref()))
        .bind(data.is_active)
        .bind(data.is_superuser)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)?;

        info!("User updated");
        Ok(user)
    }
}

impl Delete<Uuid> for UserRepository {
    /// Gli item dell'utente vengono cancellati da ON DELETE CASCADE
    #[instrument(skip(self))]
    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            hashed_password: "hash".to_string(),
            full_name: Some("Test User".to_string()),
            is_active: true,
            is_superuser: false,
        }
    }

    #[sqlx::test]
    async fn test_create_and_read(pool: PgPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);
        let created = repo.create(&new_user("repo@example.com")).await?;

        let read = repo.read(&created.id).await?.expect("user should exist");
        assert_eq!(read, created);
        assert_eq!(read.email, "repo@example.com");

        let by_email = repo.find_by_email("repo@example.com").await?;
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
        Ok(())
    }

    #[sqlx::test]
    async fn test_partial_update_keeps_other_fields(pool: PgPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);
        let created = repo.create(&new_user("partial@example.com")).await?;

        let changes = UpdateUserDTO {
            full_name: Some(Some("Renamed".to_string())),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &changes).await?;

        assert_eq!(updated.full_name.as_deref(), Some("Renamed"));
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.hashed_password, created.hashed_password);
        Ok(())
    }

    #[sqlx::test]
    async fn test_update_clears_full_name(pool: PgPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);
        let created = repo.create(&new_user("clear@example.com")).await?;
        assert!(created.full_name.is_some());

        let changes = UpdateUserDTO {
            full_name: Some(None),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &changes).await?;

        assert_eq!(updated.full_name, None);
        assert_eq!(updated.is_active, created.is_active);
        Ok(())
    }

    #[sqlx::test]
    async fn test_duplicate_email_is_rejected(pool: PgPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);
        repo.create(&new_user("dup@example.com")).await?;

        let err = repo.create(&new_user("dup@example.com")).await.unwrap_err();
        match err {
            Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_missing_user(pool: PgPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);
        let err = repo.delete(&Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::RowNotFound));
        Ok(())
    }
}
