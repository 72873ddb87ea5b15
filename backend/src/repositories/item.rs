//! ItemRepository - Repository per la gestione degli item

use super::{Create, Delete, PoolType, Read, Update};
use crate::dtos::UpdateItemDTO;
use crate::entities::{Item, NewItem};
use sqlx::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "id, title, description, owner_id, created_at";

// ITEM REPOSITORY
pub struct ItemRepository {
    connection_pool: PoolType,
}

impl ItemRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Tutti gli item (vista superuser), dal più recente
    #[instrument(skip(self))]
    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Item>, Error> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at DESC, id OFFSET $1 LIMIT $2"
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Fetched {} items", items.len());
        Ok(items)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items")
            .fetch_one(&self.connection_pool)
            .await
    }

    /// Solo gli item di `owner_id`
    #[instrument(skip(self))]
    pub async fn list_by_owner(
        &self,
        owner_id: &Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Item>, Error> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM items
            WHERE owner_id = $1
            ORDER BY created_at DESC, id
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(owner_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Fetched {} items for owner", items.len());
        Ok(items)
    }

    pub async fn count_by_owner(&self, owner_id: &Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Create<Item, NewItem> for ItemRepository {
    #[instrument(skip(self, data), fields(owner_id = %data.owner_id))]
    async fn create(&self, data: &NewItem) -> Result<Item, Error> {
        debug!("Creating new item");
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (id, title, description, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.owner_id)
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Item created with id {}", item.id);
        Ok(item)
    }
}

impl Read<Item, Uuid> for ItemRepository {
    async fn read(&self, id: &Uuid) -> Result<Option<Item>, Error> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(item)
    }
}

impl Update<Item, UpdateItemDTO, Uuid> for ItemRepository {
    #[instrument(skip(self, data))]
    async fn update(&self, id: &Uuid, data: &UpdateItemDTO) -> Result<Item, Error> {
        debug!("Updating item");
        // description: $3 indica se il campo è presente, $4 è il nuovo valore (anche NULL)
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&data.title)
        .bind(data.description.is_some())
        .bind(data.description.as_ref().and_then(|v| v.as_deref()))
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)?;

        info!("Item updated");
        Ok(item)
    }
}

impl Delete<Uuid> for ItemRepository {
    #[instrument(skip(self))]
    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Item deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    // Gli utenti vengono dal fixture users.sql
    const ALICE: &str = "11111111-1111-1111-1111-111111111111";
    const BOB: &str = "22222222-2222-2222-2222-222222222222";

    fn uuid(raw: &str) -> Uuid {
        Uuid::parse_str(raw).unwrap()
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "items")))]
    async fn test_owner_filter(pool: PgPool) -> sqlx::Result<()> {
        let repo = ItemRepository::new(pool);

        let alice_items = repo.list_by_owner(&uuid(ALICE), 0, 100).await?;
        assert!(alice_items.iter().all(|i| i.owner_id == uuid(ALICE)));
        assert_eq!(repo.count_by_owner(&uuid(ALICE)).await?, alice_items.len() as i64);

        let all = repo.list(0, 100).await?;
        assert_eq!(repo.count().await?, all.len() as i64);
        assert!(all.len() > alice_items.len());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_create_update_delete(pool: PgPool) -> sqlx::Result<()> {
        let repo = ItemRepository::new(pool);
        let item = repo
            .create(&NewItem {
                title: "Groceries".to_string(),
                description: Some("milk".to_string()),
                owner_id: uuid(BOB),
            })
            .await?;

        let updated = repo
            .update(
                &item.id,
                &UpdateItemDTO {
                    title: Some("Shopping".to_string()),
                    description: None,
                },
            )
            .await?;
        assert_eq!(updated.title, "Shopping");
        assert_eq!(updated.description.as_deref(), Some("milk"));

        let cleared = repo
            .update(
                &item.id,
                &UpdateItemDTO {
                    title: None,
                    description: Some(None),
                },
            )
            .await?;
        assert_eq!(cleared.title, "Shopping");
        assert_eq!(cleared.description, None);

        repo.delete(&item.id).await?;
        assert!(repo.read(&item.id).await?.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_pagination(pool: PgPool) -> sqlx::Result<()> {
        let repo = ItemRepository::new(pool);
        for n in 0..5 {
            repo.create(&NewItem {
                title: format!("item {n}"),
                description: None,
                owner_id: uuid(BOB),
            })
            .await?;
        }

        let page = repo.list_by_owner(&uuid(BOB), 2, 2).await?;
        assert_eq!(page.len(), 2);
        let rest = repo.list_by_owner(&uuid(BOB), 4, 10).await?;
        assert_eq!(rest.len(), 1);
        Ok(())
    }
}
