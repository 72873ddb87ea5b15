//! Integration tests per gli endpoints degli item
//!
//! Test per:
//! - GET/POST /api/v1/items
//! - GET/PUT/DELETE /api/v1/items/{id}

mod common;

#[cfg(test)]
mod item_tests {
    use super::common::*;
    use backend::dtos::{ItemDTO, ItemsPageDTO, MessageDTO};
    use serde_json::json;
    use sqlx::PgPool;

    // ============================================================
    // Test per GET /items - list_items
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_list_items_only_own(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/api/v1/items")
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await;

        response.assert_status_ok();
        let page = response.json::<ItemsPageDTO>();
        assert_eq!(page.count, 2);
        assert!(page.data.iter().all(|i| i.owner_id.to_string() == ALICE_ID));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_list_items_superuser_sees_all(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/api/v1/items")
            .authorization_bearer(create_test_jwt(ROOT_ID))
            .await;

        response.assert_status_ok();
        let page = response.json::<ItemsPageDTO>();
        assert_eq!(page.count, 3);
        assert_eq!(page.data.len(), 3);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_list_items_pagination_keeps_total(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/api/v1/items")
            .add_query_param("skip", 0)
            .add_query_param("limit", 1)
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await;

        response.assert_status_ok();
        let page = response.json::<ItemsPageDTO>();
        assert_eq!(page.count, 2);
        assert_eq!(page.data.len(), 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_list_items_requires_auth(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server.get("/api/v1/items").await.assert_status_unauthorized();
        Ok(())
    }

    // ============================================================
    // Test per GET /items/{id} - get_item
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_get_own_item(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get(&format!("/api/v1/items/{ALICE_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await;

        response.assert_status_ok();
        let item = response.json::<ItemDTO>();
        assert_eq!(item.title, "Alice first");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_get_item_of_other_user(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get(&format!("/api/v1/items/{BOB_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["detail"], "Not enough permissions");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_get_item_of_other_user_as_superuser(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get(&format!("/api/v1/items/{BOB_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ROOT_ID))
            .await;

        response.assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_get_missing_item(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/api/v1/items/99999999-9999-9999-9999-999999999999")
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await;

        response.assert_status_not_found();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["detail"], "Item not found");
        Ok(())
    }

    // ============================================================
    // Test per POST/PUT/DELETE
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_create_item(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/v1/items")
            .authorization_bearer(create_test_jwt(BOB_ID))
            .json(&json!({ "title": "Groceries", "description": "milk, eggs" }))
            .await;

        response.assert_status_ok();
        let item = response.json::<ItemDTO>();
        assert_eq!(item.title, "Groceries");
        assert_eq!(item.owner_id.to_string(), BOB_ID);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_create_item_empty_title(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/v1/items")
            .authorization_bearer(create_test_jwt(BOB_ID))
            .json(&json!({ "title": "" }))
            .await;

        response.assert_status_unprocessable_entity();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_update_own_item(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .put(&format!("/api/v1/items/{ALICE_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .json(&json!({ "title": "Renamed" }))
            .await;

        response.assert_status_ok();
        let item = response.json::<ItemDTO>();
        assert_eq!(item.title, "Renamed");
        assert_eq!(item.description.as_deref(), Some("first item of alice"));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_update_item_clears_description(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .put(&format!("/api/v1/items/{ALICE_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .json(&json!({ "description": null }))
            .await;

        response.assert_status_ok();
        let item = response.json::<ItemDTO>();
        assert_eq!(item.description, None);
        assert_ne!(item.title, "");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_update_item_null_title_keeps_title(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        // il titolo non è nullable: null equivale a campo assente
        let response = server
            .put(&format!("/api/v1/items/{ALICE_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .json(&json!({ "title": null }))
            .await;

        response.assert_status_unprocessable_entity();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_update_item_of_other_user(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .put(&format!("/api/v1/items/{BOB_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .json(&json!({ "title": "Mine now" }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_delete_own_item(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .delete(&format!("/api/v1/items/{ALICE_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<MessageDTO>().message,
            "Item deleted successfully"
        );

        server
            .get(&format!("/api/v1/items/{ALICE_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_delete_item_of_other_user(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .delete(&format!("/api/v1/items/{BOB_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ALICE_ID))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "items")))]
    async fn test_delete_item_as_superuser(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .delete(&format!("/api/v1/items/{BOB_ITEM_ID}"))
            .authorization_bearer(create_test_jwt(ROOT_ID))
            .await;

        response.assert_status_ok();
        Ok(())
    }
}
