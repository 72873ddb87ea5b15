//! Item services - CRUD degli item con controllo di proprietà

use crate::core::extract::{Json, Path, Query};
use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateItemDTO, ItemDTO, ItemsPageDTO, MessageDTO, PaginationQuery, UpdateItemDTO,
};
use crate::entities::{Item, NewItem, User};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{Extension, extract::State};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Carica l'item e verifica che `current_user` possa accedervi
async fn load_visible_item(
    state: &AppState,
    item_id: &Uuid,
    current_user: &User,
) -> Result<Item, AppError> {
    let item = state
        .item
        .read(item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;

    if !item.is_visible_to(current_user.id, current_user.is_superuser) {
        warn!("User {} is not the owner of item {}", current_user.id, item.id);
        return Err(AppError::bad_request("Not enough permissions"));
    }
    Ok(item)
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "items",
    security(("bearer" = [])),
    params(PaginationQuery),
    responses((status = 200, description = "Page of items", body = ItemsPageDTO))
)]
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ItemsPageDTO>, AppError> {
    let (skip, limit) = page.bounds();

    // il superuser vede tutti gli item, gli altri solo i propri
    let (count, items) = if current_user.is_superuser {
        tokio::try_join!(state.item.count(), state.item.list(skip, limit))?
    } else {
        tokio::try_join!(
            state.item.count_by_owner(&current_user.id),
            state.item.list_by_owner(&current_user.id, skip, limit)
        )?
    };

    debug!("Listed {} of {} items", items.len(), count);
    Ok(Json(ItemsPageDTO {
        data: items.into_iter().map(ItemDTO::from).collect(),
        count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    tag = "items",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ItemDTO),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Item not found")
    )
)]
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ItemDTO>, AppError> {
    let item = load_visible_item(&state, &id, &current_user).await?;
    Ok(Json(ItemDTO::from(item)))
}

#[utoipa::path(
    post,
    path = "/api/v1/items",
    tag = "items",
    security(("bearer" = [])),
    request_body = CreateItemDTO,
    responses(
        (status = 200, description = "Item created", body = ItemDTO),
        (status = 422, description = "Validation error")
    )
)]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateItemDTO>,
) -> Result<Json<ItemDTO>, AppError> {
    body.validate()?;

    let item = state
        .item
        .create(&NewItem {
            title: body.title,
            description: body.description,
            owner_id: current_user.id,
        })
        .await?;

    info!("Item {} created", item.id);
    Ok(Json(ItemDTO::from(item)))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    tag = "items",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = UpdateItemDTO,
    responses(
        (status = 200, description = "Updated item", body = ItemDTO),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Item not found")
    )
)]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateItemDTO>,
) -> Result<Json<ItemDTO>, AppError> {
    body.validate()?;
    let item = load_visible_item(&state, &id, &current_user).await?;

    let item = state.item.update(&item.id, &body).await?;
    info!("Item {} updated", item.id);
    Ok(Json(ItemDTO::from(item)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    tag = "items",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageDTO),
        (status = 400, description = "Not enough permissions"),
        (status = 404, description = "Item not found")
    )
)]
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MessageDTO>, AppError> {
    let item = load_visible_item(&state, &id, &current_user).await?;

    state.item.delete(&item.id).await?;
    info!("Item {} deleted", item.id);
    Ok(Json(MessageDTO::new("Item deleted successfully")))
}
