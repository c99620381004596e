/*
 * Responsibility
 * - /orders, /myorders, /myorder 系 handler
 * - identity-scoped な一覧は `Owner` を受け取る (= gate 通過済み)
 * - repo の結果はそのまま返す (null / 空配列も含めて)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::orders::MarkPaidRequest,
        extractors::{AppJson, AuthCtxExtractor, DocId, Owner},
    },
    error::AppError,
    repos::{
        Document,
        document::{DeleteResult, InsertOneResult, UpdateResult},
        order_repo,
    },
    state::AppState,
};

pub async fn create_order(
    State(state): State<AppState>,
    AppJson(doc): AppJson<Document>,
) -> Result<Json<InsertOneResult>, AppError> {
    let result = order_repo::create(state.store.as_ref(), doc).await?;
    tracing::info!(order_id = %result.inserted_id, "order placed");
    Ok(Json(result))
}

pub async fn list_orders(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<Document>>, AppError> {
    tracing::debug!(by = %owner.email(), "listing all orders");
    let orders = order_repo::list(state.store.as_ref()).await?;
    Ok(Json(orders))
}

pub async fn my_orders(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<Document>>, AppError> {
    let orders = order_repo::list_by_email(state.store.as_ref(), owner.email()).await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    DocId(id): DocId,
) -> Result<Json<Option<Document>>, AppError> {
    let order = order_repo::get(state.store.as_ref(), id).await?;
    Ok(Json(order))
}

pub async fn mark_order_paid(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    DocId(id): DocId,
    AppJson(req): AppJson<MarkPaidRequest>,
) -> Result<Json<UpdateResult>, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let result =
        order_repo::mark_paid(state.store.as_ref(), id, req.transaction_id.trim()).await?;
    tracing::info!(
        order_id = %id,
        by = %ctx.identity,
        matched = result.matched_count,
        "order marked paid"
    );
    Ok(Json(result))
}

pub async fn delete_order(
    State(state): State<AppState>,
    DocId(id): DocId,
) -> Result<Json<DeleteResult>, AppError> {
    let result = order_repo::delete(state.store.as_ref(), id).await?;
    Ok(Json(result))
}
