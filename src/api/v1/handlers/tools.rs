/*
 * Responsibility
 * - /tools, /tool 系 handler
 * - 一覧・単体取得は公開。追加は Access::Authenticated
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::extractors::{AppJson, AuthCtxExtractor, DocId},
    error::AppError,
    repos::{Document, document::InsertOneResult, tool_repo},
    state::AppState,
};

pub async fn list_tools(State(state): State<AppState>) -> Result<Json<Vec<Document>>, AppError> {
    let tools = tool_repo::list(state.store.as_ref()).await?;
    Ok(Json(tools))
}

/// `null` when no tool has this id.
pub async fn get_tool(
    State(state): State<AppState>,
    DocId(id): DocId,
) -> Result<Json<Option<Document>>, AppError> {
    let tool = tool_repo::get(state.store.as_ref(), id).await?;
    Ok(Json(tool))
}

pub async fn create_tool(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    AppJson(doc): AppJson<Document>,
) -> Result<Json<InsertOneResult>, AppError> {
    let result = tool_repo::create(state.store.as_ref(), doc).await?;
    tracing::info!(tool_id = %result.inserted_id, by = %ctx.identity, "tool created");
    Ok(Json(result))
}
