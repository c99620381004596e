/*
 * Responsibility
 * - /user, /users 系 handler
 * - PUT /user/{email} は upsert 後に token を発行する (identity が作られる唯一の場所)
 * - user 一覧は `Owner` を受け取る (= gate 通過済み)
 */
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    api::v1::{
        dto::users::{EmailQuery, UpsertUserResponse},
        extractors::{AppJson, Owner},
    },
    error::AppError,
    repos::{Document, document::UpdateResult, user_repo},
    state::AppState,
};

pub async fn upsert_user_with_token(
    State(state): State<AppState>,
    Path(email): Path<String>,
    AppJson(fields): AppJson<Document>,
) -> Result<Json<UpsertUserResponse>, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::bad_request("email is required"));
    }

    let result = user_repo::upsert_by_email(state.store.as_ref(), email, fields).await?;
    let token = state.auth.issuer().issue_access_token(email)?;

    tracing::info!(
        upserted = result.upserted_count,
        matched = result.matched_count,
        "user upserted, token issued"
    );

    Ok(Json(UpsertUserResponse { result, token }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Option<Document>>, AppError> {
    let email = query.require().map_err(AppError::bad_request)?;
    let user = user_repo::get_by_email(state.store.as_ref(), email).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
    AppJson(fields): AppJson<Document>,
) -> Result<Json<UpdateResult>, AppError> {
    let email = query.require().map_err(AppError::bad_request)?;
    let result = user_repo::upsert_by_email(state.store.as_ref(), email, fields).await?;
    Ok(Json(result))
}

pub async fn list_users(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<Document>>, AppError> {
    tracing::debug!(by = %owner.email(), "listing all users");
    let users = user_repo::list(state.store.as_ref()).await?;
    Ok(Json(users))
}
