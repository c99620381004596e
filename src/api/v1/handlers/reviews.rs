use axum::{Json, extract::State};

use crate::{
    api::v1::extractors::AppJson,
    error::AppError,
    repos::{Document, document::InsertOneResult, review_repo},
    state::AppState,
};

pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, AppError> {
    let reviews = review_repo::list(state.store.as_ref()).await?;
    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<AppState>,
    AppJson(doc): AppJson<Document>,
) -> Result<Json<InsertOneResult>, AppError> {
    let result = review_repo::create(state.store.as_ref(), doc).await?;
    Ok(Json(result))
}
