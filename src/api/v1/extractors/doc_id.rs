/*
 * Responsibility
 * - Path の String を DocumentId として受ける
 * - 形式不正は persistence に届く前に 400
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;
use crate::repos::DocumentId;

#[derive(Debug, Clone, Copy)]
pub struct DocId(pub DocumentId);

impl<S> FromRequestParts<S> for DocId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("invalid id"))?;

        DocumentId::parse(&raw)
            .map(DocId)
            .ok_or_else(|| AppError::bad_request("invalid id"))
    }
}
