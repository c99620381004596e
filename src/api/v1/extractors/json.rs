use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejection is an `AppError` (JSON body, 400).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
