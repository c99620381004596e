use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::payments::{PaymentIntentRequest, PaymentIntentResponse},
        extractors::{AppJson, AuthCtxExtractor},
    },
    error::AppError,
    services::payments::client::to_minor_units,
    state::AppState,
};

pub async fn create_payment_intent(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    AppJson(req): AppJson<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let payments = state.payments.as_ref().ok_or(AppError::Unavailable)?;

    let amount = to_minor_units(req.price)
        .ok_or_else(|| AppError::bad_request("price must be a non-negative number"))?;

    let intent = payments
        .gateway
        .create_payment_intent(amount, &payments.currency)
        .await?;

    tracing::info!(by = %ctx.identity, amount, "payment intent created");

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}
