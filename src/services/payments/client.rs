//! Payment gateway interface used by the payment-intent handler.
use async_trait::async_trait;
use thiserror::Error;

/// Result type for payment operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Payment-layer errors (transport/processor/response shape).
///
/// Note:
/// - We keep this independent from `AppError`; the handler maps every variant to a 500
///   and logs the detail.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment transport error: {0}")]
    Transport(String),
    #[error("payment processor rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("payment response error: {0}")]
    InvalidResponse(String),
}

/// Outcome of creating a payment intent. Only the client secret leaves the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// A minimal payment processor interface.
///
/// Implementations must be cheap to share (`Arc<dyn PaymentGateway>`).
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    // Processor name (for logging).
    fn backend_name(&self) -> &'static str;

    // Create a card payment intent for `amount_minor` (e.g. cents) in `currency`.
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> PaymentResult<PaymentIntent>;
}

/// Convert a major-unit price (e.g. dollars) into minor units (cents).
///
/// Rejects negative, non-finite and absurdly large prices.
pub fn to_minor_units(price: f64) -> Option<i64> {
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    let minor = (price * 100.0).round();
    if minor > i64::MAX as f64 / 2.0 {
        return None;
    }
    Some(minor as i64)
}
