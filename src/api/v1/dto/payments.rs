use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    /// Major units (e.g. dollars). Converted to minor units before hitting the processor.
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}
