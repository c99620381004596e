/*
 * Responsibility
 * - Orders の request DTO (支払い済みマーク)
 */
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidRequest {
    pub transaction_id: String,
}

impl MarkPaidRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.transaction_id.trim().is_empty() {
            return Err("transactionId is required");
        }
        Ok(())
    }
}
