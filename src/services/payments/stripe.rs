use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::PaymentConfig;
use crate::services::payments::client::{
    PaymentError, PaymentGateway, PaymentIntent, PaymentResult,
};

/// Stripe-compatible payment intents over HTTPS.
///
/// This is intentionally small: we only create card payment intents and hand the
/// client secret back to the browser.
#[derive(Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    endpoint: Url,
    secret_key: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the secret key
        f.debug_struct("StripeGateway")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let endpoint = config
            .api_base
            .join("v1/payment_intents")
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            secret_key: config.secret_key.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn backend_name(&self) -> &'static str {
        "stripe"
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> PaymentResult<PaymentIntent> {
        let amount = amount_minor.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp
            .json::<PaymentIntentResponse>()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        let client_secret = body
            .client_secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PaymentError::InvalidResponse("missing client_secret".to_string()))?;

        Ok(PaymentIntent { client_secret })
    }
}
