/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - store: DocumentStore, auth: AuthService, payments: PaymentGateway
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - store は composition root (app.rs) が作って閉じる。handler は借りるだけ
 */
use std::sync::Arc;

use crate::repos::DocumentStore;
use crate::services::{auth::AuthService, payments::PaymentGateway};

#[derive(Clone)]
pub struct PaymentState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub currency: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<AuthService>,
    // None when no payment processor is configured
    pub payments: Option<PaymentState>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .field("auth", &self.auth)
            .field(
                "payments",
                &self.payments.as_ref().map(|p| p.gateway.backend_name()),
            )
            .finish()
    }
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<AuthService>,
        payments: Option<PaymentState>,
    ) -> Self {
        Self {
            store,
            auth,
            payments,
        }
    }
}
