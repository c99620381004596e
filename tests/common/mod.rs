#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

use mason_tools::app::build_router;
use mason_tools::config::Config;
use mason_tools::repos::document::{
    Collection, DeleteResult, Document, DocumentStore, Filter, InsertOneResult, UpdateResult,
};
use mason_tools::repos::error::RepoResult;
use mason_tools::repos::MemoryDocumentStore;
use mason_tools::services::auth::{AuthService, build_auth_service};
use mason_tools::services::payments::client::{PaymentGateway, PaymentIntent, PaymentResult};
use mason_tools::state::{AppState, PaymentState};

pub const SECRET: &str = "integration-secret";

/// Wraps the in-memory store and counts every call that reaches persistence.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryDocumentStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    fn backend_name(&self) -> &'static str {
        "counting"
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> RepoResult<Vec<Document>> {
        self.hit();
        self.inner.find(collection, filter).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> RepoResult<Option<Document>> {
        self.hit();
        self.inner.find_one(collection, filter).await
    }

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> RepoResult<InsertOneResult> {
        self.hit();
        self.inner.insert_one(collection, doc).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> RepoResult<UpdateResult> {
        self.hit();
        self.inner.update_one(collection, filter, set, upsert).await
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> RepoResult<DeleteResult> {
        self.hit();
        self.inner.delete_one(collection, filter).await
    }
}

/// Records requested amounts and hands back a fixed client secret.
#[derive(Debug, Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> PaymentResult<PaymentIntent> {
        self.requests
            .lock()
            .unwrap()
            .push((amount_minor, currency.to_string()));
        Ok(PaymentIntent {
            client_secret: format!("pi_test_{amount_minor}_secret"),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<CountingStore>,
    pub auth: Arc<AuthService>,
    pub gateway: Option<Arc<FakeGateway>>,
}

pub fn test_config() -> Config {
    let env: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "memory://"),
        ("ACCESS_TOKEN", SECRET),
        ("ACCESS_TOKEN_TTL_SECONDS", "600"),
        ("ACCESS_TOKEN_LEEWAY_SECONDS", "0"),
    ]);
    Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap()
}

fn build(with_payments: bool) -> TestApp {
    let config = test_config();
    let store = Arc::new(CountingStore::default());
    let auth = build_auth_service(&config);

    let gateway = with_payments.then(|| Arc::new(FakeGateway::default()));
    let payments = gateway.clone().map(|g| PaymentState {
        gateway: g,
        currency: "usd".to_string(),
    });

    let state = AppState::new(store.clone(), auth.clone(), payments);
    let router = build_router(state, &config);

    TestApp {
        router,
        store,
        auth,
        gateway,
    }
}

impl TestApp {
    pub fn new() -> Self {
        build(false)
    }

    pub fn with_payments() -> Self {
        build(true)
    }

    pub fn token_for(&self, email: &str) -> String {
        self.auth.issuer().issue_access_token(email).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Seed a document straight into the store (not counted as a request call).
    pub async fn seed(&self, collection: Collection, doc: Value) -> String {
        let Value::Object(doc) = doc else {
            panic!("seed expects an object");
        };
        let res = self.store.inner.insert_one(collection, doc).await.unwrap();
        res.inserted_id.to_string()
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn authed(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Sign arbitrary claims with `secret` (for forged/expired token cases).
pub fn sign_with<T: Serialize>(claims: &T, secret: &str) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
