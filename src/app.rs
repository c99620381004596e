/*
 * Responsibility
 * - Config読み込み → 依存生成 (store / auth / payments) → Router 組み立て
 * - Middleware の適用 (HTTP / CORS / security headers)
 * - axum::serve() で起動し、停止時に store を明示的に閉じる
 */
use std::{panic, process, sync::Arc};

use axum::Router;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, StoreBackend};
use crate::middleware::{cors, http, security_headers};
use crate::repos::{DocumentStore, MemoryDocumentStore, PgDocumentStore, error::RepoResult};
use crate::services::auth::build_auth_service;
use crate::services::payments::{PaymentError, PaymentGateway, StripeGateway};
use crate::state::{AppState, PaymentState};

// Prefer RUST_LOG if set; otherwise use a sensible default.
// Ex:
// RUST_LOG=info,mason_tools=debug,tower_http=debug cargo run
fn log_filter<F>(lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>,
{
    lookup(EnvFilter::DEFAULT_ENV)
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info,tower_http=info"))
}

fn init_tracing(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> anyhow::Result<()> {
    // .env must be loaded before the log filter reads RUST_LOG
    dotenvy::dotenv().ok();
    init_tracing(log_filter(|key| std::env::var(key).ok()));
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let store = connect_store(&config).await?;
    let state = build_state(&config, store.clone())?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("Server is running at port {}", config.addr.port());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // The store outlives every request; close it only after serve() has drained.
    store.close().await;
    tracing::info!("document store closed");

    served?;
    Ok(())
}

pub async fn connect_store(config: &Config) -> RepoResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreBackend::Postgres(url) => {
            Arc::new(PgDocumentStore::connect(url, config.database_max_connections).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory document store; data is lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    tracing::info!(backend = store.backend_name(), "document store ready");
    Ok(store)
}

/// Build process-level services and inject them into the shared application state.
pub fn build_state(
    config: &Config,
    store: Arc<dyn DocumentStore>,
) -> Result<AppState, PaymentError> {
    let auth = build_auth_service(config);

    let payments = match &config.payment {
        Some(payment) => {
            let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(payment)?);
            Some(PaymentState {
                gateway,
                currency: payment.currency.clone(),
            })
        }
        None => {
            tracing::info!("PAYMENT_SECRET_KEY not set; payment intents disabled");
            None
        }
    };

    Ok(AppState::new(store, auth, payments))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .merge(api::v1::routes(&state))
        .with_state(state);

    let router = security_headers::apply(router);
    let router = cors::apply(router, config);
    http::apply(router, config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
