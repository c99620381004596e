//! Bearer token 検証 → AuthCtx を extensions に入れる
//!
//! - token が無い (header 無し / 空) → 401 Unauthenticated
//! - token はあるが署名・形式・期限のどれかが不正 → 403 InvalidToken
//! - 成功時は検証済み identity を AuthCtx として request extensions に載せる
//!
//! 全ルート一律ではなく、routes.rs で `Access` を宣言したルートにだけ掛ける。

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::access_jwt::bearer_token;
use crate::state::AppState;

/// Put the credential verifier in front of every method of `route`.
///
/// ```ignore
/// .route("/myorders", access::guard(get(my_orders), &state))
/// ```
pub fn guard(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        access_middleware,
    ))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw = match req.headers().get(header::AUTHORIZATION) {
        None => {
            tracing::debug!(path = %req.uri().path(), "missing authorization header");
            return Err(AppError::Unauthenticated);
        }
        Some(value) => value.to_str().map_err(|_| {
            tracing::warn!(path = %req.uri().path(), "authorization header is not visible ASCII");
            AppError::InvalidToken
        })?,
    };

    let token = bearer_token(Some(raw)).ok_or(AppError::Unauthenticated)?;

    // 署名 + exp + email claim の検証 (同期; await しない)
    let verified = match state.auth.verifier().verify_verified(token) {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %req.uri().path(),
                "access token verification failed"
            );
            return Err(AppError::InvalidToken);
        }
    };

    let ctx = AuthCtx::from(verified);
    tracing::debug!(
        identity = %ctx.identity,
        expires_at = ctx.expires_at,
        path = %req.uri().path(),
        "access token accepted"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
