/*
 * Responsibility
 * - URL 構造とルートごとのアクセス要件 (Access) を一か所で宣言する
 * - Authenticated / Owner のルートにだけ bearer 検証 (middleware::auth::access) を掛ける
 * - Owner のルートは handler 側で `Owner` extractor を受け取り、gate を通す
 */
use axum::{
    Router,
    routing::{MethodRouter, get, patch, post, put},
};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::{health, root},
    orders::{create_order, delete_order, get_order, list_orders, mark_order_paid, my_orders},
    payments::create_payment_intent,
    reviews::{create_review, list_reviews},
    tools::{create_tool, get_tool, list_tools},
    users::{get_user, list_users, update_user, upsert_user_with_token},
};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anonymous callers allowed.
    Public,
    /// Requires a valid bearer token.
    Authenticated,
    /// Requires a valid bearer token whose identity equals the claimed one.
    Owner,
}

fn gated(access: Access, route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    match access {
        Access::Public => route,
        Access::Authenticated | Access::Owner => access::guard(route, state),
    }
}

pub fn routes(state: &AppState) -> Router<AppState> {
    use Access::*;

    Router::new()
        .route("/", gated(Public, get(root), state))
        .route("/health", gated(Public, get(health), state))
        .route("/tools", gated(Public, get(list_tools), state))
        .route("/tool", gated(Authenticated, post(create_tool), state))
        .route("/tool/{id}", gated(Public, get(get_tool), state))
        .route(
            "/orders",
            gated(Public, post(create_order), state).merge(gated(Owner, get(list_orders), state)),
        )
        .route("/myorders", gated(Owner, get(my_orders), state))
        .route(
            "/myorder/{id}",
            gated(Public, get(get_order).delete(delete_order), state)
                .merge(gated(Authenticated, patch(mark_order_paid), state)),
        )
        .route("/reviews", gated(Public, get(list_reviews), state))
        .route("/review", gated(Public, post(create_review), state))
        .route("/user/{email}", gated(Public, put(upsert_user_with_token), state))
        .route("/user", gated(Public, get(get_user).put(update_user), state))
        .route("/users", gated(Owner, get(list_users), state))
        .route(
            "/create-payment-intent",
            gated(Authenticated, post(create_payment_intent), state),
        )
}
