/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - request ごとに作られ、永続化されない
 */
use crate::services::auth::{VerifiedAccessToken, VerifiedIdentity};

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `identity` は token の `email` claim
/// - `expires_at` は token の `exp` (unix 秒)。access middleware がログに出す
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: VerifiedIdentity,
    pub expires_at: i64,
}

impl From<VerifiedAccessToken> for AuthCtx {
    fn from(token: VerifiedAccessToken) -> Self {
        Self {
            identity: token.identity,
            expires_at: token.expires_at,
        }
    }
}
