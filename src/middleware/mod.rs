/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (bearer 検証) はルート単位、それ以外は Router 全体に掛ける
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
