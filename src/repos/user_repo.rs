/*
 * Responsibility
 * - users コレクションの読み書き
 * - user は email をキーに upsert される (作成と更新を区別しない)
 */
use crate::repos::document::{Collection, Document, DocumentStore, Filter, UpdateResult};
use crate::repos::error::RepoResult;

pub async fn list(store: &dyn DocumentStore) -> RepoResult<Vec<Document>> {
    store.find(Collection::Users, &Filter::all()).await
}

pub async fn get_by_email(store: &dyn DocumentStore, email: &str) -> RepoResult<Option<Document>> {
    store
        .find_one(Collection::Users, &Filter::by_field("email", email))
        .await
}

pub async fn upsert_by_email(
    store: &dyn DocumentStore,
    email: &str,
    fields: Document,
) -> RepoResult<UpdateResult> {
    store
        .update_one(Collection::Users, &Filter::by_field("email", email), fields, true)
        .await
}
