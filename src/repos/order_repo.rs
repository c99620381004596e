/*
 * Responsibility
 * - orders コレクションの読み書き
 * - 所有者 (email) での絞り込みは handler 側で gate を通した後にだけ呼ぶ
 */
use serde_json::Value;

use crate::repos::document::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, InsertOneResult,
    UpdateResult,
};
use crate::repos::error::RepoResult;

pub async fn list(store: &dyn DocumentStore) -> RepoResult<Vec<Document>> {
    store.find(Collection::Orders, &Filter::all()).await
}

pub async fn list_by_email(store: &dyn DocumentStore, email: &str) -> RepoResult<Vec<Document>> {
    store
        .find(Collection::Orders, &Filter::by_field("email", email))
        .await
}

pub async fn get(store: &dyn DocumentStore, id: DocumentId) -> RepoResult<Option<Document>> {
    store.find_one(Collection::Orders, &Filter::by_id(id)).await
}

pub async fn create(store: &dyn DocumentStore, doc: Document) -> RepoResult<InsertOneResult> {
    store.insert_one(Collection::Orders, doc).await
}

pub async fn mark_paid(
    store: &dyn DocumentStore,
    id: DocumentId,
    transaction_id: &str,
) -> RepoResult<UpdateResult> {
    let mut set = Document::new();
    set.insert("paid".to_string(), Value::Bool(true));
    set.insert(
        "transactionId".to_string(),
        Value::String(transaction_id.to_string()),
    );

    store
        .update_one(Collection::Orders, &Filter::by_id(id), set, false)
        .await
}

pub async fn delete(store: &dyn DocumentStore, id: DocumentId) -> RepoResult<DeleteResult> {
    store.delete_one(Collection::Orders, &Filter::by_id(id)).await
}
