/*
 * Responsibility
 * - tools コレクションの読み書き
 */
use crate::repos::document::{
    Collection, Document, DocumentId, DocumentStore, Filter, InsertOneResult,
};
use crate::repos::error::RepoResult;

pub async fn list(store: &dyn DocumentStore) -> RepoResult<Vec<Document>> {
    store.find(Collection::Tools, &Filter::all()).await
}

pub async fn get(store: &dyn DocumentStore, id: DocumentId) -> RepoResult<Option<Document>> {
    store.find_one(Collection::Tools, &Filter::by_id(id)).await
}

pub async fn create(store: &dyn DocumentStore, doc: Document) -> RepoResult<InsertOneResult> {
    store.insert_one(Collection::Tools, doc).await
}
