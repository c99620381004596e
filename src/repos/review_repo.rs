/*
 * Responsibility
 * - reviews コレクションの読み書き
 */
use crate::repos::document::{Collection, Document, DocumentStore, Filter, InsertOneResult};
use crate::repos::error::RepoResult;

pub async fn list(store: &dyn DocumentStore) -> RepoResult<Vec<Document>> {
    store.find(Collection::Reviews, &Filter::all()).await
}

pub async fn create(store: &dyn DocumentStore, doc: Document) -> RepoResult<InsertOneResult> {
    store.insert_one(Collection::Reviews, doc).await
}
