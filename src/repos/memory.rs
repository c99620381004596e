//! In-process document store.
//!
//! Selected with `DATABASE_URL=memory://`. Keeps insertion order per collection,
//! so `find`/`find_one` return documents oldest first like the Postgres backend.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::document::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, InsertOneResult,
    UpdateResult, apply_set, assign_id,
};
use crate::repos::error::RepoResult;

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> RepoResult<Vec<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> RepoResult<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> RepoResult<InsertOneResult> {
        let id = DocumentId::new();
        assign_id(&mut doc, id);

        let mut guard = self.collections.write().await;
        guard.entry(collection).or_default().push(doc);

        Ok(InsertOneResult::new(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> RepoResult<UpdateResult> {
        // Single write guard: match + modify (or insert) is atomic for this store.
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();

        if let Some(existing) = docs.iter_mut().find(|d| filter.matches(d)) {
            let modified = apply_set(existing, set);
            return Ok(UpdateResult::matched(modified));
        }

        if !upsert {
            return Ok(UpdateResult::unmatched());
        }

        let id = DocumentId::new();
        let mut doc = filter.seed();
        apply_set(&mut doc, set);
        assign_id(&mut doc, id);
        docs.push(doc);

        Ok(UpdateResult::upserted(id))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> RepoResult<DeleteResult> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(DeleteResult::new(0));
        };

        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult::new(1))
            }
            None => Ok(DeleteResult::new(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::repos::document::ID_FIELD;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn insert_then_find_by_id() {
        let store = MemoryDocumentStore::new();
        let res = store
            .insert_one(Collection::Tools, doc(json!({"name": "Hammer", "price": 12})))
            .await
            .unwrap();
        assert!(res.acknowledged);

        let found = store
            .find_one(Collection::Tools, &Filter::by_id(res.inserted_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["name"], "Hammer");
        assert_eq!(found[ID_FIELD], json!(res.inserted_id.to_string()));
    }

    #[tokio::test]
    async fn client_supplied_id_is_replaced() {
        let store = MemoryDocumentStore::new();
        let res = store
            .insert_one(Collection::Reviews, doc(json!({"_id": "mine", "rating": 5})))
            .await
            .unwrap();

        let all = store.find(Collection::Reviews, &Filter::all()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0][ID_FIELD], json!(res.inserted_id.to_string()));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Orders, doc(json!({"email": "a@x.com"})))
            .await
            .unwrap();

        assert!(store.find(Collection::Users, &Filter::all()).await.unwrap().is_empty());
        assert_eq!(
            store.find(Collection::Orders, &Filter::all()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates() {
        let store = MemoryDocumentStore::new();
        let filter = Filter::by_field("email", "a@x.com");

        let first = store
            .update_one(Collection::Users, &filter, doc(json!({"name": "Ann"})), true)
            .await
            .unwrap();
        assert_eq!(first.upserted_count, 1);
        assert!(first.upserted_id.is_some());

        let second = store
            .update_one(Collection::Users, &filter, doc(json!({"name": "Ann"})), true)
            .await
            .unwrap();
        assert_eq!(second, UpdateResult::matched(false));

        let third = store
            .update_one(Collection::Users, &filter, doc(json!({"city": "Oslo"})), true)
            .await
            .unwrap();
        assert_eq!(third, UpdateResult::matched(true));

        let users = store.find(Collection::Users, &filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], "a@x.com");
        assert_eq!(users[0]["name"], "Ann");
        assert_eq!(users[0]["city"], "Oslo");
    }

    #[tokio::test]
    async fn update_without_upsert_does_not_create() {
        let store = MemoryDocumentStore::new();
        let res = store
            .update_one(
                Collection::Orders,
                &Filter::by_id(DocumentId::new()),
                doc(json!({"paid": true})),
                false,
            )
            .await
            .unwrap();
        assert_eq!(res, UpdateResult::unmatched());
        assert!(store.find(Collection::Orders, &Filter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_only_first_match() {
        let store = MemoryDocumentStore::new();
        for _ in 0..2 {
            store
                .insert_one(Collection::Orders, doc(json!({"email": "a@x.com"})))
                .await
                .unwrap();
        }

        let res = store
            .delete_one(Collection::Orders, &Filter::by_field("email", "a@x.com"))
            .await
            .unwrap();
        assert_eq!(res.deleted_count, 1);

        let res = store
            .delete_one(Collection::Tools, &Filter::all())
            .await
            .unwrap();
        assert_eq!(res.deleted_count, 0);
        assert_eq!(
            store.find(Collection::Orders, &Filter::all()).await.unwrap().len(),
            1
        );
    }
}
