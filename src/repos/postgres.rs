/*
 * Responsibility
 * - documents テーブル (JSONB) 向け SQLx 操作
 * - PgPool は起動時に一度だけ作り、close() で明示的に閉じる
 * - 読んでから書く操作 (update_one) は transaction 内で行う (drop 時 rollback)
 * - upsert は (collection, filter) 単位の advisory lock で直列化する
 *   (一致行が無いと FOR UPDATE は何もロックしないため)
 */
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};
use uuid::Uuid;

use crate::repos::document::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, InsertOneResult,
    UpdateResult, apply_set, assign_id, into_document,
};
use crate::repos::error::RepoResult;

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool whose schema is already migrated.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Advisory-lock key for an upsert. Filter JSON is key-ordered, so equal filters give equal keys.
fn upsert_lock_key(collection: Collection, filter: &Filter) -> String {
    format!("{}:{}", collection, filter.to_json())
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> RepoResult<Vec<Document>> {
        let rows = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY "createdAt" ASC
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.to_json()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|Json(body)| into_document(body)).collect()
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> RepoResult<Option<Document>> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY "createdAt" ASC
            LIMIT 1
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.to_json()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|Json(body)| into_document(body)).transpose()
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> RepoResult<InsertOneResult> {
        let id = DocumentId::new();
        assign_id(&mut doc, id);

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection.as_str())
        .bind(id.as_uuid())
        .bind(Json(Value::Object(doc)))
        .execute(&self.pool)
        .await?;

        Ok(InsertOneResult::new(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> RepoResult<UpdateResult> {
        let mut tx = self.pool.begin().await?;

        if upsert {
            // held until commit/rollback
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(upsert_lock_key(collection, filter))
                .execute(&mut *tx)
                .await?;
        }

        let existing = sqlx::query_as::<_, (Uuid, Json<Value>)>(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY "createdAt" ASC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.to_json()))
        .fetch_optional(&mut *tx)
        .await?;

        let result = match existing {
            Some((id, Json(body))) => {
                let mut doc = into_document(body)?;
                let modified = apply_set(&mut doc, set);

                if modified {
                    sqlx::query(
                        r#"
                        UPDATE documents
                        SET body = $3, "updatedAt" = now()
                        WHERE collection = $1 AND id = $2
                        "#,
                    )
                    .bind(collection.as_str())
                    .bind(id)
                    .bind(Json(Value::Object(doc)))
                    .execute(&mut *tx)
                    .await?;
                }

                UpdateResult::matched(modified)
            }
            None if upsert => {
                let id = DocumentId::new();
                let mut doc = filter.seed();
                apply_set(&mut doc, set);
                assign_id(&mut doc, id);

                sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, body)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(collection.as_str())
                .bind(id.as_uuid())
                .bind(Json(Value::Object(doc)))
                .execute(&mut *tx)
                .await?;

                UpdateResult::upserted(id)
            }
            None => UpdateResult::unmatched(),
        };

        tx.commit().await?;
        Ok(result)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> RepoResult<DeleteResult> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1
              AND id = (
                SELECT id
                FROM documents
                WHERE collection = $1 AND body @> $2
                ORDER BY "createdAt" ASC
                LIMIT 1
              )
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.to_json()))
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        into_document(value).unwrap()
    }

    #[test]
    fn lock_key_is_stable_per_collection_and_filter() {
        let a = Filter::by_field("email", "a@x.com").and("role", "admin");
        let b = Filter::by_field("role", "admin").and("email", "a@x.com");

        assert_eq!(
            upsert_lock_key(Collection::Users, &a),
            upsert_lock_key(Collection::Users, &b)
        );
        assert_ne!(
            upsert_lock_key(Collection::Users, &a),
            upsert_lock_key(Collection::Orders, &a)
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn concurrent_upserts_create_one_document(pool: PgPool) {
        let store = PgDocumentStore::from_pool(pool);
        let filter = Filter::by_field("email", "new@x.com");

        let (first, second) = tokio::join!(
            store.update_one(Collection::Users, &filter, doc(json!({"name": "A"})), true),
            store.update_one(Collection::Users, &filter, doc(json!({"name": "B"})), true),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(first.upserted_count + second.upserted_count, 1);
        assert_eq!(first.matched_count + second.matched_count, 1);
        assert_eq!(store.find(Collection::Users, &filter).await.unwrap().len(), 1);
    }
}
