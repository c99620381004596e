/*
 * Responsibility
 * - document store の契約 (DocumentStore trait) と共通型
 * - Filter / 結果型 (InsertOneResult, UpdateResult, DeleteResult) はそのまま client に返す
 * - backend 固有の処理は postgres.rs / memory.rs 側
 */
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Field holding the store-assigned identifier.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tools,
    Orders,
    Reviews,
    Users,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Orders => "orders",
            Self::Reviews => "reviews",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Conjunction of top-level field equality clauses. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_field(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn by_id(id: DocumentId) -> Self {
        Self::by_field(ID_FIELD, id.to_string())
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        // later clause on the same field wins
        self.clauses.retain(|(f, _)| *f != field);
        self.clauses.push((field, value));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// The clauses as one JSON object, used as the right-hand side of JSONB `@>`.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.clauses
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        )
    }

    /// Equality fields copied into a document created by an upsert (`_id` is always fresh).
    pub fn seed(&self) -> Document {
        self.clauses
            .iter()
            .filter(|(field, _)| field != ID_FIELD)
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

impl InsertOneResult {
    pub fn new(inserted_id: DocumentId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<DocumentId>,
    pub upserted_count: u64,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_id: None,
            upserted_count: 0,
        }
    }

    pub fn upserted(id: DocumentId) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
            upserted_count: 1,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Document persistence used by every handler.
///
/// - One call per request; there is no cross-call transaction.
/// - Concurrent writers to the same document are last-write-wins.
/// - Implementations are shared behind `Arc<dyn DocumentStore>`.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn find(&self, collection: Collection, filter: &Filter) -> RepoResult<Vec<Document>>;

    async fn find_one(&self, collection: Collection, filter: &Filter)
    -> RepoResult<Option<Document>>;

    // Assigns a fresh `_id`; a client-supplied `_id` is discarded.
    async fn insert_one(&self, collection: Collection, doc: Document)
    -> RepoResult<InsertOneResult>;

    // `$set` semantics on the first match; with `upsert`, creates the document when none matches.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> RepoResult<UpdateResult>;

    async fn delete_one(&self, collection: Collection, filter: &Filter)
    -> RepoResult<DeleteResult>;

    // Release backend resources. Called once by the composition root on shutdown.
    async fn close(&self) {}
}

/// Merge `set` into `doc` at the top level. Returns whether anything changed.
pub(crate) fn apply_set(doc: &mut Document, set: Document) -> bool {
    let mut changed = false;
    for (field, value) in set {
        if field == ID_FIELD {
            continue;
        }
        if doc.get(&field) != Some(&value) {
            doc.insert(field, value);
            changed = true;
        }
    }
    changed
}

/// Stamp a new identifier onto a document about to be stored.
pub(crate) fn assign_id(doc: &mut Document, id: DocumentId) {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
}

pub(crate) fn into_document(value: Value) -> RepoResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RepoError::Corrupt),
    }
}
