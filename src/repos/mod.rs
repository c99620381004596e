pub mod document;
pub mod error;
pub mod memory;
pub mod order_repo;
pub mod postgres;
pub mod review_repo;
pub mod tool_repo;
pub mod user_repo;

pub use document::{Collection, Document, DocumentId, DocumentStore, Filter};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
