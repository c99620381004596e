mod auth_ctx;
mod doc_id;
mod json;
mod owner;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use doc_id::DocId;
pub use json::AppJson;
pub use owner::Owner;
