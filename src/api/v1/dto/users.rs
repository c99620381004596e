/*
 * Responsibility
 * - Users の request/response DTO
 * - user 本体は schemaless (Document) のまま受け取り、$set としてそのまま渡す
 */
use serde::{Deserialize, Serialize};

use crate::repos::document::UpdateResult;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    pub fn require(&self) -> Result<&str, &'static str> {
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Ok(email),
            _ => Err("email is required"),
        }
    }
}

/// Response of `PUT /user/{email}`: the upsert outcome plus a freshly issued token.
#[derive(Debug, Serialize)]
pub struct UpsertUserResponse {
    pub result: UpdateResult,
    pub token: String,
}
