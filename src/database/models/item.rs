use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Record;

/// Partition key attribute of the item table
pub const ITEM_KEY: &str = "itemId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Absent only between validation and id assignment on create
    #[serde(default)]
    pub item_id: String,
    pub name: String,
    pub count: i64,
}

impl Item {
    /// Assign a random v4 id when the client did not supply one
    pub fn ensure_id(&mut self) -> &str {
        if self.item_id.is_empty() {
            self.item_id = generate_item_id();
        }
        &self.item_id
    }
}

impl Record for Item {
    const KEY: &'static str = ITEM_KEY;
}

/// Sparse update: only present fields are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}
