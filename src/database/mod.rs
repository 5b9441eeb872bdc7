pub mod dynamo;
pub mod memory;
pub mod models;
pub mod repository;
pub mod table;

pub use dynamo::DynamoTable;
pub use memory::MemoryTable;
pub use repository::{Record, Repository};
pub use table::{Attributes, PutMode, StorageError, Table};
