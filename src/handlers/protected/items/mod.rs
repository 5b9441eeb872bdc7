pub mod collection;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::get as items_get;
pub use collection::post as items_post;

pub use record::delete as item_delete;
pub use record::get as item_get;
pub use record::patch as item_patch;
pub use record::put as item_put;
