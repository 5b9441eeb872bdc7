pub mod item;

pub use item::{Item, ItemPatch, ITEM_KEY};
