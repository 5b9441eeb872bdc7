// handlers/public/mod.rs - Handlers reachable without a token

pub mod health;

pub use health::get as health_get;
