// handlers/protected/mod.rs - Handlers behind bearer-token authentication
//
// Route prefix: /items
// Middleware: jwt_auth_middleware (skipped when authentication is enforced upstream)

pub mod items;

pub use items::*;
