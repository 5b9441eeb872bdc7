pub mod request;

pub use request::{parse_request_body, PathIdentifier};
