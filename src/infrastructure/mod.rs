//! Infrastructure layer - Storage, hashing, and request handling

pub mod logging;
pub mod member;
