//! Shared utilities.

mod hash;

pub use hash::{content_hash, content_hash_hex};
