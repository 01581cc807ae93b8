//! Edges of the core: loading snapshots, persisting saves and writing output.
//!
//! Shared by the CLI command handlers.

mod load;
mod output;
mod sink;

pub use load::{LinkCheck, link_problems, load_file_content, parse_file_content_str};
pub use output::{OutputTarget, render, write_output};
pub use sink::JsonFileSink;

/// Exit codes for scripting
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// The query matched nothing (no located resource, no URL)
    pub const NO_MATCH: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
