//! Unified error types for opossum-tools.
//!
//! Reducers in [`crate::store`] and [`crate::navigation`] are total and never
//! return these errors. They surface at the edges: loading snapshots, resolving
//! resource paths, talking to the rollup worker and reading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for opossum-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OpossumError {
    /// Errors while loading a file snapshot
    #[error("Failed to load file: {context}")]
    Load {
        context: String,
        #[source]
        source: LoadErrorKind,
    },

    /// Errors while resolving resources in the tree
    #[error("Resource lookup failed: {context}")]
    Resource {
        context: String,
        #[source]
        source: ResourceErrorKind,
    },

    /// Errors raised by the background rollup worker
    #[error("Rollup worker failed: {context}")]
    Worker {
        context: String,
        #[source]
        source: WorkerErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific load error kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Attribution '{attribution_id}' is linked to unknown resource '{resource_id}'")]
    DanglingResource {
        attribution_id: String,
        resource_id: String,
    },

    #[error("Resource '{resource_id}' references unknown attribution '{attribution_id}'")]
    UnknownAttribution {
        resource_id: String,
        attribution_id: String,
    },
}

/// Specific resource error kinds
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResourceErrorKind {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource id must start with '/': {0}")]
    NotAbsolute(String),
}

/// Specific worker error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WorkerErrorKind {
    #[error("Worker thread is no longer running")]
    Disconnected,

    #[error("Worker replied without output")]
    EmptyReply,

    #[error("Worker could not be spawned: {0}")]
    Spawn(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for opossum-tools operations
pub type Result<T> = std::result::Result<T, OpossumError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl OpossumError {
    /// Create a load error with context
    pub fn load(context: impl Into<String>, source: LoadErrorKind) -> Self {
        Self::Load {
            context: context.into(),
            source,
        }
    }

    /// Create a resource error for a path that does not resolve
    pub fn resource_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::Resource {
            context: format!("resolving {path}"),
            source: ResourceErrorKind::NotFound(path),
        }
    }

    /// Create a worker error with context
    pub fn worker(context: impl Into<String>, source: WorkerErrorKind) -> Self {
        Self::Worker {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for OpossumError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for OpossumError {
    fn from(err: serde_json::Error) -> Self {
        Self::load(
            "JSON deserialization",
            LoadErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, so a
/// failure deep inside the loader reads like
/// `"loading demo.json: checking links: Resource '/a' references unknown attribution 'x'"`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<OpossumError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: OpossumError, new_ctx: &str) -> OpossumError {
    match err {
        OpossumError::Load {
            context: existing,
            source,
        } => OpossumError::Load {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OpossumError::Resource {
            context: existing,
            source,
        } => OpossumError::Resource {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OpossumError::Worker {
            context: existing,
            source,
        } => OpossumError::Worker {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OpossumError::Io {
            path,
            message,
            source,
        } => OpossumError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        OpossumError::Config(msg) => OpossumError::Config(chain_context(new_ctx, &msg)),
        OpossumError::Validation(msg) => OpossumError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| OpossumError::Validation(context.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OpossumError::resource_not_found("/src/missing.rs");
        let display = err.to_string();
        assert!(display.contains("/src/missing.rs"), "{display}");

        let err = OpossumError::worker("posting request", WorkerErrorKind::Disconnected);
        assert!(err.to_string().contains("posting request"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = OpossumError::io("/path/to/file.json", io_err);

        assert!(err.to_string().contains("/path/to/file.json"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(OpossumError::load(
                "base",
                LoadErrorKind::InvalidJson("eof".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(OpossumError::Load { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Load error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(OpossumError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(OpossumError::Validation(msg)) => assert_eq!(msg, "missing value"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert_eq!(Some(3).context_none("unused").ok(), Some(3));
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("outer", "middle: inner"), "outer: middle: inner");
    }
}
