//! Error types for the Zotero request wrapper.
//!
//! # Design
//! Two failure classes with different handling. A malformed path is a
//! programmer error and is reported by `Request::initialize` before any
//! transport handle exists. A failed transfer is an expected runtime
//! condition; it is reported by `Request::execute` as `Error::Transfer` while
//! the handle stays open for the caller to inspect.

use thiserror::Error;

/// Result type alias for request operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `Request`.
#[derive(Debug, Error)]
pub enum Error {
    /// The path passed to `initialize` does not start with `/`.
    #[error("invalid argument: path must start with '/', got {path:?}")]
    InvalidArgument { path: String },

    /// `execute` was called without an open transport handle.
    #[error("request not initialized: call initialize() before execute()")]
    NotInitialized,

    /// The transport reported a failure during the transfer.
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Failures reported by a `Transport` while performing a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The HTTP exchange itself failed (DNS, TLS, connection, protocol).
    #[error("http: {0}")]
    Http(String),

    /// Reading the response body failed.
    #[error("io: {0}")]
    Io(String),

    /// The header callback consumed a different number of bytes than it was
    /// handed, which aborts the transfer.
    #[error("header callback consumed {consumed} of {expected} bytes")]
    HeaderCallback { expected: usize, consumed: usize },

    /// An outbound header line could not be split into name and value.
    #[error("malformed header line: {0:?}")]
    InvalidHeader(String),

    /// No target URL was set on the handle.
    #[error("no url set on transport handle")]
    MissingUrl,
}
