//! Authenticated request wrapper for the Zotero web API.
//!
//! # Overview
//! `Request` builds one GET against `https://api.zotero.org` (origin + path,
//! `Zotero-API-Version` header, optional `Zotero-API-Key` header), performs it
//! and hands back the raw body and the raw response header text. Nothing is
//! parsed, paged or retried; that belongs to whatever client sits on top.
//!
//! # Design
//! - The network is behind the `Transport` trait. `UreqTransport` is the
//!   blocking default; tests plug in stubs.
//! - `Request` owns at most one handle. A failed transfer leaves it open for
//!   inspection; a successful one releases it.
//! - Everything is synchronous and single-threaded.
//!
//! ```no_run
//! use zotero_request::Request;
//!
//! # fn main() -> zotero_request::Result<()> {
//! let mut request = Request::new();
//! let body = request
//!     .set_api_key("P9NiFoyLeZu2bZNvvuQPDWsd")
//!     .initialize("/users/475425/items?limit=5")?
//!     .execute()?;
//! println!("{}", request.response_header());
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use config::RequestConfig;
pub use error::{Error, Result, TransferError};
pub use request::Request;
pub use transport::{HeaderCallback, Transport, UreqTransport};
