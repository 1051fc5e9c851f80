//! Single-call request wrapper for the Zotero web API.
//!
//! # Design
//! A `Request` owns at most one transport handle and moves through
//! created → initialized → executed, after which it may be initialized again.
//! `initialize` validates the path, drops any stale handle, opens a new one and
//! configures it. `execute` performs the transfer; success releases the handle,
//! failure keeps it so the caller can inspect transport diagnostics through
//! `handle()` before calling `close()` or re-initializing.
//!
//! Response header lines are collected by a callback the transport drives
//! during the transfer. The callback shares the header buffer with the request
//! through `Rc<RefCell<_>>`; each `initialize` starts a new buffer, so a handle
//! that outlives its request cycle can never write into a later one.

use std::cell::RefCell;
use std::rc::Rc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::{RequestConfig, API_KEY_HEADER, API_VERSION_HEADER};
use crate::error::{Error, Result};
use crate::transport::{Transport, UreqTransport};

/// One outbound call to the Zotero API, reusable across calls.
#[derive(Debug)]
pub struct Request<T: Transport = UreqTransport> {
    config: RequestConfig,
    api_key: Option<SecretString>,
    handle: Option<T>,
    response_header: Rc<RefCell<String>>,
}

impl Request {
    /// A request against the public Zotero API using the `ureq` transport.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Default for Request<T> {
    fn default() -> Self {
        Self::from_config(RequestConfig::default())
    }
}

impl<T: Transport> Request<T> {
    pub fn from_config(config: RequestConfig) -> Self {
        Self {
            config,
            api_key: None,
            handle: None,
            response_header: Rc::new(RefCell::new(String::new())),
        }
    }

    /// Builder form of `set_api_key`.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.set_api_key(api_key);
        self
    }

    /// Store the key sent with every subsequent `initialize`. An empty key is
    /// treated as no key.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        let api_key = api_key.into();
        self.api_key = if api_key.is_empty() {
            None
        } else {
            Some(SecretString::new(api_key.into_boxed_str()))
        };
        self
    }

    pub fn clear_api_key(&mut self) -> &mut Self {
        self.api_key = None;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Prepare a GET of `path` relative to the configured origin.
    ///
    /// `path` must start with `/`; otherwise `Error::InvalidArgument` is
    /// returned and no handle is opened. The path is appended to the origin
    /// verbatim.
    pub fn initialize(&mut self, path: &str) -> Result<&mut Self> {
        if !path.starts_with('/') {
            return Err(Error::InvalidArgument {
                path: path.to_string(),
            });
        }

        if let Some(stale) = self.handle.take() {
            debug!("closing stale transport handle before re-initializing");
            drop(stale);
        }

        self.response_header = Rc::new(RefCell::new(String::new()));
        let url = format!("{}{}", self.config.base_url(), path);

        let mut handle = T::open();
        handle.set_url(&url);
        handle.set_headers(self.outbound_headers());
        handle.set_buffer_body(true);
        let buffer = Rc::clone(&self.response_header);
        handle.set_header_callback(Box::new(move |line: &[u8]| {
            buffer.borrow_mut().push_str(&String::from_utf8_lossy(line));
            line.len()
        }));

        debug!(url = %url, authenticated = self.is_authenticated(), "initialized request");
        self.handle = Some(handle);
        Ok(self)
    }

    /// Perform the transfer prepared by `initialize` and return the body.
    ///
    /// On success the handle is released. On failure it is kept and remains
    /// reachable through `handle()` until `close()` or the next `initialize`.
    pub fn execute(&mut self) -> Result<String> {
        let handle = self.handle.as_mut().ok_or(Error::NotInitialized)?;
        match handle.perform() {
            Ok(body) => {
                self.handle = None;
                debug!(bytes = body.len(), "transfer complete");
                Ok(body)
            }
            Err(err) => {
                warn!(error = %err, "transfer failed, keeping transport handle open");
                Err(err.into())
            }
        }
    }

    /// Raw response header text of the most recently initialized request.
    pub fn response_header(&self) -> String {
        self.response_header.borrow().clone()
    }

    pub fn handle(&self) -> Option<&T> {
        self.handle.as_ref()
    }

    /// Mutable access to the open handle, for transport options this wrapper
    /// does not cover.
    pub fn handle_mut(&mut self) -> Option<&mut T> {
        self.handle.as_mut()
    }

    /// Replace the open handle. The previous one, if any, is released.
    pub fn set_handle(&mut self, handle: T) -> &mut Self {
        self.handle = Some(handle);
        self
    }

    pub fn take_handle(&mut self) -> Option<T> {
        self.handle.take()
    }

    /// Release the handle left open by a failed `execute`.
    pub fn close(&mut self) {
        self.handle = None;
    }

    fn outbound_headers(&self) -> Vec<String> {
        let mut headers = vec![format!(
            "{API_VERSION_HEADER}: {}",
            self.config.api_version()
        )];
        if let Some(api_key) = &self.api_key {
            headers.push(format!("{API_KEY_HEADER}: {}", api_key.expose_secret()));
        }
        headers
    }
}
