//! Transport seam between `Request` and the network.
//!
//! # Design
//! `Request` never talks to the network itself. It opens a handle through the
//! `Transport` trait, configures it (url, header lines, body buffering, header
//! callback) and asks it to perform the transfer. Dropping a handle releases
//! it. `UreqTransport` is the blocking production implementation; tests swap
//! in a stub to observe exactly what a request configured.
//!
//! The header callback is driven by the transport: every response header line
//! (status line, each field, the terminating blank line) is handed to it as raw
//! bytes, and it must report how many bytes it consumed. Any other count aborts
//! the transfer.

use std::fmt;
use std::time::Duration;

use crate::error::TransferError;

/// Callback invoked once per response header line. Returns the number of bytes
/// it consumed, which must equal the line length.
pub type HeaderCallback = Box<dyn FnMut(&[u8]) -> usize>;

/// A single transport handle: one outbound request and its result.
pub trait Transport: Sized {
    /// Allocate a fresh, unconfigured handle.
    fn open() -> Self;

    fn set_url(&mut self, url: &str);

    /// Replace the outbound header list. Each entry is a `Name: value` line.
    fn set_headers(&mut self, headers: Vec<String>);

    /// When true the body is returned from `perform`; otherwise it is drained
    /// and discarded.
    fn set_buffer_body(&mut self, buffer: bool);

    fn set_header_callback(&mut self, callback: HeaderCallback);

    /// Run the transfer, blocking until it completes or fails.
    fn perform(&mut self) -> Result<String, TransferError>;
}

/// Blocking transport backed by `ureq`.
///
/// Non-2xx statuses are not transfer failures: their bodies are returned like
/// any other. Only transport-level problems produce `Err`. The body is read in
/// full with no size cap; bytes that are not UTF-8 are replaced with U+FFFD.
pub struct UreqTransport {
    url: Option<String>,
    headers: Vec<String>,
    buffer_body: bool,
    header_callback: Option<HeaderCallback>,
    timeout: Option<Duration>,
    status: Option<u16>,
    last_error: Option<TransferError>,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("url", &self.url)
            .field("header_count", &self.headers.len())
            .field("buffer_body", &self.buffer_body)
            .field("has_header_callback", &self.header_callback.is_some())
            .field("timeout", &self.timeout)
            .field("status", &self.status)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl UreqTransport {
    /// Limit the whole transfer to `timeout`. `None` keeps ureq's defaults.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// HTTP status of the last completed exchange.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The failure reported by the last `perform`, if it failed.
    pub fn last_error(&self) -> Option<&TransferError> {
        self.last_error.as_ref()
    }

    fn transfer(&mut self) -> Result<String, TransferError> {
        let url = self.url.clone().ok_or(TransferError::MissingUrl)?;
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout)
            .build()
            .new_agent();

        let mut request = agent.get(url.as_str());
        for line in &self.headers {
            let (name, value) = split_header_line(line)?;
            request = request.header(name, value);
        }

        let mut response = request
            .call()
            .map_err(|e| TransferError::Http(e.to_string()))?;
        self.status = Some(response.status().as_u16());

        let mut lines = Vec::with_capacity(response.headers().len() + 2);
        lines.push(format!("{:?} {}\r\n", response.version(), response.status()).into_bytes());
        for (name, value) in response.headers() {
            let mut line = format!("{}: ", name.as_str()).into_bytes();
            line.extend_from_slice(value.as_bytes());
            line.extend_from_slice(b"\r\n");
            lines.push(line);
        }
        lines.push(b"\r\n".to_vec());
        for line in &lines {
            self.deliver_header_line(line)?;
        }

        // The whole body is read regardless of size; ureq's default cap is 10 MiB.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TransferError::Io(e.to_string()))?;
        if self.buffer_body {
            Ok(body_to_string(body))
        } else {
            Ok(String::new())
        }
    }

    fn deliver_header_line(&mut self, line: &[u8]) -> Result<(), TransferError> {
        if let Some(callback) = self.header_callback.as_mut() {
            let consumed = callback(line);
            if consumed != line.len() {
                return Err(TransferError::HeaderCallback {
                    expected: line.len(),
                    consumed,
                });
            }
        }
        Ok(())
    }
}

impl Transport for UreqTransport {
    fn open() -> Self {
        Self {
            url: None,
            headers: Vec::new(),
            buffer_body: false,
            header_callback: None,
            timeout: None,
            status: None,
            last_error: None,
        }
    }

    fn set_url(&mut self, url: &str) {
        self.url = Some(url.to_string());
    }

    fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = headers;
    }

    fn set_buffer_body(&mut self, buffer: bool) {
        self.buffer_body = buffer;
    }

    fn set_header_callback(&mut self, callback: HeaderCallback) {
        self.header_callback = Some(callback);
    }

    fn perform(&mut self) -> Result<String, TransferError> {
        self.status = None;
        let result = self.transfer();
        self.last_error = result.as_ref().err().cloned();
        result
    }
}

/// Body bytes as text. Invalid UTF-8 sequences become U+FFFD; valid bodies
/// are moved without copying.
fn body_to_string(body: Vec<u8>) -> String {
    match String::from_utf8(body) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// Split a `Name: value` line. Only the single space after the colon is
/// dropped, so the value goes out exactly as it appears in the list.
fn split_header_line(line: &str) -> Result<(&str, &str), TransferError> {
    match line.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim(), value.strip_prefix(' ').unwrap_or(value)))
        }
        _ => Err(TransferError::InvalidHeader(line.to_string())),
    }
}
