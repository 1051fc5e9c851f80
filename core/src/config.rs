//! Origin and protocol version used to build outbound requests.

/// Production origin of the Zotero web API.
pub const DEFAULT_BASE_URL: &str = "https://api.zotero.org";

/// Value of the `Zotero-API-Version` header sent with every request.
pub const DEFAULT_API_VERSION: &str = "3";

/// Name of the protocol-version request header.
pub const API_VERSION_HEADER: &str = "Zotero-API-Version";

/// Name of the credential request header.
pub const API_KEY_HEADER: &str = "Zotero-API-Key";

/// Configuration shared by every request built from it.
///
/// The default targets the public Zotero API. Tests point `base_url` at a
/// local server instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    base_url: String,
    api_version: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl RequestConfig {
    /// Replace the origin. Trailing slashes are stripped so that a path such
    /// as `/users/1/items` concatenates cleanly.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the value sent in the `Zotero-API-Version` header.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}
