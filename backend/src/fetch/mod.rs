//! Retrieval of raw CSV text.
//!
//! [`HttpSource`] downloads a published spreadsheet export, [`FileSource`]
//! reads a CSV from disk. Both implement [`CsvSource`], which is what the
//! store consumes. Failures surface as [`FetchError`] before any parsing
//! happens.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::logs::{log_info, log_success};
use crate::error::{FetchError, FetchResult};
use crate::parser::{decode_auto, decode_with_charset};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Anything that can hand over a complete CSV document.
pub trait CsvSource {
    /// Short human-readable origin, used in logs.
    fn describe(&self) -> String;

    /// Fetch the full text.
    fn fetch_text(&self) -> impl Future<Output = FetchResult<String>> + Send;
}

/// CSV export served over HTTP
#[derive(Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source with the default timeout
    pub fn new(url: impl Into<String>) -> FetchResult<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source with an explicit request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("inventory/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CsvSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_text(&self) -> FetchResult<String> {
        log_info("📡 Fetching inventory sheet...");

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_param)
            .map(str::to_string);

        let bytes = response.bytes().await?;
        log_success(format!("Received {} bytes", bytes.len()));

        Ok(decode_with_charset(&bytes, charset.as_deref()))
    }
}

/// `charset` parameter of a `Content-Type` value, unquoted.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// CSV file on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CsvSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_text(&self) -> FetchResult<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::File {
                path: self.describe(),
                source,
            })?;

        Ok(decode_auto(&bytes))
    }
}

/// Source picked at runtime from CLI flags or configuration
#[derive(Clone)]
pub enum AnySource {
    Http(HttpSource),
    File(FileSource),
}

impl CsvSource for AnySource {
    fn describe(&self) -> String {
        match self {
            AnySource::Http(s) => s.describe(),
            AnySource::File(s) => s.describe(),
        }
    }

    async fn fetch_text(&self) -> FetchResult<String> {
        match self {
            AnySource::Http(s) => s.fetch_text().await,
            AnySource::File(s) => s.fetch_text().await,
        }
    }
}

impl From<HttpSource> for AnySource {
    fn from(source: HttpSource) -> Self {
        AnySource::Http(source)
    }
}

impl From<FileSource> for AnySource {
    fn from(source: FileSource) -> Self {
        AnySource::File(source)
    }
}
