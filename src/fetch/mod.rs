//! Raw payload retrieval
//!
//! Every exporter names one source: a shell command, an HTTP endpoint or a
//! file. Fetching blocks the calling task for the whole retrieval and never
//! retries; bounded sources (command, HTTP) carry fixed timeouts.

mod command;
mod error;

use std::path::Path;
use std::time::Duration;

use log::debug;

use crate::config::SourceSpec;

pub use command::{COMMAND_TIMEOUT, ShellCommand};
pub use error::{FetchError, FetchResult};

/// Client-side timeout for HTTP sources
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for anything that can turn a source into raw text
#[async_trait::async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Retrieve the full payload for the given source
    async fn fetch(&self, source: &SourceSpec) -> FetchResult<String>;
}

/// Production fetcher backed by `sh`, `reqwest` and the filesystem
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    /// Create a new fetcher with the default HTTP timeout
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// GET the URL and return the body regardless of status
    pub async fn fetch_http(&self, url: &str) -> FetchResult<String> {
        let response = self.client.get(url).send().await?;
        debug!("GET {} -> {}", url, response.status());
        Ok(response.text().await?)
    }

    /// Read a file fully into memory
    pub async fn read_file<P: AsRef<Path>>(path: P) -> FetchResult<String> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait::async_trait]
impl Fetch for SourceFetcher {
    async fn fetch(&self, source: &SourceSpec) -> FetchResult<String> {
        match source {
            SourceSpec::Command { command } => ShellCommand::new(command.as_str()).run().await,
            SourceSpec::Http { url } => self.fetch_http(url).await,
            SourceSpec::File { file_path } => Self::read_file(file_path).await,
        }
    }
}
