/*!
 * Retrieval of source documents.
 *
 * A location is an `http`/`https` URL, a `file://` URL, or a plain
 * filesystem path.
 */

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use url::Url;

use crate::errors::SourceError;

/// Fetches the raw text of a document
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String, SourceError>;
}

/// Where a location points after parsing
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentLocation {
    Remote(Url),
    Local(PathBuf),
}

impl DocumentLocation {
    /// Classify a location string
    pub fn parse(location: &str) -> Result<Self, SourceError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(SourceError::UnsupportedLocation("empty location".to_string()));
        }

        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                "file" => url.to_file_path()
                    .map(Self::Local)
                    .map_err(|_| SourceError::UnsupportedLocation(location.to_string())),
                // Windows drive letters parse as a one-letter scheme
                scheme if scheme.len() == 1 => Ok(Self::Local(PathBuf::from(location))),
                _ => Err(SourceError::UnsupportedLocation(location.to_string())),
            },
            Err(_) => Ok(Self::Local(PathBuf::from(location))),
        }
    }
}

/// Reads documents over HTTP(S) or from disk
pub struct DefaultDocumentSource {
    client: Client,
}

impl DefaultDocumentSource {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn download(&self, url: Url) -> Result<String, SourceError> {
        let display = url.to_string();
        let download_error = |message: String| SourceError::Download {
            url: display.clone(),
            message,
        };

        let response = self.client.get(url.clone())
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("HTTP status {}", status)));
        }

        response.text().await.map_err(|e| download_error(e.to_string()))
    }
}

impl Default for DefaultDocumentSource {
    fn default() -> Self {
        Self::new(60)
    }
}

#[async_trait]
impl DocumentSource for DefaultDocumentSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        match DocumentLocation::parse(location)? {
            DocumentLocation::Remote(url) => {
                debug!("Downloading document from {}", url);
                self.download(url).await
            }
            DocumentLocation::Local(path) => {
                debug!("Reading document from {}", path.display());
                tokio::fs::read_to_string(&path).await.map_err(|e| SourceError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
