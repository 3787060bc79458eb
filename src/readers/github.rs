//! Fetch advisory files through the GitHub contents API
//!
//! The [`GithubReader`] lists and downloads the markdown advisories of a
//! repository. Both directory listings and file contents go through the
//! same endpoint, https://api.github.com/repos/{owner}/{repo}/contents/,
//! disambiguated by the response shape: an array for directories, an
//! object carrying a base64 `content` field for files.
//!
//! Requests are unauthenticated, so they run against GitHub's anonymous
//! rate limit. File fetches retry after the limit resets, listings don't.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::prelude::{Engine, BASE64_STANDARD};
use log::{debug, error, trace};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{fetch_with_retry, ContentsSource, FetchError};

/// A reader used to fetch advisory files from a GitHub repository.
///
/// It works fully sequentially, one request at a time, and blocks the
/// calling thread while waiting out a rate limit.
pub struct GithubReader {
    /// The HTTP client, reused across requests.
    http_client: Client,
    /// The contents API base for the repository.
    /// Example: https://api.github.com/repos/trickest/cve
    api_base: String,
    /// How many times a rate-limited file fetch is retried before the
    /// file is given up on.
    max_retries: u32,
}

impl GithubReader {
    /// Creates a new GithubReader for the given repository.
    pub fn new(owner: &str, repo: &str, max_retries: u32) -> Self {
        // GitHub rejects requests without a User-Agent
        let http_client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Unable to create a HTTP client.");

        GithubReader {
            http_client,
            api_base: format!("https://api.github.com/repos/{}/{}", owner, repo),
            max_retries,
        }
    }

    /// Builds the contents API URL for a repository path.
    fn contents_url(&self, path: &str) -> String {
        format!("{}/contents/{}", self.api_base, path)
    }

    /// Sends one request for a file and interprets the response.
    /// Rate-limit refusals are reported as [`FetchError::RateLimited`] so
    /// the caller can wait and retry.
    fn fetch_file_once(&self, path: &str) -> Result<String, FetchError> {
        trace!("Running GithubReader::fetch_file_once()");
        let url = self.contents_url(path);
        debug!("Sending HTTP request for URL {}", url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Other(format!("HTTP request to {} failed: {:?}", url, e)))?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            let contents: FileContents = response.json().map_err(|e| {
                FetchError::Other(format!("Invalid JSON in file response: {:?}", e))
            })?;
            return decode_content(&contents.content);
        }

        // The reset header has to be read before the body is consumed
        let reset_epoch = response
            .headers()
            .get("X-RateLimit-Reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status == 403 {
            let api_error: ApiError = response.json().unwrap_or_default();
            if api_error.message.to_lowercase().contains("rate limit") {
                return Err(FetchError::RateLimited { reset_epoch });
            }
        }

        Err(FetchError::Status(status))
    }
}

impl ContentsSource for GithubReader {
    /// Lists the markdown files in a repository directory, in the order
    /// the API returns them. On failure the directory is reported as
    /// empty; listing failures are not retried.
    fn list_markdown_files(&self, path: &str) -> Vec<String> {
        trace!("Running GithubReader::list_markdown_files()");
        let url = self.contents_url(path);
        let response = match self.http_client.get(&url).send() {
            Ok(r) => r,
            Err(e) => {
                error!("HTTP request to {} failed: {:?}", url, e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            error!(
                "Failed to fetch directory contents: {} (HTTP {})",
                path,
                response.status()
            );
            return Vec::new();
        }

        let entries: Vec<DirectoryEntry> = match response.json() {
            Ok(e) => e,
            Err(e) => {
                error!("Invalid JSON in directory listing for {}: {:?}", path, e);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|e| e.entry_type == "file" && e.name.ends_with(".md"))
            .map(|e| e.name)
            .collect()
    }

    /// Fetches and decodes one file. Waits out rate limits, bounded by
    /// the configured retry budget; any other failure skips the file.
    fn file_content(&self, path: &str) -> Option<String> {
        fetch_with_retry(
            self.max_retries,
            now_epoch,
            |wait| {
                println!("Rate limit hit. Waiting for {} seconds...", wait.as_secs());
                thread::sleep(wait);
            },
            || self.fetch_file_once(path),
        )
    }
}

/// The current time as seconds since the Unix epoch.
fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Decodes the base64 payload of a file response into UTF-8 text.
/// The API wraps the base64 in newlines, which the decoder rejects,
/// so whitespace is removed first.
fn decode_content(content: &str) -> Result<String, FetchError> {
    let stripped: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(stripped)
        .map_err(|e| FetchError::Other(format!("Invalid base64 content: {:?}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| FetchError::Other(format!("File content is not UTF-8: {:?}", e)))
}

/// Represents one entry of a directory listing returned by the contents API.
#[derive(Debug, Deserialize)]
pub struct DirectoryEntry {
    /// The entry filename.
    /// Example: CVE-2024-0001.md
    pub name: String,
    /// The entry type.
    /// Example: file, dir
    #[serde(rename = "type")]
    pub entry_type: String,
}

/// Represents a file object returned by the contents API.
#[derive(Debug, Deserialize)]
pub struct FileContents {
    /// The base64-encoded file content, wrapped in newlines.
    pub content: String,
}

/// Represents the error object returned by the API on refusals.
#[derive(Debug, Default, Deserialize)]
pub struct ApiError {
    /// The human-readable error message.
    /// Example: API rate limit exceeded for 203.0.113.7.
    #[serde(default)]
    pub message: String,
}
