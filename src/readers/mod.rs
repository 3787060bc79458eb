//! Fetching remote advisory content
//!
//! A reader is responsible for bringing the raw advisory markdown into the
//! process. It provides a common interface, so the aggregation loop can run
//! against an in-memory source in tests without touching the network.

pub mod github;

use std::time::Duration;

use log::{debug, error};

/// A common interface between content sources.
/// A source lists the advisory files available under a path and returns the
/// decoded text of a single file.
pub trait ContentsSource {
    /// Lists the markdown filenames under the given path, in the order the
    /// source provides them. An empty list means the path should be skipped,
    /// not that the run failed.
    fn list_markdown_files(&self, path: &str) -> Vec<String>;

    /// Returns the decoded text of one file, or None if it couldn't be
    /// fetched. The caller skips absent files.
    fn file_content(&self, path: &str) -> Option<String>;
}

/// The ways a single fetch attempt can fail.
#[derive(Debug, PartialEq)]
pub enum FetchError {
    /// The API refused the request because the rate limit is exhausted.
    /// Carries the epoch second at which the limit resets, when the
    /// response provided one.
    RateLimited { reset_epoch: Option<u64> },
    /// Any other non-success HTTP status.
    Status(u16),
    /// Transport or decoding problem, with a description.
    Other(String),
}

/// Computes how long to wait before retrying after a rate-limit response.
/// The reset timestamp can be in the past by the time we read it, so the
/// difference is floored at zero. One extra second avoids retrying right
/// on the boundary.
pub fn rate_limit_wait(reset_epoch: Option<u64>, now_epoch: u64) -> Duration {
    let reset = reset_epoch.unwrap_or(0);
    Duration::from_secs(reset.saturating_sub(now_epoch) + 1)
}

/// Runs a fetch attempt, retrying on rate-limit errors up to max_retries
/// times. The wait function receives the computed delay; production code
/// passes a real sleep, tests pass a recorder.
///
/// Returns Some on success, None once the attempt fails for a reason that
/// isn't retried or the retry budget is spent.
pub fn fetch_with_retry<T>(
    max_retries: u32,
    now_epoch: impl Fn() -> u64,
    mut wait_fn: impl FnMut(Duration),
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Option<T> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(content) => return Some(content),
            Err(FetchError::RateLimited { reset_epoch }) if attempt < max_retries => {
                attempt += 1;
                let wait = rate_limit_wait(reset_epoch, now_epoch());
                debug!(
                    "Rate limited, attempt {}/{}, waiting {}s",
                    attempt,
                    max_retries,
                    wait.as_secs()
                );
                wait_fn(wait);
            }
            Err(e) => {
                error!("Fetch failed: {:?}", e);
                return None;
            }
        }
    }
}
