use crate::errors::DigestResult;

/// Retrieves the raw payload of a feed
#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher: Send + Sync {
    /// Single attempt, no retries
    fn fetch(&self, url: &str) -> DigestResult<Vec<u8>>;
}
