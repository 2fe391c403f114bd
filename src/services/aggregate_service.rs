use crate::domain::{ArticleRecord, Source};
use crate::errors::{DigestError, DigestResult};
use crate::sources::{parse_feed, FeedFetcher};

/// Records merged from every source that could be fetched and parsed
#[derive(Debug, Default)]
pub struct Aggregate {
    pub records: Vec<ArticleRecord>,
    pub succeeded: Vec<Source>,
    pub failed: Vec<(Source, DigestError)>,
}

impl Aggregate {
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

pub struct AggregateService<F: FeedFetcher> {
    fetcher: F,
}

impl<F: FeedFetcher> AggregateService<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch and parse one source
    pub fn fetch_source(&self, source: Source, url: &str) -> DigestResult<Vec<ArticleRecord>> {
        let bytes = self.fetcher.fetch(url)?;
        Ok(parse_feed(&bytes, source)?.collect())
    }

    /// Fetch every source; a failing source is logged and skipped
    pub fn aggregate(&self, sources: &[(Source, String)]) -> Aggregate {
        let mut aggregate = Aggregate::default();

        for (source, url) in sources {
            match self.fetch_source(*source, url) {
                Ok(records) => {
                    tracing::info!(source = %source, count = records.len(), "Fetched feed");
                    aggregate.records.extend(records);
                    aggregate.succeeded.push(*source);
                }
                Err(e) => {
                    tracing::warn!(source = %source, url = %url, "Skipping source: {}", e);
                    aggregate.failed.push((*source, e));
                }
            }
        }

        aggregate
    }
}
