use feed_rs::model::Entry;
use feed_rs::parser;

use crate::domain::{ArticleRecord, Source};
use crate::errors::{DigestError, DigestResult};

/// Parse a feed payload into records tagged with `source`.
///
/// Only a payload that is not a feed at all is an error. Entries without a
/// title, a link or a usable date are skipped. Dates come out of `feed_rs`
/// already normalized to UTC, whatever offset the feed used.
pub fn parse_feed(
    bytes: &[u8],
    source: Source,
) -> DigestResult<impl Iterator<Item = ArticleRecord>> {
    let feed = parser::parse(bytes).map_err(|e| DigestError::FeedParse(e.to_string()))?;

    Ok(feed
        .entries
        .into_iter()
        .filter_map(move |entry| record_from_entry(entry, source)))
}

fn record_from_entry(entry: Entry, source: Source) -> Option<ArticleRecord> {
    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())?;

    let link = entry
        .links
        .into_iter()
        .map(|l| l.href.trim().to_string())
        .find(|href| !href.is_empty())?;

    let published_at = entry.published.or(entry.updated)?;

    Some(ArticleRecord::new(title, link, published_at, source))
}
