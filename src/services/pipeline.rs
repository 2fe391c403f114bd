//! Pure selection steps: filter, dedup, sort and cap.
//!
//! Every step takes the run's `now` explicitly, so the same input always
//! produces the same digest.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{ArticleRecord, DigestRequest};

/// Keep records whose title contains the keyword (case-insensitive
/// substring) and that are no older than the lookback window. A record
/// exactly at the window edge is kept.
pub fn filter(
    records: &[ArticleRecord],
    request: &DigestRequest,
    now: DateTime<Utc>,
) -> Vec<ArticleRecord> {
    let keyword = request.keyword.trim().to_lowercase();
    let window = TimeDelta::try_hours(request.lookback_hours);

    records
        .iter()
        .filter(|r| r.title.to_lowercase().contains(&keyword))
        .filter(|r| match window {
            Some(window) => now.signed_duration_since(r.published_at) <= window,
            None => true,
        })
        .cloned()
        .collect()
}

/// Drop records whose trimmed link was already seen; the first one wins
pub fn dedup(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key().to_string()))
        .collect()
}

/// Newest first, ties by link, then truncate
pub fn sort_and_cap(mut records: Vec<ArticleRecord>, cap: usize) -> Vec<ArticleRecord> {
    records.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.link.cmp(&b.link))
    });
    records.truncate(cap);
    records
}

/// Full selection for one digest request
pub fn select(
    records: &[ArticleRecord],
    request: &DigestRequest,
    now: DateTime<Utc>,
) -> Vec<ArticleRecord> {
    let matching = filter(records, request, now);
    sort_and_cap(dedup(matching), request.effective_cap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Source;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap()
    }

    fn hours_ago(title: &str, link: &str, hours: i64, source: Source) -> ArticleRecord {
        ArticleRecord::new(title, link, now() - TimeDelta::hours(hours), source)
    }

    fn kr() -> DigestRequest {
        DigestRequest::new("KR", "스테이블코인")
    }

    fn us() -> DigestRequest {
        DigestRequest::new("US", "stablecoin")
    }

    #[test]
    fn test_keyword_and_window_scenario() {
        let records = vec![
            hours_ago("스테이블코인 급등", "https://kr/1", 2, Source::Kr),
            hours_ago("Stablecoin regulation", "https://us/1", 30, Source::Us),
        ];

        let kr_out = select(&records, &kr(), now());
        let us_out = select(&records, &us(), now());

        assert_eq!(kr_out, vec![records[0].clone()]);
        assert!(us_out.is_empty());
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_substring() {
        let records = vec![
            hours_ago("STABLECOIN issuers grow", "https://us/1", 1, Source::Us),
            hours_ago("Stablecoins are everywhere", "https://us/2", 1, Source::Us),
            hours_ago("Bitcoin dips", "https://us/3", 1, Source::Us),
        ];

        let out = filter(&records, &us(), now());
        let links: Vec<&str> = out.iter().map(|r| r.link.as_str()).collect();

        assert_eq!(links, vec!["https://us/1", "https://us/2"]);
    }

    #[test]
    fn test_keyword_is_trimmed_before_matching() {
        let records = vec![hours_ago("stablecoin law", "https://us/1", 1, Source::Us)];
        let request = DigestRequest::new("US", "  Stablecoin ");
        assert_eq!(filter(&records, &request, now()).len(), 1);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let records = vec![
            hours_ago("stablecoin at edge", "https://us/edge", 24, Source::Us),
            ArticleRecord::new(
                "stablecoin just outside",
                "https://us/out",
                now() - TimeDelta::hours(24) - TimeDelta::seconds(1),
                Source::Us,
            ),
        ];

        let out = filter(&records, &us(), now());

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].link, "https://us/edge");
    }

    #[test]
    fn test_dedup_keeps_first_seen() {
        let first = hours_ago("stablecoin a", "https://same", 1, Source::Kr);
        let second = hours_ago("stablecoin b", " https://same ", 3, Source::Us);

        let out = dedup(vec![first.clone(), second.clone()]);
        assert_eq!(out, vec![first.clone()]);

        let reversed = dedup(vec![second.clone(), first]);
        assert_eq!(reversed, vec![second]);
    }

    #[test]
    fn test_identical_links_survive_once_through_select() {
        let records = vec![
            hours_ago("stablecoin a", "https://same", 1, Source::Kr),
            hours_ago("stablecoin a", "https://same", 1, Source::Us),
        ];
        assert_eq!(select(&records, &us(), now()).len(), 1);
    }

    #[test]
    fn test_sort_newest_first_with_link_tie_break() {
        let records = vec![
            hours_ago("x", "https://b", 2, Source::Us),
            hours_ago("x", "https://c", 5, Source::Us),
            hours_ago("x", "https://a", 2, Source::Us),
            hours_ago("x", "https://d", 1, Source::Us),
        ];

        let out = sort_and_cap(records, 10);
        let links: Vec<&str> = out.iter().map(|r| r.link.as_str()).collect();

        assert_eq!(links, vec!["https://d", "https://a", "https://b", "https://c"]);
    }

    #[test]
    fn test_cap_to_hundred_newest() {
        let records: Vec<ArticleRecord> = (0..150)
            .map(|i| {
                ArticleRecord::new(
                    format!("stablecoin story {}", i),
                    format!("https://us/{}", i),
                    now() - TimeDelta::minutes(i),
                    Source::Us,
                )
            })
            .collect();

        let out = select(&records, &us(), now());

        assert_eq!(out.len(), 100);
        assert_eq!(out[0].link, "https://us/0");
        assert_eq!(out[99].link, "https://us/99");
        assert!(out
            .windows(2)
            .all(|pair| pair[0].published_at >= pair[1].published_at));
    }

    #[test]
    fn test_configured_cap_above_ceiling_is_clamped() {
        let records: Vec<ArticleRecord> = (0..150)
            .map(|i| {
                ArticleRecord::new(
                    "stablecoin",
                    format!("https://us/{}", i),
                    now() - TimeDelta::minutes(i),
                    Source::Us,
                )
            })
            .collect();

        let out = select(&records, &us().with_max_items(500), now());
        assert_eq!(out.len(), 100);
    }

    #[test]
    fn test_non_positive_cap_yields_empty() {
        let records = vec![hours_ago("stablecoin", "https://us/1", 1, Source::Us)];
        assert!(select(&records, &us().with_max_items(0), now()).is_empty());
        assert!(select(&records, &us().with_max_items(-1), now()).is_empty());
    }

    #[test]
    fn test_no_matches_is_empty() {
        let records = vec![hours_ago("Bitcoin dips", "https://us/1", 1, Source::Us)];
        assert!(select(&records, &us(), now()).is_empty());
    }

    #[test]
    fn test_select_is_idempotent() {
        let records = vec![
            hours_ago("stablecoin a", "https://us/2", 3, Source::Us),
            hours_ago("stablecoin b", "https://us/1", 3, Source::Us),
            hours_ago("stablecoin c", "https://us/2", 5, Source::Kr),
            hours_ago("stablecoin d", "https://us/3", 40, Source::Us),
        ];

        let once = select(&records, &us(), now());
        let twice = select(&once, &us(), now());

        assert_eq!(once, twice);
        assert_eq!(once, select(&records, &us(), now()));
    }

    #[test]
    fn test_output_satisfies_membership_rule() {
        let records: Vec<ArticleRecord> = (0..60)
            .map(|i| {
                let title = if i % 3 == 0 { "Bitcoin" } else { "StableCoin news" };
                ArticleRecord::new(
                    title,
                    format!("https://us/{}", i),
                    now() - TimeDelta::hours(i),
                    Source::Us,
                )
            })
            .collect();

        let out = select(&records, &us(), now());
        let window = TimeDelta::hours(24);

        for record in &records {
            let expected = record.title.to_lowercase().contains("stablecoin")
                && now().signed_duration_since(record.published_at) <= window;
            assert_eq!(out.contains(record), expected, "record {}", record.link);
        }
    }
}
