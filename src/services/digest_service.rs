use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::domain::Digest;
use crate::errors::{DigestError, DigestResult};
use crate::services::aggregate_service::AggregateService;
use crate::services::notification_service::Mailer;
use crate::services::pipeline;
use crate::sources::FeedFetcher;

/// Result of sending one keyword's digest
#[derive(Debug)]
pub struct DispatchOutcome {
    pub keyword: String,
    pub item_count: usize,
    pub error: Option<DigestError>,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<DispatchOutcome>,
}

impl RunReport {
    pub fn sent(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.sent()
    }

    /// A run fails only when every attempted dispatch failed
    pub fn into_result(self) -> DigestResult<Self> {
        if !self.outcomes.is_empty() && self.sent() == 0 {
            return Err(DigestError::AllDispatchesFailed(self.outcomes.len()));
        }
        Ok(self)
    }
}

pub struct DigestService<F: FeedFetcher> {
    aggregator: AggregateService<F>,
    config: Config,
}

impl<F: FeedFetcher> DigestService<F> {
    pub fn new(fetcher: F, config: Config) -> Self {
        Self {
            aggregator: AggregateService::new(fetcher),
            config,
        }
    }

    /// Fetch both feeds once and build one digest per keyword.
    ///
    /// Fails with `AllSourcesFailed` when no feed could be read, so a
    /// network outage is never reported as "no news".
    pub fn prepare(&self, now: DateTime<Utc>) -> DigestResult<Vec<Digest>> {
        let aggregate = self.aggregator.aggregate(&self.config.sources());
        if aggregate.all_failed() {
            return Err(DigestError::AllSourcesFailed);
        }

        let digests = self
            .config
            .requests()
            .iter()
            .map(|request| {
                let selected = pipeline::select(&aggregate.records, request, now);
                tracing::info!(
                    keyword = %request.keyword,
                    candidates = aggregate.records.len(),
                    selected = selected.len(),
                    "Selected articles"
                );
                Digest::build(&selected, request, now)
            })
            .collect();

        Ok(digests)
    }
}

/// Send every digest; one failure does not stop the others
pub fn dispatch_all<M: Mailer + ?Sized>(mailer: &M, to: &str, digests: &[Digest]) -> RunReport {
    let mut report = RunReport::default();

    for digest in digests {
        let error = match mailer.send(to, &digest.subject, &digest.body()) {
            Ok(()) => {
                tracing::info!(keyword = %digest.keyword, items = digest.item_count, "Digest sent");
                None
            }
            Err(e) => {
                tracing::error!(keyword = %digest.keyword, "Digest dispatch failed: {}", e);
                Some(e)
            }
        };

        report.outcomes.push(DispatchOutcome {
            keyword: digest.keyword.clone(),
            item_count: digest.item_count,
            error,
        });
    }

    report
}
