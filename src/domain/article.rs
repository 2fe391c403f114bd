use chrono::{DateTime, Utc};

/// Which configured feed produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Kr,
    Us,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Kr => "KR",
            Source::Us => "US",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One feed entry with a resolved UTC publication instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub source: Source,
}

impl ArticleRecord {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
        source: Source,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at,
            source,
        }
    }

    /// Identity used for deduplication
    pub fn dedup_key(&self) -> &str {
        self.link.trim()
    }
}
