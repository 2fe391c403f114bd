use crate::config::{DEFAULT_HOURS_BACK, DEFAULT_MAX_ITEMS};

/// Hard upper bound on digest length, whatever is configured
pub const MAX_ITEMS_CEILING: i64 = 100;

/// Settings for one keyword's digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRequest {
    /// Short tag shown in the subject line
    pub label: String,
    pub keyword: String,
    pub lookback_hours: i64,
    pub max_items: i64,
}

impl DigestRequest {
    pub fn new(label: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            keyword: keyword.into(),
            lookback_hours: DEFAULT_HOURS_BACK,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn with_lookback_hours(mut self, hours: i64) -> Self {
        self.lookback_hours = hours;
        self
    }

    pub fn with_max_items(mut self, max_items: i64) -> Self {
        self.max_items = max_items;
        self
    }

    /// `min(max_items, 100)`, with non-positive values meaning zero
    pub fn effective_cap(&self) -> usize {
        self.max_items.clamp(0, MAX_ITEMS_CEILING) as usize
    }
}
