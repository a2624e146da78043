use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::frontmatter::{field, FrontmatterBlock};

/// Category given to items that do not name one.
pub const DEFAULT_CATEGORY: &str = "all";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Turns raw header values into typed ones.
///
/// Every accessor has a defined fallback. The clock is injected: a missing
/// or unreadable date becomes `now`, so two coercers built from the same
/// instant agree on every document.
#[derive(Debug, Clone)]
pub struct Coercer {
    now: DateTime<Utc>,
    default_category: String,
}

impl Coercer {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            default_category: DEFAULT_CATEGORY.to_owned(),
        }
    }

    #[must_use]
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Empty values count as absent.
    #[must_use]
    pub fn string(&self, block: &FrontmatterBlock, key: &str) -> Option<String> {
        block
            .get(key)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
    }

    #[must_use]
    pub fn date(&self, block: &FrontmatterBlock, key: &str) -> DateTime<Utc> {
        block.get(key).and_then(parse_date).unwrap_or(self.now)
    }

    /// Only the literal `false` is false.
    #[must_use]
    pub fn boolean(&self, block: &FrontmatterBlock, key: &str) -> bool {
        block.get(key).map_or(true, |value| value.trim() != "false")
    }

    #[must_use]
    pub fn integer(&self, block: &FrontmatterBlock, key: &str) -> i64 {
        block
            .get(key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn category(&self, block: &FrontmatterBlock) -> String {
        self.string(block, field::CATEGORY)
            .unwrap_or_else(|| self.default_category.clone())
    }
}

/// Naive values are read as UTC; a bare date is UTC midnight.
#[must_use]
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(value, format) {
            return Some(date_time.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|date_time| date_time.and_utc());
        }
    }
    None
}
