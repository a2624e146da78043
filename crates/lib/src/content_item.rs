use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coerce::Coercer;
use crate::frontmatter::{self, field};

/// One normalised document. Built once per load pass and never changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    slug: String,
    title: String,
    date: DateTime<Utc>,
    category: String,
    order: i64,
    published: bool,
    thumbnail: Option<String>,
    excerpt: Option<String>,
    body: String,
    source_id: Utf8PathBuf,
}

impl ContentItem {
    /// Parses a whole document. Never fails: every field has a fallback.
    #[must_use]
    pub fn parse(source_id: &Utf8Path, text: &str, coercer: &Coercer) -> Self {
        let (fm, body) = frontmatter::parse(text);

        let slug = derive_slug(source_id, coercer.string(&fm, field::SLUG).as_deref());
        let title = coercer
            .string(&fm, field::TITLE)
            .unwrap_or_else(|| slug.clone());

        ContentItem {
            title,
            date: coercer.date(&fm, field::DATE),
            category: coercer.category(&fm),
            order: coercer.integer(&fm, field::ORDER),
            published: coercer.boolean(&fm, field::PUBLISHED),
            thumbnail: coercer.string(&fm, field::THUMBNAIL),
            excerpt: coercer.string(&fm, field::EXCERPT),
            body: body.trim().to_owned(),
            source_id: source_id.to_owned(),
            slug,
        }
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn order(&self) -> i64 {
        self.order
    }

    #[must_use]
    pub fn published(&self) -> bool {
        self.published
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    #[must_use]
    pub fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    /// Frontmatter-free, trimmed markdown, ready for a renderer.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn source_id(&self) -> &Utf8Path {
        &self.source_id
    }
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_hangul(c)
}

/// Lowercases and collapses every run of other characters to one `-`.
/// Hangul is kept as is.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut gap = false;
    for c in input.chars() {
        if is_slug_char(c) {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    slug
}

/// Strips a leading `YYYY-MM-DD-`.
fn strip_date_prefix(stem: &str) -> &str {
    let bytes = stem.as_bytes();
    if bytes.len() < 11 {
        return stem;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if digits(0..4)
        && bytes[4] == b'-'
        && digits(5..7)
        && bytes[7] == b'-'
        && digits(8..10)
        && bytes[10] == b'-'
    {
        &stem[11..]
    } else {
        stem
    }
}

/// An explicit slug wins; otherwise the file stem is used, without its
/// date prefix. Falls back to less processed forms rather than returning
/// an empty slug.
#[must_use]
pub fn derive_slug(source_id: &Utf8Path, explicit: Option<&str>) -> String {
    if let Some(slug) = explicit.map(slugify).filter(|slug| !slug.is_empty()) {
        return slug;
    }

    let stem = source_id
        .file_stem()
        .unwrap_or_else(|| source_id.as_str());

    [slugify(strip_date_prefix(stem)), slugify(stem)]
        .into_iter()
        .find(|slug| !slug.is_empty())
        .unwrap_or_else(|| stem.to_owned())
}
