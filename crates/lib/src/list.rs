use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::Collection;
use crate::content_item::ContentItem;

/// Category selector that lets every item through.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Manual `order` ascending, then title.
    Order,
    /// Newest first. Undated items carry the load time as their date, so
    /// where they land relative to each other depends on when the
    /// collection was loaded.
    #[default]
    DateDesc,
    Title,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown sort `{0}` (expected one of: order, date_desc, title)")]
pub struct UnknownSort(String);

impl FromStr for SortBy {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "date_desc" => Ok(Self::DateDesc),
            "title" => Ok(Self::Title),
            other => Err(UnknownSort(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Params {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: SortBy,
    pub include_unpublished: bool,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Response<'a> {
    /// Matching items before pagination.
    pub total: usize,
    pub items: Vec<&'a ContentItem>,
}

struct Filter<'p> {
    category: Option<&'p str>,
    needle: Option<String>,
    include_unpublished: bool,
}

impl<'p> Filter<'p> {
    fn new(params: &'p Params) -> Self {
        Self {
            category: params.category.as_deref().filter(|c| *c != ALL),
            needle: params
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            include_unpublished: params.include_unpublished,
        }
    }

    fn matches(&self, item: &ContentItem) -> bool {
        if !self.include_unpublished && !item.published() {
            return false;
        }
        if let Some(category) = self.category {
            if item.category() != category {
                return false;
            }
        }
        let Some(needle) = &self.needle else {
            return true;
        };
        [Some(item.title()), item.excerpt(), Some(item.body())]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(needle.as_str()))
    }
}

fn compare(sort_by: SortBy, a: &ContentItem, b: &ContentItem) -> Ordering {
    match sort_by {
        SortBy::Order => a
            .order()
            .cmp(&b.order())
            .then_with(|| a.title().cmp(b.title())),
        SortBy::DateDesc => b.date().cmp(a.date()),
        SortBy::Title => a.title().cmp(b.title()),
    }
}

/// Stable: equal keys keep their load order.
fn sort_with_params(sort_by: SortBy, items: &mut [&ContentItem]) {
    items.sort_by(|a, b| compare(sort_by, a, b));
}

fn paginate<T>(items: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    match (offset, limit) {
        (None, None) => items,
        (None, Some(limit)) => items.into_iter().take(limit).collect(),
        (Some(offset), None) => items.into_iter().skip(offset).collect(),
        (Some(offset), Some(limit)) => items.into_iter().skip(offset).take(limit).collect(),
    }
}

/// Items of `collection` that pass `params`, sorted. Pagination is left to
/// the caller. `slug` is let through the filter regardless.
pub(crate) fn filtered_sorted<'a>(
    collection: &'a Collection,
    params: &Params,
    slug: Option<&str>,
) -> Vec<&'a ContentItem> {
    let filter = Filter::new(params);
    let mut items = collection
        .items()
        .iter()
        .filter(|item| slug == Some(item.slug()) || filter.matches(item))
        .collect::<Vec<_>>();
    sort_with_params(params.sort, &mut items);
    items
}

/// A listing page over `collection`. The collection itself is untouched.
#[must_use]
pub fn view<'a>(collection: &'a Collection, params: &Params) -> Response<'a> {
    debug!("Received list request for `{}`: {params:?}", collection.name());
    let items = filtered_sorted(collection, params, None);
    let total = items.len();
    let response = Response {
        total,
        items: paginate(items, params.offset, params.limit),
    };
    debug!(
        "Sending list response: {} of {} items",
        response.items.len(),
        response.total
    );
    response
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::{view, Params, SortBy, ALL};
    use crate::coerce::Coercer;
    use crate::collection::Collection;
    use crate::source::RawDocument;

    macro_rules! s {
        ($v:literal) => {
            Some($v.to_owned())
        };
    }

    fn collection(docs: &[(&str, &str)]) -> Collection {
        Collection::from_documents(
            "test",
            docs.iter().map(|(id, text)| RawDocument::new(*id, *text)),
            &Coercer::new(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
        )
    }

    fn titles(collection: &Collection, params: &Params) -> Vec<String> {
        view(collection, params)
            .items
            .iter()
            .map(|item| item.title().to_owned())
            .collect()
    }

    #[test]
    fn order_ties_break_on_title() {
        let faq = collection(&[
            ("b.md", "---\ntitle: B\norder: 2\n---\n"),
            ("a.md", "---\ntitle: A\norder: 1\n---\n"),
            ("c.md", "---\ntitle: C\norder: 1\n---\n"),
        ]);
        let params = Params {
            sort: SortBy::Order,
            ..Params::default()
        };
        assert_eq!(vec!["A", "C", "B"], titles(&faq, &params));
    }

    #[test]
    fn newest_first() {
        let stories = collection(&[
            ("jan.md", "---\ntitle: January\ndate: 2024-01-01\n---\n"),
            ("jun.md", "---\ntitle: June\ndate: 2024-06-01\n---\n"),
            ("mar.md", "---\ntitle: March\ndate: 2024-03-01\n---\n"),
        ]);
        assert_eq!(
            vec!["June", "March", "January"],
            titles(&stories, &Params::default())
        );
    }

    #[test]
    fn equal_dates_keep_load_order() {
        let stories = collection(&[
            ("z.md", "---\ntitle: Z\ndate: 2024-01-01\n---\n"),
            ("a.md", "---\ntitle: A\ndate: 2024-01-01\n---\n"),
        ]);
        assert_eq!(vec!["Z", "A"], titles(&stories, &Params::default()));
    }

    #[test]
    fn search_is_case_insensitive_over_title_excerpt_and_body() {
        let stories = collection(&[
            ("one.md", "---\ntitle: One\n---\nOn Welfare Design in practice"),
            ("two.md", "---\ntitle: Two\n---\nSomething else"),
            ("three.md", "---\ntitle: Three\nexcerpt: about WELFARE\n---\n"),
            ("four.md", "---\ntitle: Welfare four\n---\n"),
        ]);
        let params = Params {
            search: s!("welfare"),
            sort: SortBy::Title,
            ..Params::default()
        };
        assert_eq!(vec!["One", "Three", "Welfare four"], titles(&stories, &params));

        let params = Params {
            search: s!("welfare design"),
            ..Params::default()
        };
        assert_eq!(vec!["One"], titles(&stories, &params));

        let params = Params {
            search: s!("   "),
            ..Params::default()
        };
        assert_eq!(4, view(&stories, &params).total);
    }

    #[test]
    fn category_filter_and_all_sentinel() {
        let notices = collection(&[
            ("a.md", "---\ntitle: A\ncategory: event\n---\n"),
            ("b.md", "---\ntitle: B\ncategory: notice\n---\n"),
            ("c.md", "---\ntitle: C\n---\n"),
        ]);
        let mut params = Params {
            category: s!("notice"),
            sort: SortBy::Title,
            ..Params::default()
        };
        assert_eq!(vec!["B"], titles(&notices, &params));

        params.category = Some(ALL.to_owned());
        assert_eq!(vec!["A", "B", "C"], titles(&notices, &params));

        params.category = s!("Notice");
        assert!(titles(&notices, &params).is_empty());
    }

    #[test]
    fn unpublished_excluded_unless_asked() {
        let stories = collection(&[
            ("a.md", "---\ntitle: A\npublished: false\n---\n"),
            ("b.md", "---\ntitle: B\npublished: FALSE\n---\n"),
        ]);
        let mut params = Params {
            sort: SortBy::Title,
            ..Params::default()
        };
        assert_eq!(vec!["B"], titles(&stories, &params));

        params.include_unpublished = true;
        assert_eq!(vec!["A", "B"], titles(&stories, &params));
    }

    #[test]
    fn pagination_reports_total() {
        let stories = collection(&[
            ("a.md", "---\ntitle: A\n---\n"),
            ("b.md", "---\ntitle: B\n---\n"),
            ("c.md", "---\ntitle: C\n---\n"),
            ("d.md", "---\ntitle: D\n---\n"),
        ]);
        let params = Params {
            sort: SortBy::Title,
            offset: Some(1),
            limit: Some(2),
            ..Params::default()
        };
        let response = view(&stories, &params);
        assert_eq!(4, response.total);
        assert_eq!(vec!["B", "C"], titles(&stories, &params));
    }

    #[test]
    fn viewing_leaves_collection_order_alone() {
        let stories = collection(&[
            ("b.md", "---\ntitle: B\n---\n"),
            ("a.md", "---\ntitle: A\n---\n"),
        ]);
        let params = Params {
            sort: SortBy::Title,
            ..Params::default()
        };
        let _ = view(&stories, &params);
        assert_eq!("b", stories.items()[0].slug());
    }

    #[test]
    fn sort_names() {
        assert_eq!(SortBy::Order, "order".parse().unwrap());
        assert_eq!(SortBy::DateDesc, "date_desc".parse().unwrap());
        assert!("newest".parse::<SortBy>().is_err());
        let parsed: SortBy = serde_json::from_str("\"title\"").unwrap();
        assert_eq!(SortBy::Title, parsed);
    }
}
