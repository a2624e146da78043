use serde::Serialize;
use tracing::debug;

use crate::collection::Collection;
use crate::content_item::ContentItem;
use crate::list::{self, Params};

fn find_item_and_index<'a>(
    items: &[&'a ContentItem],
    slug: &str,
) -> Option<(usize, &'a ContentItem)> {
    items
        .iter()
        .enumerate()
        .find(|(_, item)| item.slug() == slug)
        .map(|(i, item)| (i, *item))
}

fn get_prev_and_next_slugs<'a>(
    items: &[&'a ContentItem],
    i: usize,
) -> (Option<&'a str>, Option<&'a str>) {
    let prev_slug = i.checked_sub(1).map(|p| items[p].slug());
    let next_slug = items.get(i + 1).map(|item| item.slug());
    (prev_slug, next_slug)
}

/// A detail page: the item plus its neighbours in the listing.
#[derive(Serialize)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Response<'a> {
    pub item: &'a ContentItem,
    pub prev_slug: Option<&'a str>,
    pub next_slug: Option<&'a str>,
}

/// Looks `slug` up for a detail page.
///
/// Neighbours come from the listing `params` describes (pagination is
/// ignored). The item is returned even when that listing would hide it,
/// e.g. an unpublished story reached by direct link. `None` means the slug
/// does not exist.
#[must_use]
pub fn get<'a>(collection: &'a Collection, slug: &str, params: &Params) -> Option<Response<'a>> {
    debug!("Received single request for `{slug}` in `{}`", collection.name());
    if collection.get(slug).is_none() {
        return None;
    }

    let items = list::filtered_sorted(collection, params, Some(slug));

    let (i, item) = find_item_and_index(&items, slug)?;

    let (prev_slug, next_slug) = get_prev_and_next_slugs(&items, i);

    debug!("Sending single response: prev {prev_slug:?}, next {next_slug:?}");
    Some(Response {
        item,
        prev_slug,
        next_slug,
    })
}
