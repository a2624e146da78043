use tracing::debug;

use crate::collection::Collection;

/// Distinct category names in `collection`, sorted, without the
/// collection's default category.
#[must_use]
pub fn categories(collection: &Collection, include_unpublished: bool) -> Vec<String> {
    debug!("Received collate request for `{}`", collection.name());
    let mut values = collection
        .items()
        .iter()
        .filter(|item| include_unpublished || item.published())
        .map(|item| item.category())
        .filter(|category| *category != collection.default_category())
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();

    values.sort();
    values.dedup();

    debug!("Sending collate response: {values:?}");
    values
}
