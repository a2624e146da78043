use std::collections::{HashMap, HashSet};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{debug, warn};

use crate::coerce::Coercer;
use crate::content_item::ContentItem;
use crate::source::{DocumentSource, RawDocument, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to load collection `{collection}`: {source}")]
    Source {
        collection: String,
        #[source]
        source: SourceError,
    },
    #[error("No collection named `{0}`")]
    UnknownCollection(String),
}

/// A document dropped because an earlier one already claimed its slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shadowed {
    pub slug: String,
    pub source_id: Utf8PathBuf,
    pub winner: Utf8PathBuf,
}

/// Every item of one content category, in load order.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    default_category: String,
    items: Vec<ContentItem>,
    by_slug: HashMap<String, usize>,
    shadowed: Vec<Shadowed>,
}

impl Collection {
    /// Reads every source, in order, and builds the collection.
    ///
    /// Earlier sources take precedence: when two documents end up with the
    /// same slug, the one read first is kept. Any unreadable source fails
    /// the whole pass.
    pub fn load(
        name: impl Into<String>,
        sources: &[Box<dyn DocumentSource>],
        coercer: &Coercer,
    ) -> Result<Self, LoadError> {
        let name = name.into();
        let mut documents = Vec::new();
        for source in sources {
            match source.read_documents() {
                Ok(docs) => documents.extend(docs),
                Err(source) => {
                    return Err(LoadError::Source {
                        collection: name,
                        source,
                    })
                }
            }
        }
        Ok(Self::from_documents(name, documents, coercer))
    }

    #[must_use]
    pub fn from_documents(
        name: impl Into<String>,
        documents: impl IntoIterator<Item = RawDocument>,
        coercer: &Coercer,
    ) -> Self {
        let name = name.into();
        let mut seen_ids = HashSet::new();
        let mut items: Vec<ContentItem> = Vec::new();
        let mut by_slug = HashMap::new();
        let mut shadowed = Vec::new();

        for document in documents {
            if !seen_ids.insert(document.source_id.clone()) {
                warn!(
                    "Document ({}) was offered twice to `{name}`; keeping the first",
                    document.source_id
                );
                continue;
            }

            let item = ContentItem::parse(&document.source_id, &document.text, coercer);

            if let Some(&i) = by_slug.get(item.slug()) {
                let winner: &ContentItem = &items[i];
                warn!(
                    "Slug `{}` in `{name}` is already taken by {}; ignoring {}",
                    item.slug(),
                    winner.source_id(),
                    item.source_id()
                );
                shadowed.push(Shadowed {
                    slug: item.slug().to_owned(),
                    source_id: item.source_id().to_owned(),
                    winner: winner.source_id().to_owned(),
                });
                continue;
            }

            by_slug.insert(item.slug().to_owned(), items.len());
            items.push(item);
        }

        debug!(
            "Loaded `{name}`: {} items, {} shadowed",
            items.len(),
            shadowed.len()
        );

        Collection {
            name,
            default_category: coercer.default_category().to_owned(),
            items,
            by_slug,
            shadowed,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Published items only, in load order.
    pub fn public(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|item| item.published())
    }

    /// Exact, case-sensitive slug lookup. Unpublished items are found too,
    /// so a direct link keeps working.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&ContentItem> {
        self.by_slug.get(slug).map(|&i| &self.items[i])
    }

    #[must_use]
    pub fn shadowed(&self) -> &[Shadowed] {
        &self.shadowed
    }
}
