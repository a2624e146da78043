use std::{
    collections::BTreeMap,
    sync::{Arc, LockResult, Mutex, MutexGuard},
};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::coerce::Coercer;
use crate::collection::{Collection, LoadError};
use crate::config::Config;
use crate::source::DocumentSource;

// Let's keep the possible events simpler for our needs
#[derive(Debug, PartialEq)]
pub enum FsEvent {
    Rename,
    Edit,
    Create,
    Delete,
    Ignored,
    Unhandled(notify::EventKind),
}

impl From<notify::EventKind> for FsEvent {
    fn from(event_kind: notify::EventKind) -> Self {
        use notify::event::{
            AccessKind, AccessMode, CreateKind, DataChange, EventKind, ModifyKind, RemoveKind,
        };
        match event_kind {
            EventKind::Modify(ModifyKind::Name(_)) => Self::Rename,
            EventKind::Modify(ModifyKind::Data(DataChange::Content | DataChange::Any)) => {
                Self::Edit
            }
            EventKind::Remove(RemoveKind::File) => Self::Delete,
            EventKind::Create(CreateKind::File) => Self::Create,
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => Self::Ignored,
            unhandled => Self::Unhandled(unhandled),
        }
    }
}

impl FsEvent {
    #[must_use]
    pub fn changes_content(&self) -> bool {
        matches!(self, Self::Rename | Self::Edit | Self::Create | Self::Delete)
    }
}

/// Permission to install the result of one load pass.
///
/// Only the most recently issued ticket of a collection may commit, so a
/// slow pass that finishes after a newer one has begun is dropped.
pub struct Ticket {
    name: String,
    generation: u64,
    sources: Arc<[Box<dyn DocumentSource>]>,
    default_category: String,
}

impl Ticket {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs the load pass. Needs no access to the keeper.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Collection, LoadError> {
        let coercer = Coercer::new(now).with_default_category(self.default_category.clone());
        Collection::load(self.name.clone(), &self.sources, &coercer)
    }
}

struct Entry {
    sources: Arc<[Box<dyn DocumentSource>]>,
    default_category: String,
    collection: Collection,
    latest: u64,
}

/// Every loaded collection, kept for the life of the process.
#[derive(Default)]
pub struct Keeper {
    entries: BTreeMap<String, Entry>,
}

impl Keeper {
    pub fn new(config: &Config, now: DateTime<Utc>) -> Result<Self, LoadError> {
        let mut keeper = Keeper::default();
        for (name, collection) in &config.collections {
            keeper.insert(
                name,
                collection.document_sources(),
                &collection.default_category,
                now,
            )?;
        }
        Ok(keeper)
    }

    /// Loads a collection and starts keeping it.
    pub fn insert(
        &mut self,
        name: &str,
        sources: Vec<Box<dyn DocumentSource>>,
        default_category: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LoadError> {
        let sources: Arc<[Box<dyn DocumentSource>]> = sources.into();
        let coercer = Coercer::new(now).with_default_category(default_category);
        let collection = Collection::load(name, &sources, &coercer)?;
        self.entries.insert(
            name.to_owned(),
            Entry {
                sources,
                default_category: default_category.to_owned(),
                collection,
                latest: 0,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.entries.get(name).map(|entry| &entry.collection)
    }

    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.entries.values().map(|entry| &entry.collection)
    }

    /// Names of collections with a source that `path` belongs to.
    #[must_use]
    pub fn collections_containing(&self, path: &Utf8Path) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.sources.iter().any(|source| source.contains(path)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Directories the sources live in, for a file watcher.
    #[must_use]
    pub fn watch_roots(&self) -> Vec<Utf8PathBuf> {
        let mut roots = self
            .entries
            .values()
            .flat_map(|entry| entry.sources.iter())
            .filter_map(|source| source.watch_root())
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();
        roots.sort();
        roots.dedup();
        roots
    }

    /// Starts a load pass, making every earlier ticket stale.
    pub fn begin(&mut self, name: &str) -> Result<Ticket, LoadError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| LoadError::UnknownCollection(name.to_owned()))?;
        entry.latest += 1;
        Ok(Ticket {
            name: name.to_owned(),
            generation: entry.latest,
            sources: Arc::clone(&entry.sources),
            default_category: entry.default_category.clone(),
        })
    }

    /// Installs `collection` unless a newer pass has begun since `ticket`.
    pub fn commit(&mut self, ticket: &Ticket, collection: Collection) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.name) else {
            warn!("Dropping load of unknown collection `{}`", ticket.name);
            return false;
        };
        if ticket.generation != entry.latest {
            debug!(
                "Dropping stale load of `{}` (generation {}, latest {})",
                ticket.name, ticket.generation, entry.latest
            );
            return false;
        }
        entry.collection = collection;
        true
    }

    /// Reloads in place. On failure the previous collection stays.
    pub fn reload(&mut self, name: &str, now: DateTime<Utc>) -> Result<(), LoadError> {
        let ticket = self.begin(name)?;
        let collection = ticket.load(now)?;
        self.commit(&ticket, collection);
        info!("Reloaded `{name}`");
        Ok(())
    }

    pub fn reload_all(&mut self, now: DateTime<Utc>) -> Result<(), LoadError> {
        let names = self.entries.keys().cloned().collect::<Vec<_>>();
        for name in names {
            self.reload(&name, now)?;
        }
        Ok(())
    }

    fn process_content_event(&mut self, path: &Utf8Path) {
        let names = self.collections_containing(path);
        if names.is_empty() {
            debug!("No collection reads ({path:?}), ignoring");
            return;
        }
        for name in names {
            if let Err(err) = self.reload(&name, Utc::now()) {
                error!("Couldn't reload `{name}` after a change to ({path:?}): {err}");
            }
        }
    }
}

#[derive(Clone)]
pub struct ArcMutex(pub Arc<Mutex<Keeper>>);

impl ArcMutex {
    pub fn new(keeper: Keeper) -> Self {
        Self(Arc::new(Mutex::new(keeper)))
    }

    pub fn lock(&self) -> LockResult<MutexGuard<'_, Keeper>> {
        self.0.as_ref().lock()
    }
}

/// UTF-8 paths from an event. Others are logged and skipped.
pub fn event_paths(event: &notify::Event) -> Vec<Utf8PathBuf> {
    event
        .paths
        .iter()
        .filter_map(|path| match Utf8PathBuf::try_from(path.clone()) {
            Ok(path) => Some(path),
            Err(err) => {
                error!("Event filepath ({path:?}) was not UTF-8: {err}. Non-UTF-8 paths not supported.");
                None
            }
        })
        .collect()
}

impl notify::EventHandler for ArcMutex {
    fn handle_event(&mut self, event: notify::Result<notify::Event>) {
        match event {
            Ok(event) => {
                let kind = FsEvent::from(event.kind);
                match kind {
                    FsEvent::Ignored => return,
                    FsEvent::Unhandled(kind) => {
                        debug!("unhandled watch event: {kind:?}");
                        return;
                    }
                    _ => (),
                }
                let paths = event_paths(&event);
                let mut keeper = match self.lock() {
                    Ok(keeper) => keeper,
                    Err(err) => {
                        error!("Failed to lock keeper during notify event: {err}");
                        return;
                    }
                };
                for path in &paths {
                    debug!("{kind:?} at ({path:?})");
                    keeper.process_content_event(path);
                }
            }
            Err(e) => error!("watch error: {e:?}"),
        }
    }
}
