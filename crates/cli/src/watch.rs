//! Long-running mode: collections stay loaded and are reloaded in the
//! background when their files change.

use std::collections::BTreeSet;

use anyhow::Result;
use bulletin_lib::{
    keeper::{event_paths, ArcMutex, FsEvent, Ticket},
    Config, Keeper,
};
use chrono::Utc;
use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

pub async fn run(config: Config) -> Result<()> {
    let now = Utc::now();
    let keeper = tokio::task::spawn_blocking(move || Keeper::new(&config, now)).await??;
    for collection in keeper.collections() {
        info!("Loaded `{}`: {} items", collection.name(), collection.len());
    }
    let roots = keeper.watch_roots();
    let keeper = ArcMutex::new(keeper);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if tx.send(event).is_err() {
            debug!("watch event after shutdown");
        }
    })?;
    for root in &roots {
        watcher.watch(root.as_std_path(), RecursiveMode::NonRecursive)?;
        info!("Watching {root}");
    }

    loop {
        tokio::select! {
            Some(event) = rx.recv() => handle_event(&keeper, event),
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                break;
            }
        }
    }

    Ok(())
}

fn handle_event(keeper: &ArcMutex, event: notify::Result<notify::Event>) {
    let event = match event {
        Ok(event) => event,
        Err(err) => {
            error!("watch error: {err:?}");
            return;
        }
    };
    if !FsEvent::from(event.kind).changes_content() {
        return;
    }

    let tickets = {
        let mut keeper = match keeper.lock() {
            Ok(keeper) => keeper,
            Err(err) => {
                error!("Failed to lock keeper during notify event: {err}");
                return;
            }
        };
        let names = event_paths(&event)
            .iter()
            .flat_map(|path| keeper.collections_containing(path))
            .collect::<BTreeSet<_>>();
        names
            .into_iter()
            .filter_map(|name| keeper.begin(&name).ok())
            .collect::<Vec<_>>()
    };

    for ticket in tickets {
        tokio::spawn(reload(keeper.clone(), ticket));
    }
}

/// Loads off the runtime, then commits unless a newer reload started.
async fn reload(keeper: ArcMutex, ticket: Ticket) {
    let now = Utc::now();
    let joined = tokio::task::spawn_blocking(move || {
        let result = ticket.load(now);
        (ticket, result)
    })
    .await;
    let (ticket, result) = match joined {
        Ok(joined) => joined,
        Err(err) => {
            error!("Reload task failed: {err}");
            return;
        }
    };
    let collection = match result {
        Ok(collection) => collection,
        Err(err) => {
            error!("{err}; keeping the previous `{}`", ticket.name());
            return;
        }
    };

    let len = collection.len();
    let mut guard = match keeper.lock() {
        Ok(guard) => guard,
        Err(err) => {
            error!("Failed to lock keeper after reload: {err}");
            return;
        }
    };
    if guard.commit(&ticket, collection) {
        info!("Reloaded `{}`: {len} items", ticket.name());
    } else {
        debug!(
            "Discarded stale reload of `{}` (generation {})",
            ticket.name(),
            ticket.generation()
        );
    }
}
