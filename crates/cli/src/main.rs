mod args;
mod watch;

use std::io::Write;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use bulletin_lib::{collate, list, single, Collection, Config};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};

/// Exit status for a slug that does not exist.
const NOT_FOUND: u8 = 2;

fn collection_config<'a>(
    config: &'a Config,
    name: &str,
) -> Result<&'a bulletin_lib::config::CollectionConfig> {
    config
        .collections
        .get(name)
        .ok_or_else(|| anyhow!("No collection named `{name}` in the config"))
}

/// One load pass, run off the async runtime.
async fn load(config: &Config, name: &str) -> Result<Collection> {
    let collection_config = collection_config(config, name)?.clone();
    let name = name.to_owned();
    let now = Utc::now();
    let collection = tokio::task::spawn_blocking(move || {
        Collection::load(
            name,
            &collection_config.document_sources(),
            &collection_config.coercer(now),
        )
    })
    .await??;
    Ok(collection)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn no_items_message(collection: &str) -> String {
    format!("No items in {collection}.")
}

fn not_found_message(collection: &str, slug: &str) -> String {
    format!(
        "Content \"{slug}\" not found. Back to the {collection} listing: bulletin list {collection}"
    )
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_path(&cli.config)?;

    match cli.command {
        Command::List {
            collection,
            listing,
            offset,
            limit,
        } => {
            let mut params = listing.params(collection_config(&config, &collection)?.sort);
            params.offset = offset;
            params.limit = limit;

            let collection = load(&config, &collection).await?;
            let response = list::view(&collection, &params);
            if response.total == 0 {
                eprintln!("{}", no_items_message(collection.name()));
            }
            print_json(&response)?;
        }
        Command::Show {
            collection,
            slug,
            listing,
        } => {
            let params = listing.params(collection_config(&config, &collection)?.sort);

            let collection = load(&config, &collection).await?;
            let Some(response) = single::get(&collection, &slug, &params) else {
                eprintln!("{}", not_found_message(collection.name(), &slug));
                return Ok(ExitCode::from(NOT_FOUND));
            };
            print_json(&response)?;
        }
        Command::Categories {
            collection,
            include_unpublished,
        } => {
            let collection = load(&config, &collection).await?;
            print_json(&collate::categories(&collection, include_unpublished))?;
        }
        Command::Watch => watch::run(config).await?,
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
