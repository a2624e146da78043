#![allow(clippy::missing_errors_doc)]

pub mod coerce;
pub mod collate;
pub mod collection;
pub mod config;
pub mod content_item;
pub mod frontmatter;
mod fs;
pub mod keeper;
pub mod list;
pub mod single;
pub mod source;

pub use coerce::Coercer;
pub use collection::{Collection, LoadError};
pub use config::Config;
pub use content_item::ContentItem;
pub use keeper::Keeper;
pub use source::{DirSource, DocumentSource, MemorySource, RawDocument, SourceError};
