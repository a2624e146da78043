use bulletin_lib::{config::DEFAULT_CONFIG_FILE, list};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Load, list and look up markdown content collections
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Config file path
    #[arg(short = 'C', long, default_value = DEFAULT_CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: Utf8PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a listing page of a collection as JSON
    #[command(visible_alias = "ls")]
    List {
        collection: String,

        #[command(flatten)]
        listing: ListingArgs,

        /// Items to skip
        #[arg(long)]
        offset: Option<usize>,

        /// Maximum items to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print one item and its neighbours in the listing as JSON
    Show {
        collection: String,

        slug: String,

        #[command(flatten)]
        listing: ListingArgs,
    },

    /// Print the categories used in a collection
    Categories {
        collection: String,

        /// Count unpublished items too
        #[arg(long)]
        include_unpublished: bool,
    },

    /// Keep every collection loaded and reload on file changes
    Watch,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListingArgs {
    /// Only items in this category ("all" for every category)
    #[arg(long)]
    pub category: Option<String>,

    /// Case-insensitive text to look for in title, excerpt and body
    #[arg(long)]
    pub search: Option<String>,

    /// order, date_desc or title [default: the collection's configured sort]
    #[arg(long)]
    pub sort: Option<list::SortBy>,

    /// Include items marked `published: false`
    #[arg(long)]
    pub include_unpublished: bool,
}

impl ListingArgs {
    pub fn params(&self, default_sort: list::SortBy) -> list::Params {
        list::Params {
            category: self.category.clone(),
            search: self.search.clone(),
            sort: self.sort.unwrap_or(default_sort),
            include_unpublished: self.include_unpublished,
            offset: None,
            limit: None,
        }
    }
}

#[cfg(test)]
mod test {
    use bulletin_lib::list::SortBy;
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, Command};

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags() {
        let cli = Cli::try_parse_from([
            "bulletin", "-C", "site/bulletin.yaml", "list", "stories", "--search", "welfare",
            "--sort", "title", "--limit", "5",
        ])
        .unwrap();
        assert_eq!("site/bulletin.yaml", cli.config.as_str());
        let Command::List {
            collection,
            listing,
            offset,
            limit,
        } = cli.command
        else {
            panic!("expected list");
        };
        assert_eq!("stories", collection);
        assert_eq!((None, Some(5)), (offset, limit));

        let params = listing.params(SortBy::DateDesc);
        assert_eq!(SortBy::Title, params.sort);
        assert_eq!(Some("welfare".to_owned()), params.search);
        assert!(!params.include_unpublished);
    }

    #[test]
    fn configured_sort_is_the_default() {
        let cli = Cli::try_parse_from(["bulletin", "show", "faq", "join"]).unwrap();
        let Command::Show { listing, slug, .. } = cli.command else {
            panic!("expected show");
        };
        assert_eq!("join", slug);
        assert_eq!(SortBy::Order, listing.params(SortBy::Order).sort);
        assert_eq!("bulletin.yaml", cli.config.as_str());
    }

    #[test]
    fn bad_sort_is_rejected() {
        assert!(Cli::try_parse_from(["bulletin", "list", "faq", "--sort", "newest"]).is_err());
    }
}
