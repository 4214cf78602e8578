pub mod output;

use clap::{Args, Subcommand, ValueEnum};
use futures::future::try_join_all;
use output::print_json;
use xiami_crawler::{ArtistLocator, AsyncPaginatedIterator, XiamiClient};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LocatorKind {
    /// Free-text artist name, resolved through lookup and search
    Name,
    /// Canonical numeric artist id
    Id,
    /// Alternate string id, as found in some artist links
    StringId,
}

#[derive(Args, Debug)]
pub struct ArtistArgs {
    /// Artist name or id
    artist: String,

    /// How to interpret the artist argument
    #[arg(long, value_enum, default_value = "name")]
    by: LocatorKind,
}

impl ArtistArgs {
    fn locator(&self) -> Result<ArtistLocator, Box<dyn std::error::Error>> {
        Ok(match self.by {
            LocatorKind::Name => ArtistLocator::Name(self.artist.clone()),
            LocatorKind::StringId => ArtistLocator::StringId(self.artist.clone()),
            LocatorKind::Id => ArtistLocator::Id(
                self.artist
                    .parse()
                    .map_err(|e| format!("'{}' is not a numeric artist id: {e}", self.artist))?,
            ),
        })
    }
}

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Page to fetch (1-based)
    #[arg(long, default_value = "1")]
    page: u32,

    /// Walk every page instead of fetching a single one
    #[arg(long, conflicts_with = "page")]
    all: bool,

    /// Maximum number of items to collect with --all (0 for no limit)
    #[arg(long, default_value = "0", requires = "all")]
    limit: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one or more featured collections
    ///
    /// Usage examples:
    /// # Show a single collection
    /// xiami-crawler collection 32731658
    ///
    /// # Fetch several collections concurrently
    /// xiami-crawler collection 32731658 31860101
    Collection {
        /// Collection ids
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Show an artist's profile
    ///
    /// Usage examples:
    /// xiami-crawler artist 周杰伦
    /// xiami-crawler artist 1260 --by id
    Artist(ArtistArgs),

    /// List an artist's albums
    Albums {
        #[command(flatten)]
        artist: ArtistArgs,
        #[command(flatten)]
        paging: PageArgs,
    },

    /// List an artist's top-100 tracks
    Top100 {
        #[command(flatten)]
        artist: ArtistArgs,
        #[command(flatten)]
        paging: PageArgs,
    },

    /// Search artists by name
    Search {
        /// Name to search for
        name: String,
        #[command(flatten)]
        paging: PageArgs,
    },

    /// Resolve an artist name or string id to the numeric artist id
    Resolve(ArtistArgs),
}

pub async fn execute_command(
    command: Commands,
    client: &XiamiClient,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Collection { ids } => {
            log::info!("Fetching {} collection(s)", ids.len());
            let collections =
                try_join_all(ids.iter().map(|id| client.get_collection(*id))).await?;
            for collection in &collections {
                print_json(collection)?;
            }
        }
        Commands::Artist(args) => {
            print_json(&client.get_artist_profile(&args.locator()?).await?)?;
        }
        Commands::Albums { artist, paging } => {
            let locator = artist.locator()?;
            if paging.all {
                let albums = collect(client.artist_albums(locator), paging.limit).await?;
                print_json(&albums)?;
            } else {
                print_json(&client.get_artist_albums(&locator, paging.page).await?)?;
            }
        }
        Commands::Top100 { artist, paging } => {
            let locator = artist.locator()?;
            if paging.all {
                let tracks = collect(client.artist_top100(locator), paging.limit).await?;
                print_json(&tracks)?;
            } else {
                print_json(&client.get_artist_top100(&locator, paging.page).await?)?;
            }
        }
        Commands::Search { name, paging } => {
            if paging.all {
                let hits = collect(client.artist_search(&name), paging.limit).await?;
                print_json(&hits)?;
            } else {
                print_json(&client.search_artists(&name, paging.page).await?)?;
            }
        }
        Commands::Resolve(args) => {
            print_json(&client.resolve_artist(&args.locator()?).await?)?;
        }
    }
    Ok(())
}

async fn collect<T>(
    mut iterator: impl AsyncPaginatedIterator<T>,
    limit: usize,
) -> xiami_crawler::Result<Vec<T>> {
    if limit == 0 {
        iterator.collect_all().await
    } else {
        iterator.take(limit).await
    }
}
