//! Typed records extracted from the xiami.com music catalog.
//!
//! [`XiamiClient`] fetches collection, artist and listing pages, turns them into
//! the records in [`types`], and resolves artist names and string ids to the
//! canonical numeric artist id.

pub mod client;
pub mod error;
pub mod fetch;
pub mod headers;
pub mod iterator;
pub mod pagination;
pub mod parsing;
pub mod resolve;
pub mod text;
pub mod types;

pub use client::XiamiClient;
pub use error::XiamiError;
pub use fetch::{FetchedPage, HttpPageFetcher, PageFetcher};
pub use iterator::{
    ArtistAlbumsIterator, ArtistSearchIterator, ArtistTop100Iterator, AsyncPaginatedIterator,
};
pub use parsing::XiamiParser;
pub use resolve::{ArtistResolver, DirectLookup};
pub use types::{
    Album, ArtistAlbumsPage, ArtistId, ArtistLocator, ArtistProfile, ArtistRef, ArtistSearchHit,
    ArtistSearchPage, ArtistTop100Page, ClientConfig, Collection, CollectionAuthor,
    CollectionTrack, Page, PageSizes, TopTrack, DEFAULT_BASE_URL,
};

#[cfg(feature = "mock")]
pub use fetch::MockPageFetcher;

// Re-export scraper types for testing
pub use scraper::Html;

pub type Result<T> = std::result::Result<T, XiamiError>;
