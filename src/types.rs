//! Data types for xiami catalog records and client configuration.
//!
//! This module contains the records produced by the page extractors, the
//! pagination envelope shared by every listing, the tagged unions used to
//! address artists, and the client configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

// ================================================================================================
// COLLECTIONS
// ================================================================================================

/// A featured collection (a curated, user-authored playlist).
///
/// The `id` is the canonical collection id printed under the page's QR code,
/// which is not necessarily the id that was used to request the page.
///
/// # Examples
///
/// ```rust
/// use xiami_crawler::{Collection, CollectionAuthor};
///
/// let collection = Collection {
///     id: 42,
///     title: "Late Night Jazz".to_string(),
///     author: CollectionAuthor { id: 7, name: "curator".to_string() },
///     introduction: "Quiet records for quiet hours.".to_string(),
///     tracks: Vec::new(),
/// };
///
/// assert_eq!(format!("{collection}"), "Late Night Jazz (by curator)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Canonical collection id, read from the page rather than the request
    pub id: u64,
    /// Collection title with any heading decoration removed
    pub title: String,
    /// The user who curated the collection
    pub author: CollectionAuthor,
    /// Normalized plain-text introduction
    pub introduction: String,
    /// Tracks in page order
    pub tracks: Vec<CollectionTrack>,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (by {})", self.title, self.author.name)
    }
}

/// The author block of a collection page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionAuthor {
    /// Numeric user id, taken from the author link's `name_card` attribute
    pub id: u64,
    /// Display name
    pub name: String,
}

/// A track as listed inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionTrack {
    /// Numeric track id
    pub id: u64,
    /// Track title
    pub title: String,
    /// Credited artists in page order
    pub artists: Vec<ArtistRef>,
    /// The curator's note for this track, if one was written
    pub introduction: Option<String>,
    /// Whether the track is playable on the site
    pub can_play: bool,
}

/// A reference to an artist from a track listing.
///
/// Some credits link to a site-wide search instead of an artist page. Those
/// carry the displayed name only and `id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Displayed artist name
    pub name: String,
    /// Trailing id segment of the artist link, absent for search links
    pub id: Option<String>,
}

// ================================================================================================
// ARTISTS
// ================================================================================================

/// How a caller addresses an artist.
///
/// xiami knows artists under three schemes. Profile and listing pages are only
/// addressable by the canonical numeric id, so the other two forms go through
/// the resolution chain first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtistLocator {
    /// Canonical numeric id
    Id(u64),
    /// Alternate opaque string id (as found in some artist links)
    StringId(String),
    /// Free-text artist name
    Name(String),
}

impl fmt::Display for ArtistLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtistLocator::Id(id) => write!(f, "#{id}"),
            ArtistLocator::StringId(id) => write!(f, "{id}"),
            ArtistLocator::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

/// The id attached to an [`ArtistProfile`], in the form it was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtistId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtistId::Numeric(id) => write!(f, "{id}"),
            ArtistId::Text(id) => write!(f, "{id}"),
        }
    }
}

/// An artist's profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    /// The id the profile was requested with
    pub id: ArtistId,
    /// Primary artist name
    pub name: String,
    /// Alternative names; empty when the page lists none
    pub aliases: Vec<String>,
    /// Normalized plain-text biography
    pub introduction: String,
}

impl fmt::Display for ArtistProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.aliases.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.aliases.join(" / "))
        }
    }
}

// ================================================================================================
// LISTINGS
// ================================================================================================

/// Pagination envelope shared by every listing operation.
///
/// An envelope is only ever produced for a page that exists: listings with no
/// results, and pages past `last_page`, are reported as `None` by the
/// operations instead of an empty `Page`.
///
/// # Examples
///
/// ```rust
/// use xiami_crawler::{Page, TopTrack};
///
/// let page = Page {
///     total: 45,
///     last_page: 3,
///     page: 1,
///     data: vec![TopTrack { id: 1769, title: "晴天".to_string() }],
/// };
///
/// assert!(page.has_next_page());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub total: u32,
    /// Last valid page number (1-indexed)
    pub last_page: u32,
    /// This page's number (1-indexed)
    pub page: u32,
    /// Items on this page, in page order
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Whether a following page exists.
    pub fn has_next_page(&self) -> bool {
        self.page < self.last_page
    }
}

/// An album row on an artist's album listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Album {
    /// Numeric album id
    pub id: u64,
    /// Album title
    pub title: String,
    /// Parenthesized qualifier next to the title (e.g. "Live").
    ///
    /// `None` when there are no parentheses; `Some("")` for empty ones.
    pub subtitle: Option<String>,
    /// Cover image URL
    pub cover_url: String,
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subtitle {
            Some(subtitle) => write!(f, "{} ({subtitle})", self.title),
            None => write!(f, "{}", self.title),
        }
    }
}

/// A row on an artist's top-100 track listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopTrack {
    pub id: u64,
    pub title: String,
}

/// A row on the artist search results page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistSearchHit {
    /// Trailing path segment of the profile link (numeric or string id)
    pub id: String,
    /// Display name, taken from the link's `title` attribute
    pub name: String,
    /// Alternative names listed next to the display name
    pub aliases: Vec<String>,
    /// Photo URL with image-size decoration removed
    pub photo_url: String,
}

impl fmt::Display for ArtistSearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}

pub type ArtistAlbumsPage = Page<Album>;
pub type ArtistTop100Page = Page<TopTrack>;
pub type ArtistSearchPage = Page<ArtistSearchHit>;

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// Default xiami base URL
pub const DEFAULT_BASE_URL: &str = "http://www.xiami.com";

/// Number of items xiami renders per page for each listing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizes {
    /// Rows per artist search results page
    pub artist_search: u32,
    /// Rows per artist album listing page
    pub artist_albums: u32,
    /// Rows per artist top-100 listing page
    pub artist_top100: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            artist_search: 30,
            artist_albums: 12,
            artist_top100: 20,
        }
    }
}

/// Configuration for [`XiamiClient`](crate::XiamiClient).
///
/// # Examples
///
/// ```rust
/// use xiami_crawler::{ClientConfig, PageSizes};
///
/// let config = ClientConfig::new()
///     .with_base_url("http://localhost:8080")
///     .with_page_sizes(PageSizes { artist_search: 10, ..PageSizes::default() });
///
/// assert_eq!(config.base_url, "http://localhost:8080");
/// assert_eq!(config.page_sizes.artist_albums, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and host every endpoint is joined onto, without trailing slash
    pub base_url: String,
    /// Page sizes handed to the pagination engine
    pub page_sizes: PageSizes,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_sizes: PageSizes::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at a different host (mirror, local fixture server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set custom page sizes
    pub fn with_page_sizes(mut self, page_sizes: PageSizes) -> Self {
        self.page_sizes = page_sizes;
        self
    }
}

// ================================================================================================
// ENDPOINTS
// ================================================================================================

impl ClientConfig {
    /// Featured collection page
    pub fn collection_url(&self, id: u64) -> String {
        format!("{}/collect/{id}", self.base_url)
    }

    /// Artist profile page; only addressable by numeric id
    pub fn artist_profile_url(&self, id: u64) -> String {
        format!("{}/artist/profile-{id}", self.base_url)
    }

    /// One page of an artist's album listing
    pub fn artist_albums_url(&self, id: u64, page: u32) -> String {
        format!("{}/artist/album-{id}?page={page}", self.base_url)
    }

    /// One page of an artist's top-100 tracks
    pub fn artist_top100_url(&self, id: u64, page: u32) -> String {
        format!("{}/artist/top-{id}?page={page}", self.base_url)
    }

    /// One page of artist search results
    pub fn artist_search_url(&self, name: &str, page: u32) -> String {
        format!(
            "{}/search/artist/page/{page}?key={}",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    /// Name lookup endpoint, which answers only with a redirect
    pub fn artist_lookup_url(&self, name: &str) -> String {
        format!(
            "{}/search/find?artist={}",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    /// "Similar artists" page, addressable by string id
    pub fn similar_artists_url(&self, string_id: &str) -> String {
        format!(
            "{}/artist/similar-{}",
            self.base_url,
            urlencoding::encode(string_id)
        )
    }
}
