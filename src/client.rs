//! The [`XiamiClient`] facade: one async operation per catalog page type.

use crate::fetch::{fetch_body, HttpPageFetcher, PageFetcher};
use crate::iterator::{ArtistAlbumsIterator, ArtistSearchIterator, ArtistTop100Iterator};
use crate::pagination::ensure_valid_page;
use crate::parsing::XiamiParser;
use crate::resolve::ArtistResolver;
use crate::{
    ArtistAlbumsPage, ArtistId, ArtistLocator, ArtistProfile, ArtistSearchPage, ArtistTop100Page,
    ClientConfig, Collection, Result,
};
use http_client::HttpClient;
use scraper::Html;

/// Main client for reading the xiami catalog.
///
/// Every operation is one independent unit of work: it fetches the page (or
/// the short chain of pages) it needs, extracts a typed record and returns it.
/// The client holds no mutable state, so operations may run concurrently
/// against a shared `&XiamiClient`.
///
/// # Examples
///
/// ```rust,no_run
/// use xiami_crawler::{ArtistLocator, Result, XiamiClient};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let client = XiamiClient::new(Box::new(http_client));
///
///     let collection = client.get_collection(32731658).await?;
///     println!("{collection}: {} tracks", collection.tracks.len());
///
///     let artist = ArtistLocator::Name("周杰伦".to_string());
///     if let Some(page) = client.get_artist_top100(&artist, 1).await? {
///         for track in page.data {
///             println!("{}", track.title);
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct XiamiClient {
    fetcher: Box<dyn PageFetcher>,
    config: ClientConfig,
    parser: XiamiParser,
}

impl XiamiClient {
    /// Create a new [`XiamiClient`] against the public site.
    ///
    /// # Arguments
    ///
    /// * `client` - Any HTTP client implementation that implements [`HttpClient`]
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self::with_config(client, ClientConfig::default())
    }

    /// Create a new [`XiamiClient`] with custom configuration.
    pub fn with_config(client: Box<dyn HttpClient>, config: ClientConfig) -> Self {
        Self::with_fetcher(Box::new(HttpPageFetcher::new(client)), config)
    }

    /// Create a client over any [`PageFetcher`], e.g. a mock or a fixture replayer.
    pub fn with_fetcher(fetcher: Box<dyn PageFetcher>, config: ClientConfig) -> Self {
        Self {
            fetcher,
            config,
            parser: XiamiParser::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The identifier resolution chain, bound to this client's fetcher.
    pub fn resolver(&self) -> ArtistResolver<'_> {
        ArtistResolver::new(self.fetcher.as_ref(), &self.config, &self.parser)
    }

    /// Resolve an artist locator to the canonical numeric id.
    ///
    /// Returns `Ok(None)` when a name matches no artist.
    pub async fn resolve_artist(&self, artist: &ArtistLocator) -> Result<Option<u64>> {
        self.resolver().resolve(artist).await
    }

    /// Fetch a featured collection.
    ///
    /// The returned [`Collection::id`] is the canonical id printed on the page,
    /// which may differ from `id`.
    pub async fn get_collection(&self, id: u64) -> Result<Collection> {
        let body = self.fetch(&self.config.collection_url(id)).await?;
        let collection = self.parser.parse_collection(&Html::parse_document(&body))?;
        log::debug!(
            "Collection {id} parsed as {} with {} tracks",
            collection.id,
            collection.tracks.len()
        );
        Ok(collection)
    }

    /// Fetch an artist's profile.
    ///
    /// The profile's `id` is the one supplied: a string id stays a string id
    /// even though the page itself was fetched by the numeric id. Returns
    /// `Ok(None)` only for a name that matches no artist.
    pub async fn get_artist_profile(&self, artist: &ArtistLocator) -> Result<Option<ArtistProfile>> {
        let Some(numeric_id) = self.resolve_artist(artist).await? else {
            return Ok(None);
        };
        let supplied_id = match artist {
            ArtistLocator::StringId(string_id) => ArtistId::Text(string_id.clone()),
            _ => ArtistId::Numeric(numeric_id),
        };

        let body = self.fetch(&self.config.artist_profile_url(numeric_id)).await?;
        let profile = self
            .parser
            .parse_artist_profile(&Html::parse_document(&body), supplied_id)?;
        Ok(Some(profile))
    }

    /// Fetch one page of an artist's album listing.
    ///
    /// `page` is 1-based; `0` fails before any request is made. Pages past the
    /// end, and artists with no albums, yield `Ok(None)`.
    pub async fn get_artist_albums(
        &self,
        artist: &ArtistLocator,
        page: u32,
    ) -> Result<Option<ArtistAlbumsPage>> {
        ensure_valid_page(page)?;
        let Some(id) = self.resolve_artist(artist).await? else {
            return Ok(None);
        };

        let body = self.fetch(&self.config.artist_albums_url(id, page)).await?;
        self.parser.parse_artist_albums(
            &Html::parse_document(&body),
            page,
            self.config.page_sizes.artist_albums,
        )
    }

    /// Fetch one page of an artist's top-100 tracks.
    ///
    /// Same paging contract as [`get_artist_albums`](Self::get_artist_albums).
    pub async fn get_artist_top100(
        &self,
        artist: &ArtistLocator,
        page: u32,
    ) -> Result<Option<ArtistTop100Page>> {
        ensure_valid_page(page)?;
        let Some(id) = self.resolve_artist(artist).await? else {
            return Ok(None);
        };

        let body = self.fetch(&self.config.artist_top100_url(id, page)).await?;
        self.parser.parse_artist_top100(
            &Html::parse_document(&body),
            page,
            self.config.page_sizes.artist_top100,
        )
    }

    /// Fetch one page of artist search results for `name`.
    pub async fn search_artists(&self, name: &str, page: u32) -> Result<Option<ArtistSearchPage>> {
        ensure_valid_page(page)?;
        let body = self.fetch(&self.config.artist_search_url(name, page)).await?;
        self.parser.parse_artist_search(
            &Html::parse_document(&body),
            page,
            self.config.page_sizes.artist_search,
        )
    }

    /// Walk every album of an artist, page by page.
    pub fn artist_albums(&self, artist: ArtistLocator) -> ArtistAlbumsIterator<'_> {
        ArtistAlbumsIterator::new(self, artist)
    }

    /// Walk an artist's top-100 tracks, page by page.
    pub fn artist_top100(&self, artist: ArtistLocator) -> ArtistTop100Iterator<'_> {
        ArtistTop100Iterator::new(self, artist)
    }

    /// Walk every artist search hit for `name`, page by page.
    pub fn artist_search(&self, name: &str) -> ArtistSearchIterator<'_> {
        ArtistSearchIterator::new(self, name.to_string())
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        fetch_body(self.fetcher.as_ref(), url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchedPage, MockPageFetcher};
    use crate::XiamiError;

    fn client_with(fetcher: MockPageFetcher) -> XiamiClient {
        XiamiClient::with_fetcher(Box::new(fetcher), ClientConfig::default())
    }

    const PROFILE: &str = r#"<html><body>
        <div id="title"><h1>周杰伦<span>Jay Chou / 周董</span></h1></div>
        <div class="profile">台湾歌手<br>创作人</div>
        </body></html>"#;

    #[tokio::test]
    async fn page_zero_is_rejected_before_any_request() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().never();
        let client = client_with(fetcher);

        let artist = ArtistLocator::Name("周杰伦".to_string());
        assert!(matches!(
            client.get_artist_albums(&artist, 0).await,
            Err(XiamiError::InvalidPage(0))
        ));
        assert!(matches!(
            client.get_artist_top100(&artist, 0).await,
            Err(XiamiError::InvalidPage(0))
        ));
        assert!(matches!(
            client.search_artists("周杰伦", 0).await,
            Err(XiamiError::InvalidPage(0))
        ));
    }

    #[tokio::test]
    async fn profile_by_numeric_id_keeps_numeric_id() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "http://www.xiami.com/artist/profile-1260")
            .times(1)
            .returning(|_| Ok(FetchedPage::ok(PROFILE)));
        let client = client_with(fetcher);

        let profile = client
            .get_artist_profile(&ArtistLocator::Id(1260))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.id, ArtistId::Numeric(1260));
        assert_eq!(profile.name, "周杰伦");
        assert_eq!(profile.aliases, vec!["Jay Chou", "周董"]);
        assert_eq!(profile.introduction, "台湾歌手\n创作人");
    }

    #[tokio::test]
    async fn profile_by_string_id_converts_then_keeps_string_id() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/artist/similar-bTkdWb1c"))
            .times(1)
            .returning(|_| {
                Ok(FetchedPage::ok(
                    r#"<div class="acts"><a href="/artist/radio?id=1260">radio</a></div>"#,
                ))
            });
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/artist/profile-1260"))
            .times(1)
            .returning(|_| Ok(FetchedPage::ok(PROFILE)));
        let client = client_with(fetcher);

        let profile = client
            .get_artist_profile(&ArtistLocator::StringId("bTkdWb1c".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.id, ArtistId::Text("bTkdWb1c".to_string()));
    }

    #[tokio::test]
    async fn unknown_name_yields_none_without_listing_request() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("/search/find?artist="))
            .times(1)
            .returning(|_| Ok(FetchedPage::redirect("/search?key=nobody")));
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("/search/artist/page/1"))
            .times(1)
            .returning(|_| {
                Ok(FetchedPage::ok(
                    r#"<div class="seek_counts">0</div><div class="artistBlock_list"><ul></ul></div>"#,
                ))
            });
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("/artist/album-"))
            .never();
        let client = client_with(fetcher);

        let page = client
            .get_artist_albums(&ArtistLocator::Name("nobody".to_string()), 1)
            .await
            .unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn non_200_listing_is_unexpected_status() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            Ok(FetchedPage {
                status: 503,
                location: None,
                body: String::new(),
            })
        });
        let client = client_with(fetcher);

        let result = client.get_artist_top100(&ArtistLocator::Id(1260), 1).await;
        assert!(matches!(
            result,
            Err(XiamiError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn collection_is_requested_by_locator_id() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "http://www.xiami.com/collect/9")
            .times(1)
            .returning(|_| Err(XiamiError::Http("timed out".to_string())));
        let client = client_with(fetcher);

        assert!(matches!(
            client.get_collection(9).await,
            Err(XiamiError::Http(_))
        ));
    }
}
