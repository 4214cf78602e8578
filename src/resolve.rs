//! Artist identifier resolution.
//!
//! Profile and listing pages are only addressable by the canonical numeric
//! artist id. This module turns the other two ways of naming an artist into
//! that id:
//!
//! - a **name** goes through the direct lookup endpoint, which redirects either
//!   to the artist's page ([`DirectLookup::Found`]) or to a "no result" page
//!   ([`DirectLookup::NotFoundDirect`]). In the latter case the first hit of an
//!   artist search is taken instead.
//! - a **string id** is converted through the artist's "similar artists" page,
//!   whose first action link carries the numeric id.
//!
//! Each step is a single request. A failing step aborts the whole resolution.

use crate::fetch::{fetch_body, fetch_redirect, PageFetcher};
use crate::parsing::XiamiParser;
use crate::{ArtistLocator, ArtistSearchHit, ClientConfig, Result, XiamiError};
use scraper::Html;

/// Outcome of the direct name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectLookup {
    /// The lookup redirected to the profile of this artist
    Found(u64),
    /// The lookup redirected to the "no result" page
    NotFoundDirect,
}

/// Runs the resolution chain against a [`PageFetcher`].
///
/// Borrowed from [`XiamiClient::resolver`](crate::XiamiClient::resolver); holds
/// no state of its own, so any number of resolutions may run concurrently.
pub struct ArtistResolver<'a> {
    fetcher: &'a dyn PageFetcher,
    config: &'a ClientConfig,
    parser: &'a XiamiParser,
}

impl<'a> ArtistResolver<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        config: &'a ClientConfig,
        parser: &'a XiamiParser,
    ) -> Self {
        Self {
            fetcher,
            config,
            parser,
        }
    }

    /// Resolve any artist locator to the canonical numeric id.
    ///
    /// Numeric ids are returned as-is without a request. Returns `Ok(None)`
    /// only for names that match no artist at all.
    pub async fn resolve(&self, locator: &ArtistLocator) -> Result<Option<u64>> {
        match locator {
            ArtistLocator::Id(id) => Ok(Some(*id)),
            ArtistLocator::StringId(string_id) => {
                self.string_id_to_numeric(string_id).await.map(Some)
            }
            ArtistLocator::Name(name) => self.resolve_name(name).await,
        }
    }

    /// Resolve a free-text artist name: direct lookup, then search fallback.
    pub async fn resolve_name(&self, name: &str) -> Result<Option<u64>> {
        match self.direct_lookup(name).await? {
            DirectLookup::Found(id) => {
                log::debug!("Artist \"{name}\" found directly as {id}");
                Ok(Some(id))
            }
            DirectLookup::NotFoundDirect => {
                log::debug!("No direct match for artist \"{name}\", falling back to search");
                self.search_fallback(name).await
            }
        }
    }

    /// Ask the name lookup endpoint where `name` lives.
    ///
    /// The endpoint only ever answers with a redirect; any other status is an
    /// [`UnexpectedStatus`](crate::XiamiError::UnexpectedStatus) failure.
    pub async fn direct_lookup(&self, name: &str) -> Result<DirectLookup> {
        let url = self.config.artist_lookup_url(name);
        let location = fetch_redirect(self.fetcher, &url).await?;
        self.parser.parse_direct_lookup_location(&location)
    }

    /// Take the first artist search hit for `name`.
    ///
    /// Hits are not ranked or confirmed beyond the site's own ordering, so an
    /// ambiguous name resolves to whichever artist xiami lists first. The
    /// first hit must link to a numeric artist id; a string id there is a
    /// [`Parse`](crate::XiamiError::Parse) failure.
    pub async fn search_fallback(&self, name: &str) -> Result<Option<u64>> {
        let url = self.config.artist_search_url(name, 1);
        let body = fetch_body(self.fetcher, &url).await?;

        let Some(hit) = self.first_search_hit(&body)? else {
            log::debug!("Artist search for \"{name}\" returned no hits");
            return Ok(None);
        };

        let id = hit.id.parse::<u64>().map_err(|_| {
            XiamiError::Parse(format!(
                "First search hit for \"{name}\" has non-numeric artist id '{}'",
                hit.id
            ))
        })?;
        log::debug!("Artist \"{name}\" resolved to first search hit {id} ({})", hit.name);
        Ok(Some(id))
    }

    fn first_search_hit(&self, body: &str) -> Result<Option<ArtistSearchHit>> {
        let document = Html::parse_document(body);
        let page = self.parser.parse_artist_search(
            &document,
            1,
            self.config.page_sizes.artist_search,
        )?;
        Ok(page.and_then(|page| page.data.into_iter().next()))
    }

    /// Convert an alternate string id to the canonical numeric id.
    pub async fn string_id_to_numeric(&self, string_id: &str) -> Result<u64> {
        let url = self.config.similar_artists_url(string_id);
        let body = fetch_body(self.fetcher, &url).await?;
        let id = self
            .parser
            .parse_similar_artists_id(&Html::parse_document(&body))?;
        log::debug!("String id {string_id} is artist {id}");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchedPage, MockPageFetcher};

    fn search_page(total: u32, ids: &[&str]) -> String {
        let rows: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<li><p class="name"><a href="/artist/{id}" title="Artist {id}">Artist {id}</a></p>
                       <a class="image"><img src="http://img.xiami.net/images/artistlogo/{id}_1.jpg"></a></li>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><div class="seek_counts">total {total}</div>
               <div class="artistBlock_list"><ul>{rows}</ul></div></body></html>"#
        )
    }

    fn is_lookup(url: &str) -> bool {
        url.contains("/search/find?artist=")
    }

    fn is_search(url: &str) -> bool {
        url.contains("/search/artist/page/1?key=")
    }

    async fn resolve_with(fetcher: &MockPageFetcher, locator: ArtistLocator) -> Result<Option<u64>> {
        let config = ClientConfig::default();
        let parser = XiamiParser::new();
        ArtistResolver::new(fetcher, &config, &parser)
            .resolve(&locator)
            .await
    }

    #[tokio::test]
    async fn direct_redirect_to_profile_skips_search() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| is_lookup(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::redirect("http://www.xiami.com/artist/1260")));

        let id = resolve_with(&fetcher, ArtistLocator::Name("周杰伦".into()))
            .await
            .unwrap();
        assert_eq!(id, Some(1260));
    }

    #[tokio::test]
    async fn first_search_hit_is_taken_without_confirmation() {
        // Known approximation: an ambiguous name resolves to the first hit
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| is_lookup(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::redirect("/search?key=jay")));
        fetcher
            .expect_fetch()
            .withf(|url| is_search(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::ok(search_page(2, &["77", "88"]))));

        let id = resolve_with(&fetcher, ArtistLocator::Name("jay".into()))
            .await
            .unwrap();
        assert_eq!(id, Some(77));
    }

    #[tokio::test]
    async fn no_search_hits_is_not_found() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| is_lookup(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::redirect("/search?key=nobody")));
        fetcher
            .expect_fetch()
            .withf(|url| is_search(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::ok(search_page(0, &[]))));

        let id = resolve_with(&fetcher, ArtistLocator::Name("nobody".into()))
            .await
            .unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn string_id_search_hit_fails_without_conversion() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| is_lookup(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::redirect("/search?key=guest")));
        fetcher
            .expect_fetch()
            .withf(|url| is_search(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::ok(search_page(1, &["bTkdWb1c"]))));
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("/artist/similar-"))
            .never();

        let result = resolve_with(&fetcher, ArtistLocator::Name("guest".into())).await;
        assert!(matches!(result, Err(XiamiError::Parse(_))));
    }

    #[tokio::test]
    async fn lookup_answering_200_is_a_failure() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| is_lookup(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::ok("<html></html>")));
        fetcher.expect_fetch().withf(|url| is_search(url)).never();

        let result = resolve_with(&fetcher, ArtistLocator::Name("x".into())).await;
        assert!(matches!(
            result,
            Err(XiamiError::UnexpectedStatus { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn search_transport_failure_aborts_resolution() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| is_lookup(url))
            .times(1)
            .returning(|_| Ok(FetchedPage::redirect("/search?key=x")));
        fetcher
            .expect_fetch()
            .withf(|url| is_search(url))
            .times(1)
            .returning(|_| Err(XiamiError::Http("connection reset".to_string())));

        let result = resolve_with(&fetcher, ArtistLocator::Name("x".into())).await;
        assert!(matches!(result, Err(XiamiError::Http(_))));
    }

    #[tokio::test]
    async fn numeric_id_needs_no_request() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().never();

        let id = resolve_with(&fetcher, ArtistLocator::Id(1260)).await.unwrap();
        assert_eq!(id, Some(1260));
    }

    #[tokio::test]
    async fn string_id_goes_through_similar_page() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "http://www.xiami.com/artist/similar-bTkdWb1c")
            .times(1)
            .returning(|_| {
                Ok(FetchedPage::ok(
                    r#"<html><body><div class="acts">
                       <a href="/radio/artist/1260">radio</a>
                       <a href="/artist/999">other</a></div></body></html>"#,
                ))
            });

        let id = resolve_with(&fetcher, ArtistLocator::StringId("bTkdWb1c".into()))
            .await
            .unwrap();
        assert_eq!(id, Some(1260));
    }
}
