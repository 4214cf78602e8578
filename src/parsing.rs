//! HTML parsing utilities for xiami pages.
//!
//! This module contains all the extraction logic that turns xiami web pages
//! into typed records. Every function here is a pure function of the parsed
//! document: a missing element or a pattern mismatch is reported as
//! [`XiamiError::Parse`], while an empty or out-of-range listing is `Ok(None)`.

use crate::pagination;
use crate::resolve::DirectLookup;
use crate::text::normalize;
use crate::{
    Album, ArtistAlbumsPage, ArtistId, ArtistProfile, ArtistRef, ArtistSearchHit,
    ArtistSearchPage, ArtistTop100Page, Collection, CollectionAuthor, CollectionTrack, Result,
    TopTrack, XiamiError,
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Parser struct containing parsing methods for xiami HTML pages.
///
/// Stateless; one instance can be shared by any number of concurrent
/// operations.
#[derive(Debug, Clone, Default)]
pub struct XiamiParser;

impl XiamiParser {
    /// Create a new parser instance.
    pub fn new() -> Self {
        Self
    }

    // === COLLECTIONS ===

    /// Parse a featured collection page (`/collect/{id}`).
    pub fn parse_collection(&self, document: &Html) -> Result<Collection> {
        let root = document.root_element();

        let title = own_text(required(root, "h2", "collection title")?);

        let author_link = required(root, "h4 > a", "collection author")?;
        let author = CollectionAuthor {
            id: parse_number(attribute(author_link, "name_card")?, "author id")?,
            name: text_of(author_link),
        };

        let introduction = optional(root, ".info_intro_full")?
            .map(|block| normalize(&block.inner_html()))
            .unwrap_or_default();

        // The QR code caption carries the canonical id, which may differ from
        // the id the page was requested with.
        let id = parse_number(
            &text_of(required(root, "#qrcode > span", "collection id")?),
            "collection id",
        )?;

        let row_selector = selector(".quote_song_list > ul > li")?;
        let mut tracks = Vec::new();
        for (index, row) in root.select(&row_selector).enumerate() {
            let track = self.parse_collection_track(row).map_err(|e| {
                XiamiError::Parse(format!("Collection {id}, track #{}: {e}", index + 1))
            })?;
            tracks.push(track);
        }

        log::debug!("Parsed collection {id} with {} tracks", tracks.len());

        Ok(Collection {
            id,
            title,
            author,
            introduction,
            tracks,
        })
    }

    /// Parse a single track row of a collection.
    fn parse_collection_track(&self, row: ElementRef<'_>) -> Result<CollectionTrack> {
        let checkbox = required(row, r#"input[type="checkbox"]"#, "track checkbox")?;
        let id = parse_number(attribute(checkbox, "value")?, "track id")?;
        let can_play = checkbox.value().attr("checked").is_some();

        let title = if can_play {
            // Playable tracks carry the title in the "add to playlist" tooltip
            let tooltip = attribute(required(row, ".song_toclt", "playlist button")?, "title")?;
            capture(r"^添加(.*)到歌单$", tooltip.trim(), "playlist tooltip")?
        } else {
            let name = own_text(required(row, ".song_name", "track name")?);
            capture(r"^(.*)\s--\s*;*$", &name, "track name text")?
        };

        let mut artists = Vec::new();
        let link_selector = selector(".song_name > a")?;
        for link in row.select(&link_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let id = if href.contains("/search/find") {
                None
            } else if href.contains("/artist/") {
                Some(trailing_segment(href, "artist link")?.to_string())
            } else {
                continue;
            };
            artists.push(ArtistRef {
                name: text_of(link),
                id,
            });
        }

        let introduction = optional(row, r#"[id^="des_"]"#)?
            .map(|block| normalize(&block.inner_html()))
            .filter(|text| !text.is_empty());

        Ok(CollectionTrack {
            id,
            title: title.trim().to_string(),
            artists,
            introduction,
            can_play,
        })
    }

    // === ARTISTS ===

    /// Parse an artist profile page (`/artist/profile-{id}`).
    ///
    /// `id` is attached to the record as given; the page itself does not repeat it.
    pub fn parse_artist_profile(&self, document: &Html, id: ArtistId) -> Result<ArtistProfile> {
        let root = document.root_element();
        let heading = required(root, "#title h1", "artist name")?;

        let name = own_text(heading);
        let aliases = match optional(heading, "span")? {
            Some(span) => split_aliases(&text_of(span)),
            None => Vec::new(),
        };
        let introduction = optional(root, ".profile")?
            .map(|block| normalize(&block.inner_html()))
            .unwrap_or_default();

        Ok(ArtistProfile {
            id,
            name,
            aliases,
            introduction,
        })
    }

    /// Parse an artist's album listing (`/artist/album-{id}?page={n}`).
    pub fn parse_artist_albums(
        &self,
        document: &Html,
        page: u32,
        page_size: u32,
    ) -> Result<Option<ArtistAlbumsPage>> {
        let root = document.root_element();
        let caption = text_of(required(root, ".counts", "album count")?);
        let total = first_number(&caption, "album count")?;

        let Some(info) = pagination::paginate(total, page, page_size) else {
            return Ok(None);
        };

        let row_selector = selector(".albumThread_list > ul > li")?;
        let mut albums = Vec::new();
        for row in root.select(&row_selector) {
            albums.push(self.parse_album_row(row)?);
        }

        log::debug!("Parsed {} albums on page {page}/{}", albums.len(), info.last_page);
        Ok(Some(info.with_data(albums)))
    }

    fn parse_album_row(&self, row: ElementRef<'_>) -> Result<Album> {
        let container = required(row, ".album_item100_thread", "album container")?;
        let id = parse_number(
            &capture(r"(\d+)$", attribute(container, "id")?, "album container id")?,
            "album id",
        )?;

        let name_block = required(row, "p.name", "album name")?;
        let title = attribute(required(name_block, "a", "album link")?, "title")?
            .trim()
            .to_string();
        // Whatever text remains beside the title link is the optional "(subtitle)"
        let subtitle = pattern(r"\((.*)\)")?
            .captures(&own_text(name_block))
            .map(|caps| caps[1].trim().to_string());

        let cover_url = attribute(required(row, ".cover img", "album cover")?, "src")?.to_string();

        Ok(Album {
            id,
            title,
            subtitle,
            cover_url,
        })
    }

    /// Parse an artist's top-100 track listing (`/artist/top-{id}?page={n}`).
    pub fn parse_artist_top100(
        &self,
        document: &Html,
        page: u32,
        page_size: u32,
    ) -> Result<Option<ArtistTop100Page>> {
        let root = document.root_element();
        let caption = text_of(required(root, ".all_page > span", "track count")?);
        let count = capture(r"(\d+)\s*首歌", &caption.replace(',', ""), "track count")?;
        let total = parse_count(&count, "track count")?;

        let Some(info) = pagination::paginate(total, page, page_size) else {
            return Ok(None);
        };

        let row_selector = selector("table.track_list tr")?;
        let checkbox_selector = selector(r#"input[type="checkbox"]"#)?;
        let mut tracks = Vec::new();
        for row in root.select(&row_selector) {
            // Header and spacer rows have no checkbox
            let Some(checkbox) = row.select(&checkbox_selector).next() else {
                continue;
            };
            let id = parse_number(attribute(checkbox, "value")?, "track id")?;
            let link = required(row, ".song_name > a", "track link")?;
            let title = attribute(link, "title")?.trim().to_string();
            tracks.push(TopTrack { id, title });
        }

        log::debug!("Parsed {} top tracks on page {page}/{}", tracks.len(), info.last_page);
        Ok(Some(info.with_data(tracks)))
    }

    /// Parse an artist search results page (`/search/artist/page/{n}?key=...`).
    pub fn parse_artist_search(
        &self,
        document: &Html,
        page: u32,
        page_size: u32,
    ) -> Result<Option<ArtistSearchPage>> {
        let root = document.root_element();
        let badge = text_of(required(root, ".seek_counts", "result count")?);
        let total = first_number(&badge, "result count")?;

        let Some(info) = pagination::paginate(total, page, page_size) else {
            return Ok(None);
        };

        let hits = self.parse_search_rows(root)?;
        log::debug!("Parsed {} search hits on page {page}/{}", hits.len(), info.last_page);
        Ok(Some(info.with_data(hits)))
    }

    fn parse_search_rows(&self, root: ElementRef<'_>) -> Result<Vec<ArtistSearchHit>> {
        let row_selector = selector(".artistBlock_list > ul > li")?;
        let mut hits = Vec::new();

        for row in root.select(&row_selector) {
            let link = required(row, r#".name > a[href*="/artist/"]"#, "artist link")?;
            let id = trailing_segment(attribute(link, "href")?, "artist link")?.to_string();
            let name = attribute(link, "title")?.trim().to_string();

            let aliases = match optional(row, ".name span")? {
                Some(span) => pattern(r"^\((.*)\)$")?
                    .captures(&text_of(span))
                    .map(|caps| split_aliases(&caps[1]))
                    .unwrap_or_default(),
                None => Vec::new(),
            };

            let photo = attribute(required(row, ".image img", "artist photo")?, "src")?;

            hits.push(ArtistSearchHit {
                id,
                name,
                aliases,
                photo_url: strip_image_decoration(photo)?,
            });
        }

        Ok(hits)
    }

    // === IDENTIFIER RESOLUTION ===

    /// Interpret the `Location` of the name lookup endpoint's redirect.
    pub fn parse_direct_lookup_location(&self, location: &str) -> Result<DirectLookup> {
        let path = url_path(location);

        if let Some(caps) = pattern(r"^/artist/(\d+)/?$")?.captures(path) {
            return Ok(DirectLookup::Found(parse_number(&caps[1], "artist id")?));
        }
        if path.starts_with("/search") {
            return Ok(DirectLookup::NotFoundDirect);
        }

        Err(XiamiError::Parse(format!(
            "Unexpected artist lookup redirect to '{location}'"
        )))
    }

    /// Extract the canonical numeric artist id from a "similar artists" page.
    ///
    /// The first action link on that page always references the artist the
    /// page belongs to.
    pub fn parse_similar_artists_id(&self, document: &Html) -> Result<u64> {
        let link = required(document.root_element(), ".acts a[href]", "artist action link")?;
        let id = capture(r"(\d+)\D*$", attribute(link, "href")?, "artist action link")?;
        parse_number(&id, "artist id")
    }
}

// === SHARED PARSING UTILITIES ===

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| XiamiError::Parse(format!("Invalid selector '{css}': {e}")))
}

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| XiamiError::Parse(format!("Invalid pattern '{re}': {e}")))
}

/// First descendant of `scope` matching `css`, or a parse error naming `what`.
fn required<'a>(scope: ElementRef<'a>, css: &str, what: &str) -> Result<ElementRef<'a>> {
    optional(scope, css)?.ok_or_else(|| XiamiError::Parse(format!("Missing {what} ({css})")))
}

fn optional<'a>(scope: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(scope.select(&selector(css)?).next())
}

fn attribute<'a>(element: ElementRef<'a>, name: &str) -> Result<&'a str> {
    element.value().attr(name).ok_or_else(|| {
        XiamiError::Parse(format!(
            "Missing attribute '{name}' on <{}>",
            element.value().name()
        ))
    })
}

/// All text below `element`, trimmed.
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// The element's own text with every child element removed, trimmed.
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// First capture group of `re` in `text`.
fn capture(re: &str, text: &str, what: &str) -> Result<String> {
    pattern(re)?
        .captures(text)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| XiamiError::Parse(format!("Unexpected {what}: '{text}'")))
}

fn parse_number(text: &str, what: &str) -> Result<u64> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| XiamiError::Parse(format!("Invalid {what}: '{text}'")))
}

fn parse_count(text: &str, what: &str) -> Result<u32> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| XiamiError::Parse(format!("Invalid {what}: '{text}'")))
}

/// First integer in a caption like "共 1,234 张专辑"; thousands separators are ignored.
fn first_number(text: &str, what: &str) -> Result<u32> {
    let cleaned = text.replace(',', "");
    parse_count(&capture(r"(\d+)", &cleaned, what)?, what)
}

/// Path of an absolute or site-relative URL, without query or fragment.
fn url_path(url: &str) -> &str {
    let without_scheme = match url.find("://") {
        Some(pos) => {
            let rest = &url[pos + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("/")
        }
        None => url,
    };
    without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme)
}

/// Last non-empty path segment of a link, e.g. the id in `/artist/bTkdWb1c`.
fn trailing_segment<'a>(href: &'a str, what: &str) -> Result<&'a str> {
    url_path(href)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| XiamiError::Parse(format!("No id in {what} '{href}'")))
}

/// Split a " / "-separated alias list; an empty list yields no aliases.
fn split_aliases(text: &str) -> Vec<String> {
    text.split(" / ")
        .map(str::trim)
        .filter(|alias| !alias.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop image-processing suffixes (`@…`) and size markers (`_1.jpg`) from a photo URL.
fn strip_image_decoration(url: &str) -> Result<String> {
    let base = url.split('@').next().unwrap_or(url);
    Ok(pattern(r"_\d+(\.[A-Za-z]+)$")?.replace(base, "$1").into_owned())
}
