use crate::{Album, ArtistLocator, ArtistSearchHit, Page, Result, TopTrack, XiamiClient};

use async_trait::async_trait;

/// Async iterator trait for paginated xiami listings.
///
/// Iterators walk pages from 1 upward and stop at the first page the listing
/// reports as absent, so an empty listing yields nothing without an error.
#[async_trait(?Send)]
pub trait AsyncPaginatedIterator<T> {
    /// Fetch the next item from the iterator.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))` - Next item in the sequence
    /// - `Ok(None)` - No more items available
    /// - `Err(...)` - Network or parsing error occurred
    async fn next(&mut self) -> Result<Option<T>>;

    /// Collect all remaining items into a Vec.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Take up to n items from the iterator.
    async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for _ in 0..n {
            match self.next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Get the number of the most recently fetched page (0 before the first fetch).
    fn current_page(&self) -> u32;

    /// Get the total number of pages, if known.
    ///
    /// Not available until at least one page has been fetched.
    fn total_pages(&self) -> Option<u32> {
        None
    }
}

/// Page bookkeeping shared by the listing iterators.
struct PageCursor<T> {
    next_page: u32,
    has_more: bool,
    buffer: Vec<T>,
    total_pages: Option<u32>,
}

impl<T> PageCursor<T> {
    fn new() -> Self {
        Self {
            next_page: 1,
            has_more: true,
            buffer: Vec::new(),
            total_pages: None,
        }
    }

    fn needs_page(&self) -> bool {
        self.buffer.is_empty() && self.has_more
    }

    fn finish(&mut self) {
        self.has_more = false;
    }

    fn load(&mut self, page: Option<Page<T>>) {
        match page {
            Some(page) => {
                self.has_more = page.has_next_page();
                self.total_pages = Some(page.last_page);
                self.next_page += 1;
                self.buffer = page.data;
                self.buffer.reverse(); // Reverse so we can pop from end efficiently
            }
            None => self.has_more = false,
        }
    }

    fn pop(&mut self) -> Option<T> {
        self.buffer.pop()
    }

    fn current_page(&self) -> u32 {
        self.next_page - 1
    }
}

/// Resolve `artist` in place so later pages skip the resolution chain.
///
/// Returns `false` when the artist does not exist.
async fn resolve_once(client: &XiamiClient, artist: &mut ArtistLocator) -> Result<bool> {
    if matches!(artist, ArtistLocator::Id(_)) {
        return Ok(true);
    }
    match client.resolve_artist(artist).await? {
        Some(id) => {
            *artist = ArtistLocator::Id(id);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Iterator over every album on an artist's album listing.
///
/// Created by [`XiamiClient::artist_albums`].
pub struct ArtistAlbumsIterator<'a> {
    client: &'a XiamiClient,
    artist: ArtistLocator,
    cursor: PageCursor<Album>,
}

impl<'a> ArtistAlbumsIterator<'a> {
    pub fn new(client: &'a XiamiClient, artist: ArtistLocator) -> Self {
        Self {
            client,
            artist,
            cursor: PageCursor::new(),
        }
    }
}

#[async_trait(?Send)]
impl AsyncPaginatedIterator<Album> for ArtistAlbumsIterator<'_> {
    async fn next(&mut self) -> Result<Option<Album>> {
        while self.cursor.needs_page() {
            if !resolve_once(self.client, &mut self.artist).await? {
                self.cursor.finish();
                break;
            }
            let page = self
                .client
                .get_artist_albums(&self.artist, self.cursor.next_page)
                .await?;
            self.cursor.load(page);
        }
        Ok(self.cursor.pop())
    }

    fn current_page(&self) -> u32 {
        self.cursor.current_page()
    }

    fn total_pages(&self) -> Option<u32> {
        self.cursor.total_pages
    }
}

/// Iterator over an artist's top-100 tracks.
///
/// Created by [`XiamiClient::artist_top100`].
pub struct ArtistTop100Iterator<'a> {
    client: &'a XiamiClient,
    artist: ArtistLocator,
    cursor: PageCursor<TopTrack>,
}

impl<'a> ArtistTop100Iterator<'a> {
    pub fn new(client: &'a XiamiClient, artist: ArtistLocator) -> Self {
        Self {
            client,
            artist,
            cursor: PageCursor::new(),
        }
    }
}

#[async_trait(?Send)]
impl AsyncPaginatedIterator<TopTrack> for ArtistTop100Iterator<'_> {
    async fn next(&mut self) -> Result<Option<TopTrack>> {
        while self.cursor.needs_page() {
            if !resolve_once(self.client, &mut self.artist).await? {
                self.cursor.finish();
                break;
            }
            let page = self
                .client
                .get_artist_top100(&self.artist, self.cursor.next_page)
                .await?;
            self.cursor.load(page);
        }
        Ok(self.cursor.pop())
    }

    fn current_page(&self) -> u32 {
        self.cursor.current_page()
    }

    fn total_pages(&self) -> Option<u32> {
        self.cursor.total_pages
    }
}

/// Iterator over every artist search hit for a name.
///
/// Created by [`XiamiClient::artist_search`].
pub struct ArtistSearchIterator<'a> {
    client: &'a XiamiClient,
    name: String,
    cursor: PageCursor<ArtistSearchHit>,
}

impl<'a> ArtistSearchIterator<'a> {
    pub fn new(client: &'a XiamiClient, name: String) -> Self {
        Self {
            client,
            name,
            cursor: PageCursor::new(),
        }
    }
}

#[async_trait(?Send)]
impl AsyncPaginatedIterator<ArtistSearchHit> for ArtistSearchIterator<'_> {
    async fn next(&mut self) -> Result<Option<ArtistSearchHit>> {
        while self.cursor.needs_page() {
            let page = self
                .client
                .search_artists(&self.name, self.cursor.next_page)
                .await?;
            self.cursor.load(page);
        }
        Ok(self.cursor.pop())
    }

    fn current_page(&self) -> u32 {
        self.cursor.current_page()
    }

    fn total_pages(&self) -> Option<u32> {
        self.cursor.total_pages
    }
}
