use thiserror::Error;

/// Error types for xiami catalog operations.
///
/// A missing record is never an error: an empty listing, a page past the end,
/// and a name with no matching artist all come back as `Ok(None)`. The variants
/// below are reserved for genuine failures.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use xiami_crawler::{ArtistLocator, XiamiClient, XiamiError};
///
/// # tokio_test::block_on(async {
/// let client = XiamiClient::new(Box::new(http_client::native::NativeClient::new()));
///
/// match client.get_artist_albums(&ArtistLocator::Id(1260), 1).await {
///     Ok(Some(page)) => println!("{} albums on page {}", page.data.len(), page.page),
///     Ok(None) => println!("No such page"),
///     Err(XiamiError::UnexpectedStatus { status, .. }) => eprintln!("Server said {status}"),
///     Err(XiamiError::Parse(msg)) => eprintln!("Page layout changed: {msg}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # });
/// ```
#[derive(Error, Debug)]
pub enum XiamiError {
    /// A listing was requested with a page number below 1.
    ///
    /// Raised before any request is issued.
    #[error("Invalid page number {0}: pages start at 1")]
    InvalidPage(u32),

    /// HTTP/network related errors.
    ///
    /// This includes connection failures, DNS errors and body read failures
    /// reported by the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a status the endpoint is not expected to use.
    #[error("Request to {url} failed with status {status}")]
    UnexpectedStatus {
        /// The requested URL
        url: String,
        /// The observed status code
        status: u16,
    },

    /// Failed to extract a record from the page.
    ///
    /// A required element or attribute was absent, or a pattern did not match.
    /// This usually means xiami changed its HTML structure.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// File system I/O errors.
    ///
    /// This can occur when saving debug responses.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
