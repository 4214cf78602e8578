use http_client::Request;

/// Common Chrome user agent string for all requests
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Catalog pages are requested in Simplified Chinese
const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7";

/// Add common browser headers to a request
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept-Language", ACCEPT_LANGUAGE);
    let _ = request.insert_header("DNT", "1");
    let _ = request.insert_header("Connection", "keep-alive");
}

/// Add headers for page GET requests
pub fn add_get_headers(request: &mut Request, referer_url: Option<&str>) {
    add_common_headers(request);
    let _ = request.insert_header(
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    );
    let _ = request.insert_header("Upgrade-Insecure-Requests", "1");

    if let Some(referer) = referer_url {
        let _ = request.insert_header("Referer", referer);
    }
}
