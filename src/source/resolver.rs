//! Source resolution for PDF data

use crate::error::{Error, Result};
use crate::source::DocumentCache;
use base64::Engine;
use futures_util::StreamExt;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Resolved PDF data
pub struct ResolvedPdf {
    pub data: Vec<u8>,
    pub source_name: String,
}

fn has_pdf_header(data: &[u8]) -> bool {
    data.starts_with(b"%PDF")
}

/// Resolve a file path to PDF data
pub fn resolve_path<P: AsRef<Path>>(path: P) -> Result<ResolvedPdf> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    let data = std::fs::read(path)?;

    if !has_pdf_header(&data) {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }

    Ok(ResolvedPdf {
        data,
        source_name: path.display().to_string(),
    })
}

/// Resolve base64 encoded data to PDF data
pub fn resolve_base64(base64_data: &str) -> Result<ResolvedPdf> {
    let engine = base64::engine::general_purpose::STANDARD;
    let data = engine.decode(base64_data)?;

    if !has_pdf_header(&data) {
        return Err(Error::InvalidPdf {
            reason: "Decoded data is not a valid PDF file".to_string(),
        });
    }

    Ok(ResolvedPdf {
        data,
        source_name: "<base64>".to_string(),
    })
}

/// Parse a URL, accepting only absolute URIs
pub fn parse_absolute_url(url: &str) -> Result<Url> {
    // Url::parse rejects relative references outright
    Url::parse(url.trim()).map_err(|_| Error::InvalidUri {
        url: url.to_string(),
    })
}

/// Request timeout for URL sources
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 5;

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_unspecified()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xC0) == 64)
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xFE00) == 0xFC00
        // fe80::/10 link-local
        || (first & 0xFFC0) == 0xFE80
        || ip.to_ipv4_mapped().is_some_and(is_private_v4)
}

/// Whether an address is loopback, private, link-local, or otherwise not public
fn is_private_ip(ip: &IpAddr) -> bool {
    match *ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

/// Refuse hosts that resolve to any non-public address
async fn ensure_public_host(url: &Url) -> Result<()> {
    let host = url.host_str().ok_or_else(|| Error::InvalidUri {
        url: url.to_string(),
    })?;
    let port = url.port_or_known_default().unwrap_or(443);

    let mut addrs = tokio::net::lookup_host(format!("{}:{}", host, port))
        .await
        .map_err(|e| fetch_failed(url.as_str(), format!("DNS lookup for {} failed: {}", host, e)))?;

    if addrs.any(|addr| is_private_ip(&addr.ip())) {
        return Err(Error::SsrfBlocked {
            url: url.to_string(),
        });
    }
    Ok(())
}

fn fetch_failed(url: &str, reason: impl std::fmt::Display) -> Error {
    Error::FetchFailed {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

fn too_large(size: u64, max_size: u64) -> Error {
    Error::DownloadTooLarge { size, max_size }
}

/// Read a response body, giving up as soon as it exceeds `max_bytes`
async fn read_capped_body(url: &str, response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>> {
    if let Some(declared) = response.content_length() {
        if declared > max_bytes {
            return Err(too_large(declared, max_bytes));
        }
    }

    let mut body = Vec::new();
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        body.extend_from_slice(&chunk.map_err(|e| fetch_failed(url, e))?);
        if body.len() as u64 > max_bytes {
            return Err(too_large(body.len() as u64, max_bytes));
        }
    }
    Ok(body)
}

/// Send a GET, following redirects by hand.
///
/// `admit` runs on the first URL and on every redirect target before it is
/// requested, so a public host cannot bounce the client to a private one.
async fn get_following_redirects<F, Fut>(
    client: &reqwest::Client,
    start: Url,
    url: &str,
    mut admit: F,
) -> Result<reqwest::Response>
where
    F: FnMut(Url) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut current = start;
    for _ in 0..=MAX_REDIRECTS {
        admit(current.clone()).await?;

        let response = client
            .get(current.clone())
            .send()
            .await
            .map_err(|e| fetch_failed(url, e))?;
        if !response.status().is_redirection() {
            return Ok(response);
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                fetch_failed(url, format!("server answered {} without a location", response.status()))
            })?;
        let next = current
            .join(location)
            .map_err(|e| fetch_failed(url, format!("bad redirect target {:?}: {}", location, e)))?;
        tracing::debug!(from = %current, to = %next, "Following redirect");
        current = next;
    }

    Err(fetch_failed(url, format!("more than {} redirects", MAX_REDIRECTS)))
}

/// Download from an absolute URL, vetting each hop with `admit`
async fn download_pdf<F, Fut>(url: &str, max_download_bytes: u64, admit: F) -> Result<ResolvedPdf>
where
    F: FnMut(Url) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let parsed = parse_absolute_url(url)?;

    tracing::debug!(url = %parsed, "Downloading PDF");
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| fetch_failed(url, e))?;
    let response = get_following_redirects(&client, parsed, url, admit).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_failed(url, format!("server answered {}", status)));
    }

    let data = read_capped_body(url, response, max_download_bytes).await?;
    if data.is_empty() {
        return Err(fetch_failed(url, "response had no content"));
    }
    if !has_pdf_header(&data) {
        return Err(Error::InvalidPdf {
            reason: "Downloaded data is not a valid PDF file".to_string(),
        });
    }

    tracing::debug!(url, bytes = data.len(), "Downloaded PDF");
    Ok(ResolvedPdf {
        data,
        source_name: url.to_string(),
    })
}

/// Download a PDF from an absolute URL.
///
/// A malformed or relative URL fails with [`Error::InvalidUri`] before any
/// network activity. Unless `allow_private_urls` is set, the first URL and
/// every redirect target must resolve to public addresses. Transport
/// failures, non-success statuses, and empty bodies all fail with
/// [`Error::FetchFailed`]. Nothing is retried.
pub async fn resolve_url(
    url: &str,
    allow_private_urls: bool,
    max_download_bytes: u64,
) -> Result<ResolvedPdf> {
    download_pdf(url, max_download_bytes, |hop: Url| async move {
        if allow_private_urls {
            Ok(())
        } else {
            ensure_public_host(&hop).await
        }
    })
    .await
}

/// Resolve a cache key to PDF data
pub async fn resolve_cache(
    cache_key: &str,
    cache: &Arc<RwLock<DocumentCache>>,
) -> Result<ResolvedPdf> {
    let cache_guard = cache.read().await;
    let cached = cache_guard
        .get(cache_key)
        .ok_or_else(|| Error::CacheKeyNotFound {
            key: cache_key.to_string(),
        })?;

    Ok(ResolvedPdf {
        data: cached.data,
        source_name: cached.origin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("not a url")]
    #[case("forms/application.pdf")]
    #[case("/absolute/path/only.pdf")]
    #[case("")]
    fn test_parse_absolute_url_rejects_relative(#[case] input: &str) {
        let result = parse_absolute_url(input);
        assert!(matches!(result, Err(Error::InvalidUri { .. })));
    }

    #[rstest]
    #[case("https://example.com/form.pdf")]
    #[case("http://localhost:8080/a?b=c")]
    fn test_parse_absolute_url_accepts_absolute(#[case] input: &str) {
        assert!(parse_absolute_url(input).is_ok());
    }

    #[tokio::test]
    async fn test_resolve_url_invalid_uri_without_network() {
        let result = resolve_url("not a url", false, 1024).await;
        match result {
            Err(Error::InvalidUri { url }) => assert_eq!(url, "not a url"),
            other => panic!("expected InvalidUri, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_resolve_url_without_host() {
        let result = resolve_url("mailto:forms@example.com", false, 1024).await;
        assert!(matches!(result, Err(Error::InvalidUri { .. })));
    }

    #[test]
    fn test_resolve_base64_invalid() {
        // Valid base64 but not PDF
        let result = resolve_base64("SGVsbG8gV29ybGQ="); // "Hello World"
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_resolve_base64_invalid_base64() {
        let result = resolve_base64("not valid base64!!!");
        assert!(matches!(result, Err(Error::Base64Decode(_))));
    }

    #[test]
    fn test_resolve_base64_pdf() {
        let resolved = resolve_base64("JVBERi0xLjc=").unwrap(); // "%PDF-1.7"
        assert_eq!(resolved.data, b"%PDF-1.7");
        assert_eq!(resolved.source_name, "<base64>");
    }

    #[test]
    fn test_resolve_path_not_found() {
        let result = resolve_path("/nonexistent/path/file.pdf");
        assert!(matches!(result, Err(Error::PdfNotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_cache_missing_key() {
        let cache = Arc::new(RwLock::new(DocumentCache::new(4, 1024)));
        let result = resolve_cache("missing", &cache).await;
        assert!(matches!(result, Err(Error::CacheKeyNotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_cache_reports_origin() {
        let cache = Arc::new(RwLock::new(DocumentCache::new(4, 1024)));
        let key = cache
            .read()
            .await
            .insert(b"%PDF-1.7".to_vec(), "filled:form.pdf")
            .unwrap();

        let resolved = resolve_cache(&key, &cache).await.unwrap();
        assert_eq!(resolved.data, b"%PDF-1.7");
        assert_eq!(resolved.source_name, "filled:form.pdf");
    }

    async fn reject_path(hop: Url, blocked: &'static str) -> Result<()> {
        if hop.path() == blocked {
            Err(Error::SsrfBlocked {
                url: hop.to_string(),
            })
        } else {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_redirect_target_is_vetted_before_request() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/internal"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/internal"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let url = format!("{}/start", server.uri());
        let result = download_pdf(&url, 1024, |hop| reject_path(hop, "/internal")).await;
        match result {
            Err(Error::SsrfBlocked { url }) => assert!(url.ends_with("/internal")),
            other => panic!("expected SsrfBlocked, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_redirect_followed_when_admitted() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old.pdf"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/form.pdf"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/form.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 moved".to_vec()))
            .mount(&server)
            .await;

        let url = format!("{}/old.pdf", server.uri());
        let resolved = resolve_url(&url, true, 1024).await.unwrap();
        assert_eq!(resolved.data, b"%PDF-1.7 moved");
        assert_eq!(resolved.source_name, url);
    }

    #[tokio::test]
    async fn test_redirect_loop_gives_up() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
            .mount(&server)
            .await;

        let url = format!("{}/loop", server.uri());
        let result = resolve_url(&url, true, 1024).await;
        assert!(matches!(result, Err(Error::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn test_redirect_without_location_fails() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let result = resolve_url(&format!("{}/form.pdf", server.uri()), true, 1024).await;
        assert!(matches!(result, Err(Error::FetchFailed { .. })));
    }

    #[test]
    fn test_is_private_ip_ranges() {
        assert!(is_private_ip(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_ip(&"169.254.169.254".parse().unwrap()));
        assert!(is_private_ip(&"100.64.0.1".parse().unwrap()));
        assert!(is_private_ip(&"::1".parse().unwrap()));
        assert!(is_private_ip(&"fd00::1".parse().unwrap()));
        assert!(is_private_ip(&"fe80::1".parse().unwrap()));
        assert!(is_private_ip(&"::ffff:10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_is_private_ip_public() {
        assert!(!is_private_ip(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip(&"203.0.113.1".parse().unwrap()));
        assert!(!is_private_ip(&"2001:db8::1".parse().unwrap()));
    }
}
