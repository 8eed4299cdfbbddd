//! Page download with charset detection.
//!
//! Encoding precedence: `Content-Type` charset, then a `charset=` found in
//! the first KiB of the body (meta tag), then UTF-8.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, error, info};

use super::ExtractError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Bytes scanned for a `<meta charset>` declaration.
const META_SCAN_BYTES: usize = 1024;

static CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset=["']?([\w-]+)["']?"#).expect("charset pattern is valid")
});

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    /// Detected encoding label, lowercased.
    pub charset: String,
    pub html: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout_seconds: u64) -> Result<Self, ExtractError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ExtractError::Request {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ExtractError> {
        info!(%url, "fetching page");
        let started = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            error!(%url, error = %e, "page request failed");
            ExtractError::Request { url: url.to_string(), reason: e.to_string() }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, %status, "page returned HTTP error");
            return Err(ExtractError::Http { url: url.to_string(), status: status.as_u16() });
        }

        let header_charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let bytes = response.bytes().await.map_err(|e| ExtractError::Request {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;

        let charset = header_charset
            .or_else(|| charset_from_meta(&bytes))
            .unwrap_or_else(|| "utf-8".to_string());
        let html = decode(&bytes, &charset);
        let elapsed = started.elapsed();

        info!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = bytes.len(),
            %charset,
            "page fetched"
        );

        Ok(FetchedPage { url: url.to_string(), status: status.as_u16(), charset, html, elapsed })
    }
}

pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    CHARSET_RE
        .captures(content_type)
        .map(|c| normalize_charset(&c[1]))
}

/// Look for `charset=` in the head of the document.
pub fn charset_from_meta(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_SCAN_BYTES)];
    let sample = String::from_utf8_lossy(head);
    CHARSET_RE.captures(&sample).map(|c| normalize_charset(&c[1]))
}

/// Lowercase and map common non-standard spellings.
pub fn normalize_charset(label: &str) -> String {
    let lower = label.trim().to_ascii_lowercase();
    match lower.as_str() {
        "utf8" => "utf-8".to_string(),
        "gb2312" | "gb_2312" => "gbk".to_string(),
        _ => lower,
    }
}

/// Decode with the named encoding; unknown labels fall back to UTF-8.
pub fn decode(bytes: &[u8], charset: &str) -> String {
    let encoding = Encoding::for_label(charset.as_bytes()).unwrap_or_else(|| {
        debug!(%charset, "unknown charset label, decoding as utf-8");
        UTF_8
    });
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(%charset, "malformed sequences replaced during decode");
    }
    text.into_owned()
}
