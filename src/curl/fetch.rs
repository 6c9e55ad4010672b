use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::model::{FetchOptions, ParsedCurl};

static ENDPOINT_FALLBACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^/]+(/.*)").expect("valid regex"));

/// Builds the options for sending a parsed command.
///
/// Supplied file content replaces the body of file uploads; otherwise the
/// inline body (if any) is used.
pub fn curl_to_fetch_options(parsed: &ParsedCurl, file_data: Option<&str>) -> FetchOptions {
    let body = match file_data {
        Some(content) if parsed.is_file_upload && !content.is_empty() => Some(content.to_string()),
        _ => parsed.body.clone(),
    };

    FetchOptions {
        method: parsed.method.clone(),
        headers: parsed.headers.clone(),
        body,
    }
}

/// Returns the path and query of `url`, dropping scheme and host.
pub fn extract_endpoint(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", parsed.path(), query),
            _ => parsed.path().to_string(),
        },
        Err(_) => ENDPOINT_FALLBACK
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| url.to_string()),
    }
}
