//! Responses returned by [`HttpClient`](crate::clients::HttpClient).

use std::collections::HashMap;

/// Cursors parsed from a `Link` header.
///
/// Shopify paginates with opaque `page_info` cursors carried in the
/// `rel="next"` and `rel="previous"` links.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::clients::PaginationInfo;
///
/// let info = PaginationInfo::parse_link_header(
///     r#"<https://s.myshopify.com/admin/api/2025-01/webhooks.json?limit=1&page_info=abc>; rel="next""#,
/// );
/// assert_eq!(info.next_page_info.as_deref(), Some("abc"));
/// assert!(info.prev_page_info.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationInfo {
    /// Cursor for the previous page.
    pub prev_page_info: Option<String>,
    /// Cursor for the next page.
    pub next_page_info: Option<String>,
}

impl PaginationInfo {
    /// Parses a `Link` header value of the form
    /// `<url>; rel="next", <url>; rel="previous"`.
    #[must_use]
    pub fn parse_link_header(header_value: &str) -> Self {
        let mut result = Self::default();

        for link in header_value.split(',') {
            let mut parts = link.split(';').map(str::trim);
            let Some(url) = parts
                .next()
                .map(|s| s.trim_start_matches('<').trim_end_matches('>'))
            else {
                continue;
            };
            let rel = parts.find_map(|part| part.strip_prefix("rel=").map(|r| r.trim_matches('"')));

            let slot = match rel {
                Some("next") => &mut result.next_page_info,
                Some("previous") => &mut result.prev_page_info,
                _ => continue,
            };
            *slot = Self::page_info_param(url);
        }

        result
    }

    /// Returns `true` if there is a following page.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next_page_info.is_some()
    }

    fn page_info_param(url: &str) -> Option<String> {
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "page_info")
            .map(|(_, value)| value.to_string())
    }
}

/// An Admin API response.
///
/// Header names are stored lowercased.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers; a name may repeat.
    pub headers: HashMap<String, Vec<String>>,
    /// The JSON body (`{}` when empty).
    pub body: serde_json::Value,
    /// Pagination cursors from the `Link` header.
    pub page_info: PaginationInfo,
    /// Seconds to wait before retrying, from `Retry-After`.
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a response, parsing `Link` and `Retry-After`.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let first = |name: &str| headers.get(name).and_then(|values| values.first());

        let page_info = first("link")
            .map(|link| PaginationInfo::parse_link_header(link))
            .unwrap_or_default();
        let retry_request_after = first("retry-after").and_then(|value| value.parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            page_info,
            retry_request_after,
        }
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header, used to correlate errors.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the `X-Shopify-API-Deprecated-Reason` header.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        self.header("x-shopify-api-deprecated-reason")
    }
}
