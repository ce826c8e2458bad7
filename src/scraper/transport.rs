// transport.rs
use crate::scraper::models::HttpResponse;
use crate::scraper::ScraperError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36";

/// Headers the market's own search page sends with its XHR calls.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/javascript, */*; q=0.01"),
    ("accept-language", "en-US,en;q=0.9"),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
    ("priority", "u=1, i"),
    ("referer", "https://eden-daoc.net/items"),
    (
        "sec-ch-ua",
        r#""Chromium";v="136", "Google Chrome";v="136", "Not.A/Brand";v="99""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""Windows""#),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    ("user-agent", USER_AGENT),
    ("x-requested-with", "XMLHttpRequest"),
];

/// Anything that can perform a GET and hand back status + body.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, ScraperError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &str) -> Result<HttpResponse, ScraperError> {
        (**self).get(url)
    }
}

/// Blocking reqwest client carrying the browser headers and session cookies.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(
        headers: &[(&str, &str)],
        cookies: &[(String, String)],
        timeout: Duration,
    ) -> Result<Self, ScraperError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScraperError::Client(format!("bad header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScraperError::Client(format!("bad value for {name}: {e}")))?;
            map.insert(name, value);
        }

        if !cookies.is_empty() {
            let cookie = cookie_header(cookies);
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| ScraperError::Client(format!("bad cookie value: {e}")))?;
            map.insert(COOKIE, value);
        }

        let client = Client::builder()
            .default_headers(map)
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, ScraperError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|e| ScraperError::Network(e.to_string()))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

/// `name=value; name=value`, in the order given. Empty values are kept.
pub fn cookie_header(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_keeps_order_and_empty_values() {
        let cookies = vec![
            ("eden_daoc_u".to_string(), "".to_string()),
            ("eden_daoc_sid".to_string(), "abc123".to_string()),
        ];
        assert_eq!(cookie_header(&cookies), "eden_daoc_u=; eden_daoc_sid=abc123");
    }

    #[test]
    fn client_builds_with_browser_headers() {
        let cookies = vec![("eden_daoc_sid".to_string(), "xyz".to_string())];
        assert!(ReqwestTransport::new(BROWSER_HEADERS, &cookies, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn invalid_cookie_value_is_a_client_error() {
        let cookies = vec![("sid".to_string(), "bad\nvalue".to_string())];
        let err = ReqwestTransport::new(BROWSER_HEADERS, &cookies, Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, ScraperError::Client(_)));
    }
}
