// scraper.rs
use crate::scraper::models::{Page, PageOutcome};
use crate::scraper::transport::HttpTransport;
use crate::scraper::ScraperError;
use serde_json::Value;
use tracing::warn;
use url::Url;

/// Query parameter carrying the page index.
const PAGE_PARAM: &str = "p";

/// Fetches single result pages from the market search endpoint.
pub struct PageFetcher<T> {
    transport: T,
    base_url: Url,
}

impl<T: HttpTransport> PageFetcher<T> {
    pub fn new(transport: T, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// Base URL plus `p=<page>`. A `p` already present in the base is replaced.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();

        if url.query_pairs().any(|(k, _)| k == PAGE_PARAM) {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != PAGE_PARAM)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut().clear().extend_pairs(kept);
        }

        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &page.to_string());
        url
    }

    pub fn fetch_page(&self, page: u32) -> Result<PageOutcome, ScraperError> {
        let url = self.page_url(page);

        let resp = self.transport.get(url.as_str()).map_err(|e| match e {
            ScraperError::Network(message) | ScraperError::Client(message) => {
                ScraperError::Request { page, message }
            }
            other => other,
        })?;

        if !resp.is_success() {
            return Err(ScraperError::Status {
                page,
                status: resp.status,
            });
        }

        let data: Value = serde_json::from_slice(&resp.body).map_err(|e| {
            ScraperError::JsonParse {
                page,
                message: e.to_string(),
            }
        })?;

        Self::extract_records(page, &data)
    }

    fn extract_records(page: u32, data: &Value) -> Result<PageOutcome, ScraperError> {
        let obj = data.as_object().ok_or_else(|| ScraperError::UnexpectedShape {
            page,
            message: "top-level value is not an object".to_string(),
        })?;

        let arr = match obj.get("l") {
            None | Some(Value::Null) => return Ok(PageOutcome::EndOfData),
            Some(Value::Array(arr)) => arr,
            Some(other) => {
                return Err(ScraperError::UnexpectedShape {
                    page,
                    message: format!("\"l\" is not a list: {other}"),
                })
            }
        };

        if arr.is_empty() {
            return Ok(PageOutcome::EndOfData);
        }

        let mut out = Page::default();
        for entry in arr {
            match entry.as_str() {
                Some(s) => out.records.push(s.to_string()),
                None => {
                    warn!(page, entry = %entry, "Skipping non-string record");
                    out.non_string_entries += 1;
                }
            }
        }

        Ok(PageOutcome::Records(out))
    }
}
