use crate::domain::listing::Listing;
use crate::scraper::models::HttpResponse;
use crate::scraper::{HttpTransport, ScraperError};
use crate::spreadsheets::{ListingSink, SinkError};
use std::cell::RefCell;
use std::collections::VecDeque;

/// A 12-field market record with the given id, price and utility.
pub fn item(market_id: &str, price: u64, utility: f64) -> String {
    format!("H{market_id},{market_id},{price},99,0,100,x,Item {market_id},y,512,z,{utility}")
}

/// JSON body for one search page.
pub fn page_body(records: &[String]) -> String {
    serde_json::json!({ "l": records }).to_string()
}

/// Plays back canned responses in order; once they run out every request
/// gets an empty page.
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, ScraperError>>>,
    pub requests: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_pages(pages: &[Vec<String>]) -> Self {
        let t = Self::new();
        for records in pages {
            t.push_ok(&page_body(records));
        }
        t
    }

    pub fn push_ok(&self, body: &str) {
        self.push_status(200, body);
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub fn push_err(&self, err: ScraperError) {
        self.responses.borrow_mut().push_back(Err(err));
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl HttpTransport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, ScraperError> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 200,
                body: br#"{"l": []}"#.to_vec(),
            })
        })
    }
}

/// Keeps accepted listings in memory and counts closes.
#[derive(Default)]
pub struct RecordingSink {
    pub rows: Vec<Listing>,
    pub closes: usize,
    pub fail_on_write: bool,
    pub fail_on_close: bool,
}

impl RecordingSink {
    pub fn market_ids(&self) -> Vec<String> {
        self.rows.iter().map(|l| l.market_id().to_string()).collect()
    }
}

impl ListingSink for RecordingSink {
    fn write_listing(&mut self, listing: &Listing) -> Result<(), SinkError> {
        if self.fail_on_write {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.rows.push(listing.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.closes += 1;
        if self.fail_on_close {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "flush failed",
            )));
        }
        Ok(())
    }
}
