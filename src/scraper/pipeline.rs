// pipeline.rs
use crate::domain::filter::{evaluate, EarlyStop, FilterConfig, Verdict};
use crate::domain::listing::RecordDecoder;
use crate::scraper::models::{Page, PageOutcome};
use crate::scraper::scraper::PageFetcher;
use crate::scraper::transport::HttpTransport;
use crate::scraper::ScraperError;
use crate::spreadsheets::{ListingSink, SinkError};
use tracing::{debug, error, info, warn};

/// Why a run ended.
#[derive(Debug)]
pub enum StopReason {
    /// The endpoint returned an empty page.
    EndOfData { page: u32 },
    /// A listing under the utility floor was seen on this page.
    LowUtility { page: u32 },
    /// Fetching or decoding this page failed.
    TransportError { page: u32, error: ScraperError },
    /// The configured page cap was reached.
    Complete { pages: u32 },
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::TransportError { .. })
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::EndOfData { page } => write!(f, "no more items on page {page}"),
            StopReason::LowUtility { page } => {
                write!(f, "low utility item found on page {page}")
            }
            StopReason::TransportError { page, error } => {
                write!(f, "failed to fetch page {page}: {error}")
            }
            StopReason::Complete { pages } => write!(f, "page limit of {pages} reached"),
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub stop: StopReason,
    pub pages_requested: u32,
    pub records_seen: usize,
    pub malformed_skipped: usize,
    pub listings_written: usize,
}

#[derive(Debug, Default)]
struct Counters {
    pages_requested: u32,
    records_seen: usize,
    malformed_skipped: usize,
    listings_written: usize,
}

enum State {
    Fetching(u32),
    Processing(u32, Page),
    Stopped(StopReason),
}

/// Walks result pages in order, writing every accepted listing as it goes.
///
/// Only one page is ever in flight: whether page N+1 is requested depends on
/// what page N contained.
pub struct ScrapePipeline<'a, T> {
    fetcher: PageFetcher<T>,
    decoder: RecordDecoder,
    filter: &'a FilterConfig,
    early_stop: EarlyStop,
    max_pages: Option<u32>,
}

impl<'a, T: HttpTransport> ScrapePipeline<'a, T> {
    pub fn new(fetcher: PageFetcher<T>, decoder: RecordDecoder, filter: &'a FilterConfig) -> Self {
        Self {
            fetcher,
            decoder,
            filter,
            early_stop: EarlyStop::default(),
            max_pages: None,
        }
    }

    pub fn early_stop(mut self, policy: EarlyStop) -> Self {
        self.early_stop = policy;
        self
    }

    pub fn max_pages(mut self, cap: Option<u32>) -> Self {
        self.max_pages = cap;
        self
    }

    /// Run until a stop condition fires. The sink is closed exactly once
    /// before returning, on every path.
    ///
    /// Transport failures end the run with [`StopReason::TransportError`];
    /// only sink failures surface as `Err`. A close failure after a transport
    /// failure is logged and the transport stop is still returned.
    pub fn run<S: ListingSink + ?Sized>(&self, sink: &mut S) -> Result<RunReport, SinkError> {
        let mut counters = Counters::default();
        let mut state = State::Fetching(0);

        let stop = loop {
            state = match state {
                State::Fetching(page) => self.fetch(page, &mut counters),
                State::Processing(page, records) => {
                    match self.process_page(page, &records, &mut *sink, &mut counters) {
                        Ok(true) => State::Stopped(StopReason::LowUtility { page }),
                        Ok(false) => State::Fetching(page + 1),
                        Err(e) => {
                            error!(page, error = %e, "Writing output failed, aborting run");
                            if let Err(close_err) = sink.close() {
                                warn!(error = %close_err, "Closing output after failure also failed");
                            }
                            return Err(e);
                        }
                    }
                }
                State::Stopped(reason) => break reason,
            };
        };

        if let Err(close_err) = sink.close() {
            if !stop.is_failure() {
                return Err(close_err);
            }
            error!(
                error = %close_err,
                stop = %stop,
                "Closing output failed after an aborted run"
            );
        }

        let report = RunReport {
            stop,
            pages_requested: counters.pages_requested,
            records_seen: counters.records_seen,
            malformed_skipped: counters.malformed_skipped,
            listings_written: counters.listings_written,
        };

        info!(
            pages = report.pages_requested,
            records = report.records_seen,
            malformed = report.malformed_skipped,
            written = report.listings_written,
            "Run finished"
        );

        Ok(report)
    }

    fn fetch(&self, page: u32, counters: &mut Counters) -> State {
        if let Some(cap) = self.max_pages {
            if page >= cap {
                info!(pages = cap, "Page limit reached. Stopping.");
                return State::Stopped(StopReason::Complete { pages: cap });
            }
        }

        info!(page, url = %self.fetcher.page_url(page), "Fetching page");
        counters.pages_requested += 1;

        match self.fetcher.fetch_page(page) {
            Ok(PageOutcome::Records(records)) => {
                debug!(page, count = records.records.len(), "Page fetched");
                counters.malformed_skipped += records.non_string_entries;
                State::Processing(page, records)
            }
            Ok(PageOutcome::EndOfData) => {
                info!(page, "No more items found. Stopping.");
                State::Stopped(StopReason::EndOfData { page })
            }
            Err(error) => {
                error!(page, error = %error, "Failed to fetch page");
                State::Stopped(StopReason::TransportError { page, error })
            }
        }
    }

    /// Returns true when the page turned up a listing under the utility floor
    /// and the early-stop policy says to end the run. Under `SkipPage` the
    /// rest of the page is dropped and false is returned.
    fn process_page<S: ListingSink + ?Sized>(
        &self,
        page: u32,
        records: &Page,
        sink: &mut S,
        counters: &mut Counters,
    ) -> Result<bool, SinkError> {
        let mut low_utility = false;

        for raw in &records.records {
            counters.records_seen += 1;

            let listing = match self.decoder.decode(raw) {
                Ok(listing) => listing,
                Err(e) => {
                    counters.malformed_skipped += 1;
                    warn!(page, record = %raw, error = %e, "Skipping malformed item");
                    continue;
                }
            };

            match evaluate(&listing, self.filter) {
                Verdict::Accept => {
                    sink.write_listing(&listing)?;
                    counters.listings_written += 1;
                    debug!(
                        page,
                        market_id = listing.market_id(),
                        house = listing.house_number(),
                        item = listing.item_name(),
                        model = listing.model(),
                        price = listing.item_price,
                        utility = listing.utility,
                        "Listing matched"
                    );
                }
                Verdict::Reject => {}
                Verdict::RejectAndStopPage => match self.early_stop {
                    EarlyStop::Disabled => {}
                    EarlyStop::FinishPage => low_utility = true,
                    EarlyStop::Immediate => {
                        info!(page, utility = listing.utility, "Found a low utility item, stopping now.");
                        return Ok(true);
                    }
                    EarlyStop::SkipPage => {
                        info!(
                            page,
                            utility = listing.utility,
                            "Found a low utility item, skipping to the next page."
                        );
                        return Ok(false);
                    }
                },
            }
        }

        if low_utility {
            info!(page, "Found a low utility item, stopping the search.");
        }
        Ok(low_utility)
    }
}
