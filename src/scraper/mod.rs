pub mod models;
mod pipeline;
mod scraper;
mod scraper_error;
pub mod transport;

pub use pipeline::{RunReport, ScrapePipeline, StopReason};
pub use scraper::PageFetcher;
pub use scraper_error::ScraperError;
pub use transport::{HttpTransport, ReqwestTransport, BROWSER_HEADERS};
