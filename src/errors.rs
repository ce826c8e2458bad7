// errors.rs
use crate::config::ConfigError;
use crate::scraper::ScraperError;
use crate::spreadsheets::SinkError;
use thiserror::Error;

/// Failures that end a run, either at startup or mid-way.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("scraper error: {0}")]
    Scraper(#[from] ScraperError),
    #[error("output error: {0}")]
    Sink(#[from] SinkError),
}
