use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("could not build HTTP client: {0}")]
    Client(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("page {page}: request failed: {message}")]
    Request { page: u32, message: String },
    #[error("page {page}: HTTP {status}")]
    Status { page: u32, status: u16 },
    #[error("page {page}: JSON parse error: {message}")]
    JsonParse { page: u32, message: String },
    #[error("page {page}: unexpected data shape: {message}")]
    UnexpectedShape { page: u32, message: String },
}
