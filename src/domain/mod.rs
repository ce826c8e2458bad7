pub mod filter;
pub mod listing;
pub mod price;

pub use listing::RecordDecoder;
