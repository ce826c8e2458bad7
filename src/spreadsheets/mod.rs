pub mod listings_csv;

pub use listings_csv::{CsvListingSink, ListingSink, OutputMode, SinkError};
