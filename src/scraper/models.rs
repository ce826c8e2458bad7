// Shapes exchanged with the market search endpoint.
//
// Payload:
//  {
//    "l": [ "house,marketId,price,...,utility,...", ... ]
//  }
//
// No total count or next-page token; an empty "l" means we ran past the end.

/// Raw reply from the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One non-empty page of raw records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<String>,
    /// Entries in "l" that weren't strings and were dropped.
    pub non_string_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Records(Page),
    EndOfData,
}
