use thiserror::Error;

pub const DEFAULT_ITEM_BASE_URL: &str = "https://eden-daoc.net/items";

/// Positional fields carried by every decoded record.
pub const FIELD_COUNT: usize = 18;

/// Records shorter than this can't carry price and utility.
pub const MIN_FIELDS: usize = 12;

pub const IDX_HOUSE_NUMBER: usize = 0;
pub const IDX_MARKET_ID: usize = 1;
pub const IDX_ITEM_PRICE: usize = 2;
pub const IDX_ITEM_NAME: usize = 7;
pub const IDX_MODEL: usize = 9;
pub const IDX_UTILITY: usize = 11;

/// Output columns, in row order. The last one is the derived market URL.
pub const CSV_HEADERS: [&str; FIELD_COUNT + 1] = [
    "houseNumber",
    "marketId",
    "itemPrice",
    "quality",
    "con",
    "durability",
    "unknown1",
    "itemName",
    "unknown2",
    "model",
    "unknown4",
    "utility",
    "unknown5",
    "unknown6",
    "unknown7",
    "unknown8",
    "unknown9",
    "unknown10",
    "url",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("expected at least 12 fields, got {0}")]
    TooFewFields(usize),
    #[error("item price {0:?} is not a whole number")]
    BadPrice(String),
    #[error("utility {0:?} is not a number")]
    BadUtility(String),
}

/// One market listing decoded from a comma-packed record.
///
/// The raw fields are kept verbatim so the written row matches what the
/// market returned; only the ones we filter on are parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    fields: Vec<String>,
    pub item_price: u64,
    pub utility: f64,
    pub url: String,
}

impl Listing {
    pub fn house_number(&self) -> &str {
        &self.fields[IDX_HOUSE_NUMBER]
    }

    pub fn market_id(&self) -> &str {
        &self.fields[IDX_MARKET_ID]
    }

    pub fn item_name(&self) -> &str {
        &self.fields[IDX_ITEM_NAME]
    }

    pub fn model(&self) -> &str {
        &self.fields[IDX_MODEL]
    }

    /// The 19 output columns: every positional field, then the URL.
    pub fn to_record(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.url.as_str()))
            .collect()
    }
}

/// Turns raw record strings into [`Listing`]s.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    item_base_url: String,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_BASE_URL)
    }
}

impl RecordDecoder {
    pub fn new(item_base_url: impl Into<String>) -> Self {
        Self {
            item_base_url: item_base_url.into(),
        }
    }

    pub fn item_url(&self, market_id: &str) -> String {
        format!("{}?m=market&mid={}", self.item_base_url, market_id)
    }

    /// Split on `,` (no escaping) and validate price and utility.
    pub fn decode(&self, raw: &str) -> Result<Listing, RecordError> {
        let mut fields: Vec<String> = raw.split(',').map(str::to_string).collect();
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::TooFewFields(fields.len()));
        }

        let price_text = fields[IDX_ITEM_PRICE].trim();
        let item_price: u64 = price_text
            .parse()
            .map_err(|_| RecordError::BadPrice(price_text.to_string()))?;

        let utility_text = fields[IDX_UTILITY].trim();
        let utility: f64 = utility_text
            .parse()
            .map_err(|_| RecordError::BadUtility(utility_text.to_string()))?;

        // Fold any surplus back into the last column so rows stay 19 wide.
        if fields.len() > FIELD_COUNT {
            let surplus = fields.split_off(FIELD_COUNT);
            let last = &mut fields[FIELD_COUNT - 1];
            for extra in surplus {
                last.push(',');
                last.push_str(&extra);
            }
        }
        fields.resize(FIELD_COUNT, String::new());

        let url = self.item_url(&fields[IDX_MARKET_ID]);

        Ok(Listing {
            fields,
            item_price,
            utility,
            url,
        })
    }
}
