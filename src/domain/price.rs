// src/domain/price.rs
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const COPPER_PER_PLATINUM: u64 = 10_000_000;
pub const COPPER_PER_GOLD: u64 = 10_000;
pub const COPPER_PER_SILVER: u64 = 100;

// Each unit at most once, in p/g/s/c order, nothing else allowed.
static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:([0-9]+)p)?(?:([0-9]+)g)?(?:([0-9]+)s)?(?:([0-9]+)c)?$")
        .expect("price notation regex is valid")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceFormatError {
    #[error("invalid price string format: {0:?}")]
    Invalid(String),
    #[error("price {0:?} does not fit in a copper count")]
    Overflow(String),
}

/// Convert price notation like `1p2g3s4c` into copper.
///
/// Surrounding whitespace is ignored and an empty string is zero.
pub fn to_copper(notation: &str) -> Result<u64, PriceFormatError> {
    let caps = PRICE_RE
        .captures(notation.trim())
        .ok_or_else(|| PriceFormatError::Invalid(notation.to_string()))?;

    let factors = [
        COPPER_PER_PLATINUM,
        COPPER_PER_GOLD,
        COPPER_PER_SILVER,
        1,
    ];

    let mut total: u64 = 0;
    for (group, factor) in factors.iter().enumerate() {
        let Some(m) = caps.get(group + 1) else {
            continue;
        };
        let overflow = || PriceFormatError::Overflow(notation.to_string());
        let value: u64 = m.as_str().parse().map_err(|_| overflow())?;
        total = value
            .checked_mul(*factor)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(overflow)?;
    }

    Ok(total)
}

/// Render copper back into the shortest notation, e.g. `1p2g3s4c`.
pub fn format_copper(copper: u64) -> String {
    if copper == 0 {
        return "0c".to_string();
    }

    let mut out = String::new();
    let mut rest = copper;
    for (factor, suffix) in [
        (COPPER_PER_PLATINUM, 'p'),
        (COPPER_PER_GOLD, 'g'),
        (COPPER_PER_SILVER, 's'),
        (1, 'c'),
    ] {
        let n = rest / factor;
        rest %= factor;
        if n > 0 {
            out.push_str(&n.to_string());
            out.push(suffix);
        }
    }
    out
}

/// Upper price limit for a run. A blank bound means no limit at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBound {
    Unbounded,
    AtMost(u64),
}

impl PriceBound {
    pub fn parse(notation: Option<&str>) -> Result<Self, PriceFormatError> {
        match notation.map(str::trim) {
            None | Some("") => Ok(PriceBound::Unbounded),
            Some(s) => to_copper(s).map(PriceBound::AtMost),
        }
    }

    pub fn allows(&self, copper: u64) -> bool {
        match self {
            PriceBound::Unbounded => true,
            PriceBound::AtMost(max) => copper <= *max,
        }
    }
}

impl std::fmt::Display for PriceBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceBound::Unbounded => write!(f, "unbounded"),
            PriceBound::AtMost(c) => write!(f, "{}", format_copper(*c)),
        }
    }
}
