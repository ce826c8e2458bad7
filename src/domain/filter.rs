// src/domain/filter.rs

use crate::domain::listing::Listing;
use crate::domain::price::PriceBound;
use thiserror::Error;

pub const DEFAULT_MIN_UTILITY: f64 = 0.0;
pub const DEFAULT_MAX_UTILITY: f64 = 200.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterConfigError {
    #[error("utility bounds must be finite numbers (min {min}, max {max})")]
    NotFinite { min: f64, max: f64 },
    #[error("minimum utility {min} is above maximum utility {max}")]
    Inverted { min: f64, max: f64 },
}

/// Bounds a listing has to fall within to be written out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub max_price: PriceBound,
    pub min_utility: f64,
    pub max_utility: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_price: PriceBound::Unbounded,
            min_utility: DEFAULT_MIN_UTILITY,
            max_utility: DEFAULT_MAX_UTILITY,
        }
    }
}

impl FilterConfig {
    pub fn new(
        max_price: PriceBound,
        min_utility: f64,
        max_utility: f64,
    ) -> Result<Self, FilterConfigError> {
        if !min_utility.is_finite() || !max_utility.is_finite() {
            return Err(FilterConfigError::NotFinite {
                min: min_utility,
                max: max_utility,
            });
        }
        if min_utility > max_utility {
            return Err(FilterConfigError::Inverted {
                min: min_utility,
                max: max_utility,
            });
        }
        Ok(Self {
            max_price,
            min_utility,
            max_utility,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    /// Utility is under the floor. With results sorted by utility, nothing
    /// after this listing can qualify either.
    RejectAndStopPage,
}

/// What the pipeline does with a [`Verdict::RejectAndStopPage`].
///
/// The market appears to sort by utility, descending, but nothing in the
/// payload guarantees it, so stopping early stays a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EarlyStop {
    /// Keep scanning until the endpoint runs out of pages.
    Disabled,
    /// Finish the current page, then stop.
    #[default]
    FinishPage,
    /// Stop at the first low-utility listing.
    Immediate,
    /// Drop the rest of the current page and carry on with the next one.
    SkipPage,
}

pub fn evaluate(listing: &Listing, config: &FilterConfig) -> Verdict {
    let utility = listing.utility;

    if utility < config.min_utility {
        return Verdict::RejectAndStopPage;
    }

    if utility <= config.max_utility && config.max_price.allows(listing.item_price) {
        Verdict::Accept
    } else {
        Verdict::Reject
    }
}
