use crate::domain::filter::{
    EarlyStop, FilterConfig, FilterConfigError, DEFAULT_MAX_UTILITY, DEFAULT_MIN_UTILITY,
};
use crate::domain::price::{PriceBound, PriceFormatError};
use crate::spreadsheets::OutputMode;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const SEARCH_ENDPOINT: &str = "https://eden-daoc.net/itm/market_search.php";

/// Item category sent with every constructed search.
const SEARCH_CATEGORY: &str = "22";

const USER_COOKIE: &str = "eden_daoc_u";
const SESSION_COOKIE: &str = "eden_daoc_sid";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fetch market item data and save it to CSV")]
pub struct Args {
    /// Realm: albion/alb, midgard/mid, hibernia/hib (anything else means midgard)
    #[arg(long, default_value = "")]
    pub realm: String,

    /// Item name to search for
    #[arg(long, default_value = "")]
    pub item: String,

    /// Max price, e.g. 1p50g or 20g5s (blank for no limit)
    #[arg(long)]
    pub price: Option<String>,

    /// Minimum utility
    #[arg(
        long = "min-utility",
        alias = "min_utility",
        allow_negative_numbers = true,
        default_value_t = DEFAULT_MIN_UTILITY
    )]
    pub min_utility: f64,

    /// Maximum utility
    #[arg(
        long = "max-utility",
        alias = "max_utility",
        allow_negative_numbers = true,
        default_value_t = DEFAULT_MAX_UTILITY
    )]
    pub max_utility: f64,

    /// Full search URL to use instead of the one built from realm and item
    #[arg(long = "search-url", alias = "search_url", default_value = "")]
    pub search_url: String,

    /// Append to the CSV instead of starting a new one
    #[arg(long)]
    pub append: bool,

    /// Path to output CSV file
    #[arg(short, long, default_value = "items.csv")]
    pub output: PathBuf,

    /// What to do once a listing below the minimum utility shows up
    #[arg(long, value_enum, default_value_t = EarlyStop::FinishPage)]
    pub early_stop: EarlyStop,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Value of the eden_daoc_u cookie
    #[arg(long, env = "EDEN_DAOC_U", default_value = "", hide_env_values = true)]
    pub cookie_user: String,

    /// Value of the eden_daoc_sid cookie
    #[arg(long, env = "EDEN_DAOC_SID", default_value = "", hide_env_values = true)]
    pub cookie_session: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bad --price: {0}")]
    Price(#[from] PriceFormatError),
    #[error("bad utility bounds: {0}")]
    Filter(#[from] FilterConfigError),
    #[error("bad --search-url {url:?}: {source}")]
    SearchUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realm {
    Albion,
    Midgard,
    Hibernia,
}

impl Realm {
    /// Unknown names fall back to Midgard.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "albion" | "alb" => Realm::Albion,
            "hibernia" | "hib" => Realm::Hibernia,
            _ => Realm::Midgard,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Realm::Albion => 1,
            Realm::Midgard => 2,
            Realm::Hibernia => 3,
        }
    }
}

/// Everything a run needs, resolved once up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub realm: Realm,
    pub base_url: Url,
    pub filter: FilterConfig,
    pub output_path: PathBuf,
    pub output_mode: OutputMode,
    pub early_stop: EarlyStop,
    pub max_pages: Option<u32>,
    pub timeout: Duration,
    pub cookies: Vec<(String, String)>,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let realm = Realm::from_name(&args.realm);

        let max_price = PriceBound::parse(args.price.as_deref())?;
        let filter = FilterConfig::new(max_price, args.min_utility, args.max_utility)?;

        let search_url = args.search_url.trim();
        let base_url = if search_url.is_empty() {
            search_url_for(realm, &args.item)
        } else {
            Url::parse(search_url).map_err(|source| ConfigError::SearchUrl {
                url: search_url.to_string(),
                source,
            })?
        };

        let output_mode = if args.append {
            OutputMode::Append
        } else {
            OutputMode::Truncate
        };

        Ok(Self {
            realm,
            base_url,
            filter,
            output_path: args.output.clone(),
            output_mode,
            early_stop: args.early_stop,
            max_pages: args.max_pages,
            timeout: Duration::from_secs(args.timeout_secs),
            cookies: vec![
                (USER_COOKIE.to_string(), args.cookie_user.clone()),
                (SESSION_COOKIE.to_string(), args.cookie_session.clone()),
            ],
        })
    }
}

/// `market_search.php?r=<realm>&c=22[&s=<item>]`
pub fn search_url_for(realm: Realm, item: &str) -> Url {
    let mut url = Url::parse(SEARCH_ENDPOINT).expect("search endpoint is a valid URL");
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("r", &realm.id().to_string());
        q.append_pair("c", SEARCH_CATEGORY);
        if !item.is_empty() {
            q.append_pair("s", item);
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["market_scraper"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn realm_names_map_to_ids() {
        assert_eq!(Realm::from_name("alb").id(), 1);
        assert_eq!(Realm::from_name("ALBION").id(), 1);
        assert_eq!(Realm::from_name("mid").id(), 2);
        assert_eq!(Realm::from_name("Hib").id(), 3);
        assert_eq!(Realm::from_name("hibernia").id(), 3);
    }

    #[test]
    fn unknown_realm_defaults_to_midgard() {
        assert_eq!(Realm::from_name(""), Realm::Midgard);
        assert_eq!(Realm::from_name("atlantis"), Realm::Midgard);
    }

    #[test]
    fn search_url_includes_item_only_when_given() {
        assert_eq!(
            search_url_for(Realm::Albion, "").as_str(),
            "https://eden-daoc.net/itm/market_search.php?r=1&c=22"
        );
        assert_eq!(
            search_url_for(Realm::Hibernia, "Cloth Cap").as_str(),
            "https://eden-daoc.net/itm/market_search.php?r=3&c=22&s=Cloth+Cap"
        );
    }

    #[test]
    fn defaults_resolve_to_unbounded_truncate_run() {
        let cfg = RunConfig::from_args(&args(&[])).unwrap();
        assert_eq!(cfg.realm, Realm::Midgard);
        assert_eq!(cfg.filter, FilterConfig::default());
        assert_eq!(cfg.output_mode, OutputMode::Truncate);
        assert_eq!(cfg.output_path, PathBuf::from("items.csv"));
        assert_eq!(cfg.early_stop, EarlyStop::FinishPage);
        assert_eq!(cfg.max_pages, None);
        assert_eq!(cfg.timeout, Duration::from_secs(60));
    }

    #[test]
    fn flags_are_resolved() {
        let cfg = RunConfig::from_args(&args(&[
            "--realm",
            "alb",
            "--item",
            "sword",
            "--price",
            "2g",
            "--min_utility",
            "50",
            "--max-utility",
            "150",
            "--append",
            "--early-stop",
            "immediate",
            "--max-pages",
            "4",
        ]))
        .unwrap();

        assert_eq!(cfg.filter.max_price, PriceBound::AtMost(20_000));
        assert_eq!(cfg.filter.min_utility, 50.0);
        assert_eq!(cfg.filter.max_utility, 150.0);
        assert_eq!(cfg.output_mode, OutputMode::Append);
        assert_eq!(cfg.early_stop, EarlyStop::Immediate);
        assert_eq!(cfg.max_pages, Some(4));
        assert!(cfg.base_url.as_str().ends_with("r=1&c=22&s=sword"));
    }

    #[test]
    fn negative_utility_bounds_parse_as_separate_values() {
        let cfg =
            RunConfig::from_args(&args(&["--min-utility", "-5", "--max-utility", "-1"])).unwrap();
        assert_eq!(cfg.filter.min_utility, -5.0);
        assert_eq!(cfg.filter.max_utility, -1.0);

        let cfg = RunConfig::from_args(&args(&["--min_utility", "-5"])).unwrap();
        assert_eq!(cfg.filter.min_utility, -5.0);
    }

    #[test]
    fn skip_page_policy_is_selectable() {
        let cfg = RunConfig::from_args(&args(&["--early-stop", "skip-page"])).unwrap();
        assert_eq!(cfg.early_stop, EarlyStop::SkipPage);
    }

    #[test]
    fn search_url_overrides_constructed_one() {
        let cfg = RunConfig::from_args(&args(&[
            "--realm",
            "hib",
            "--search-url",
            "https://eden-daoc.net/itm/market_search.php?r=3&c=7&q=1",
        ]))
        .unwrap();
        assert_eq!(
            cfg.base_url.as_str(),
            "https://eden-daoc.net/itm/market_search.php?r=3&c=7&q=1"
        );
    }

    #[test]
    fn bad_inputs_fail_before_any_fetch() {
        assert!(matches!(
            RunConfig::from_args(&args(&["--price", "5x"])),
            Err(ConfigError::Price(_))
        ));
        assert!(matches!(
            RunConfig::from_args(&args(&["--min-utility", "90", "--max-utility", "10"])),
            Err(ConfigError::Filter(_))
        ));
        assert!(matches!(
            RunConfig::from_args(&args(&["--search-url", "not a url"])),
            Err(ConfigError::SearchUrl { .. })
        ));
    }

    #[test]
    fn session_cookies_are_always_forwarded() {
        let cfg = RunConfig::from_args(&args(&["--cookie-session", "abc"])).unwrap();
        assert_eq!(
            cfg.cookies,
            vec![
                ("eden_daoc_u".to_string(), String::new()),
                ("eden_daoc_sid".to_string(), "abc".to_string()),
            ]
        );
    }
}
