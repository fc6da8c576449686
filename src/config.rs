use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use twickets_rs::filter::DEFAULT_EVENT_NAME_SIMILARITY;
use twickets_rs::location::{Country, Region};

/// Watcher settings.
///
/// Defaults below are overridden by `TWICKETS_*` environment variables (a
/// `.env` file is loaded first). Only the API key has no default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,

    // Route feed requests through a FlareSolverr instance, e.g. http://localhost:8191
    pub flaresolverr_url: Option<String>,

    pub country: Country,

    // Time between polls. Each poll fetches what was listed since the last one.
    pub poll_interval: Duration,
    // Upper bound on listings fetched per poll.
    pub max_per_poll: usize,
    // How far back the first poll looks.
    pub lookback: Duration,

    // Filters. A listing is reported if its event matches any of the names
    // (or no names are set) and it passes every other set filter.
    pub event_names: Vec<String>,
    pub event_name_similarity: f64,
    pub regions: Vec<Region>,
    pub num_tickets: Option<u32>,
    pub min_discount: Option<f64>,

    // Feed request timeout, also the FlareSolverr solve timeout.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            flaresolverr_url: None,

            country: Country::UnitedKingdom,

            poll_interval: Duration::from_secs(60),
            max_per_poll: 250,
            lookback: Duration::from_secs(60 * 60),

            event_names: Vec::new(),
            event_name_similarity: DEFAULT_EVENT_NAME_SIMILARITY,
            regions: Vec::new(),
            num_tickets: None,
            min_discount: None,

            request_timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Config::default();

        cfg.api_key = get("TWICKETS_API_KEY").context("TWICKETS_API_KEY must be set")?;
        cfg.flaresolverr_url = get("FLARESOLVERR_URL");

        if let Some(country) = get("TWICKETS_COUNTRY") {
            cfg.country = country.parse()?;
        }
        if let Some(secs) = get("TWICKETS_POLL_INTERVAL_SECS") {
            cfg.poll_interval = Duration::from_secs(parse_var("TWICKETS_POLL_INTERVAL_SECS", &secs)?);
        }
        if let Some(max) = get("TWICKETS_MAX_PER_POLL") {
            cfg.max_per_poll = parse_var("TWICKETS_MAX_PER_POLL", &max)?;
        }
        if let Some(mins) = get("TWICKETS_LOOKBACK_MINS") {
            cfg.lookback = Duration::from_secs(60 * parse_var::<u64>("TWICKETS_LOOKBACK_MINS", &mins)?);
        }
        if let Some(secs) = get("TWICKETS_REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout = Duration::from_secs(parse_var("TWICKETS_REQUEST_TIMEOUT_SECS", &secs)?);
        }

        if let Some(names) = get("TWICKETS_EVENT_NAMES") {
            cfg.event_names = split_list(&names).map(str::to_string).collect();
        }
        if let Some(similarity) = get("TWICKETS_EVENT_NAME_SIMILARITY") {
            cfg.event_name_similarity = parse_var("TWICKETS_EVENT_NAME_SIMILARITY", &similarity)?;
        }
        if let Some(regions) = get("TWICKETS_REGIONS") {
            cfg.regions = split_list(&regions)
                .map(str::parse)
                .collect::<Result<_, _>>()?;
        }
        if let Some(n) = get("TWICKETS_NUM_TICKETS") {
            cfg.num_tickets = Some(parse_var("TWICKETS_NUM_TICKETS", &n)?);
        }
        if let Some(discount) = get("TWICKETS_MIN_DISCOUNT") {
            cfg.min_discount = Some(parse_var("TWICKETS_MIN_DISCOUNT", &discount)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            bail!("poll interval must be greater than zero");
        }
        if self.max_per_poll == 0 {
            bail!("max listings per poll must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.event_name_similarity) {
            bail!("event name similarity must be between 0 and 1, got {}", self.event_name_similarity);
        }
        if let Some(region) = self.regions.iter().find(|r| r.country() != self.country) {
            bail!("region {} is not in country {}", region, self.country);
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("{key} has invalid value '{value}'"))
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
