use std::sync::Arc;
use std::time::Duration;

use crate::errors::TwicketsError;
use crate::feed::models::{DEFAULT_PAGE_SIZE, FEED_URL};
use crate::flaresolverr::{FlareSolverr, FlareSolverrTransport};
use crate::transport::{ReqwestTransport, Transport};


const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);


/// Settings for a [`TwicketsClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalogue feed endpoint. Override for testing.
    pub base_url: String,
    /// Entries requested per feed page.
    pub page_size: u32,
    /// Per-request timeout. Also sent to FlareSolverr as its `maxTimeout`.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: FEED_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}


/// Main client for the Twickets catalogue feed.
///
/// # Available Methods
///
/// - [`fetch_ticket_listings`](TwicketsClient::fetch_ticket_listings) - Bounded multi-page fetch
/// - [`fetch_feed_page`](TwicketsClient::fetch_feed_page) - A single page by explicit feed URL
///
/// The client is cheap to clone and safe to use from concurrent tasks; every
/// fetch is independent and only the transport is shared.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use twickets_rs::TwicketsClient;
/// use twickets_rs::feed::models::FetchTicketListingsInput;
/// use twickets_rs::location::Country;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TwicketsClient::new("my_api_key")?
///     .with_flaresolverr("http://localhost:8191")?;
///
/// let listings = client
///     .fetch_ticket_listings(
///         &CancellationToken::new(),
///         &FetchTicketListingsInput::new(Country::UnitedKingdom),
///     )
///     .await?;
/// println!("Fetched {} listings", listings.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TwicketsClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) api_key: String,
    pub(crate) config: ClientConfig,
}


impl TwicketsClient {
    /// Create a new TwicketsClient with the default feed endpoint
    pub fn new(api_key: impl Into<String>) -> Result<TwicketsClient, TwicketsError> {
        Self::new_with_config(api_key, ClientConfig::default())
    }


    /// Create a new TwicketsClient with custom settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<TwicketsClient, TwicketsError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(api_key, config, transport)
    }


    /// Create a client on top of any transport
    /// Useful for testing or custom request pipelines
    pub fn with_transport(
        api_key: impl Into<String>,
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<TwicketsClient, TwicketsError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(TwicketsError::InvalidInput("api key must be set".to_string()));
        }
        Ok(TwicketsClient {
            transport: Arc::new(transport),
            api_key,
            config,
        })
    }


    /// Route all requests through a FlareSolverr instance
    pub fn with_flaresolverr(self, flaresolverr_url: &str) -> Result<TwicketsClient, TwicketsError> {
        let solver = FlareSolverr::new(flaresolverr_url, self.config.timeout)?;
        Ok(TwicketsClient {
            transport: Arc::new(FlareSolverrTransport::new(self.transport, solver)),
            api_key: self.api_key,
            config: self.config,
        })
    }


    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
