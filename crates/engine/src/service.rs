use crate::error::EngineError;
use analytics::{AnalyticsEngine, BestUnowned, Performance, Stability, Valuation};
use configuration::Config;
use core_types::{Client, ClientId, Holding, PortfolioEntry, PriceWindow, SymbolSet, contains_symbol};
use database::HoldingsStore;
use price_history::PriceHistory;
use std::sync::Arc;
use validation::{PortfolioMode, PortfolioValidator, SupportedSymbolsFile};

/// Client-facing portfolio operations.
///
/// The service holds no mutable state of its own. Prices are read from the
/// log on every call, on tokio's blocking pool, and holdings live in the
/// store, so one instance can be shared across tasks.
#[derive(Clone)]
pub struct PortfolioService {
    store: Arc<dyn HoldingsStore>,
    prices: PriceHistory,
    validator: PortfolioValidator,
    analytics: AnalyticsEngine,
    max_history_days: usize,
}

impl PortfolioService {
    pub fn new(
        store: Arc<dyn HoldingsStore>,
        prices: PriceHistory,
        validator: PortfolioValidator,
        max_history_days: usize,
    ) -> Self {
        Self {
            store,
            prices,
            validator,
            analytics: AnalyticsEngine::new(),
            max_history_days,
        }
    }

    /// Wires the service to the price log and symbol list named in `config`.
    pub fn from_config(config: &Config, store: Arc<dyn HoldingsStore>) -> Self {
        let supported = SupportedSymbolsFile::from_settings(&config.supported_symbols);
        Self::new(
            store,
            PriceHistory::from_settings(&config.price_log),
            PortfolioValidator::new(Arc::new(supported)),
            config.analytics.max_history_days,
        )
    }

    pub fn max_history_days(&self) -> usize {
        self.max_history_days
    }

    // --- Analytics ---

    /// Values a client's holdings at the most recent logged prices.
    pub async fn portfolio_value(&self, client_id: ClientId) -> Result<Valuation, EngineError> {
        let holdings = self.non_empty_holdings(client_id).await?;
        let window = self.load_window(Some(symbols_of(&holdings)), 1).await?;
        let valuation = self.analytics.valuation(&holdings, &window)?;

        tracing::info!(client_id, total = %valuation.total, "Computed portfolio value.");
        Ok(valuation)
    }

    /// The held symbol whose price rose the most over `past_days`.
    pub async fn most_performing(
        &self,
        client_id: ClientId,
        past_days: usize,
    ) -> Result<Performance, EngineError> {
        self.ensure_client(client_id).await?;
        self.ensure_window(past_days, 1)?;
        let holdings = require_holdings(client_id, self.store.find_holdings(client_id).await?)?;

        let window = self
            .load_window(Some(symbols_of(&holdings)), past_days)
            .await?;
        Ok(self.analytics.most_performing(&window, past_days)?)
    }

    /// The held symbol whose price moved the least over `past_days`.
    pub async fn most_stable(
        &self,
        client_id: ClientId,
        past_days: usize,
    ) -> Result<Stability, EngineError> {
        self.ensure_client(client_id).await?;
        self.ensure_window(past_days, 2)?;
        let holdings = require_holdings(client_id, self.store.find_holdings(client_id).await?)?;

        let window = self
            .load_window(Some(symbols_of(&holdings)), past_days)
            .await?;
        self.analytics.most_stable(&window)?.ok_or_else(|| {
            EngineError::NotFound(format!(
                "No price data found for the holdings of client id '{client_id}'"
            ))
        })
    }

    /// The highest-priced logged symbol the client does not own.
    ///
    /// `None` when the client already owns every symbol in the log.
    pub async fn best_unowned(
        &self,
        client_id: ClientId,
    ) -> Result<Option<BestUnowned>, EngineError> {
        let holdings = self.holdings_of(client_id).await?;
        let window = self.load_window(None, 1).await?;
        Ok(self.analytics.best_unowned(&window, &symbols_of(&holdings)))
    }

    // --- Portfolio management ---

    /// Creates a client owning `entries` and returns its id.
    ///
    /// The client and its holdings are stored together; a failed write leaves
    /// no client behind.
    pub async fn create_portfolio(
        &self,
        entries: &[PortfolioEntry],
    ) -> Result<ClientId, EngineError> {
        ensure_entries(entries)?;
        self.validate(entries, PortfolioMode::New)?;

        let holdings = into_holdings(entries, ClientId::default());
        let client_id = self.store.create_client_with_holdings(&holdings).await?;

        tracing::info!(client_id, holdings = holdings.len(), "Created portfolio.");
        Ok(client_id)
    }

    /// Replaces every holding of a client with `entries`.
    pub async fn replace_portfolio(
        &self,
        client_id: ClientId,
        entries: &[PortfolioEntry],
    ) -> Result<(), EngineError> {
        self.ensure_client(client_id).await?;
        ensure_entries(entries)?;
        self.validate(entries, PortfolioMode::New)?;

        let holdings = into_holdings(entries, client_id);
        self.store.replace_holdings(client_id, &holdings).await?;

        tracing::info!(client_id, holdings = holdings.len(), "Replaced portfolio.");
        Ok(())
    }

    /// Adjusts existing holdings: an amount of 0 removes the holding, any
    /// other amount overwrites it.
    ///
    /// Every entry is checked, including ownership, before anything changes.
    pub async fn update_portfolio(
        &self,
        client_id: ClientId,
        entries: &[PortfolioEntry],
    ) -> Result<(), EngineError> {
        self.ensure_client(client_id).await?;
        ensure_entries(entries)?;
        self.validate(entries, PortfolioMode::Existing)?;

        let held = self.store.find_holdings(client_id).await?;
        if let Some(unheld) = entries.iter().find(|e| !contains_symbol(&held, &e.symbol)) {
            tracing::warn!(client_id, symbol = %unheld.symbol, "Rejected update of unheld symbol.");
            return Err(EngineError::InvalidArgument(format!(
                "Client id '{client_id}' does not hold '{}'",
                unheld.symbol
            )));
        }

        for entry in entries {
            if entry.amount == 0 {
                self.store.delete_holding(client_id, &entry.symbol).await?;
                tracing::debug!(client_id, symbol = %entry.symbol, "Removed holding.");
            } else {
                let holding = Holding::new(entry.symbol.clone(), entry.amount, client_id);
                self.store.update_holding(&holding).await?;
            }
        }

        tracing::info!(client_id, entries = entries.len(), "Updated portfolio.");
        Ok(())
    }

    // --- Listings ---

    /// The holdings of one client, in the order they were stored.
    pub async fn client_holdings(&self, client_id: ClientId) -> Result<Vec<Holding>, EngineError> {
        self.holdings_of(client_id).await
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, EngineError> {
        Ok(self.store.all_clients().await?)
    }

    pub async fn list_holdings(&self) -> Result<Vec<Holding>, EngineError> {
        Ok(self.store.all_holdings().await?)
    }

    /// Scans the price log off the async worker threads.
    async fn load_window(
        &self,
        filter: Option<SymbolSet>,
        days: usize,
    ) -> Result<PriceWindow, EngineError> {
        let prices = self.prices.clone();
        let window = tokio::task::spawn_blocking(move || prices.load_window(filter.as_ref(), days))
            .await
            .map_err(|e| EngineError::infrastructure(&e))??;
        Ok(window)
    }

    // --- Checks ---

    async fn ensure_client(&self, client_id: ClientId) -> Result<(), EngineError> {
        if client_id <= 0 {
            return Err(EngineError::InvalidArgument(format!(
                "Client id '{client_id}' is not valid"
            )));
        }
        if !self.store.client_exists(client_id).await? {
            return Err(EngineError::NotFound(format!(
                "Client id '{client_id}' does not exist"
            )));
        }
        Ok(())
    }

    async fn holdings_of(&self, client_id: ClientId) -> Result<Vec<Holding>, EngineError> {
        self.ensure_client(client_id).await?;
        Ok(self.store.find_holdings(client_id).await?)
    }

    async fn non_empty_holdings(&self, client_id: ClientId) -> Result<Vec<Holding>, EngineError> {
        require_holdings(client_id, self.holdings_of(client_id).await?)
    }

    fn ensure_window(&self, past_days: usize, min_days: usize) -> Result<(), EngineError> {
        if past_days < min_days || past_days > self.max_history_days {
            return Err(EngineError::InvalidArgument(format!(
                "Past days must be between {min_days} and {}, got {past_days}",
                self.max_history_days
            )));
        }
        Ok(())
    }

    fn validate(&self, entries: &[PortfolioEntry], mode: PortfolioMode) -> Result<(), EngineError> {
        self.validator.validate(entries, mode).map_err(|e| {
            tracing::warn!(error = %e, ?mode, "Rejected portfolio entries.");
            EngineError::from(e)
        })
    }
}

impl std::fmt::Debug for PortfolioService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioService")
            .field("prices", &self.prices)
            .field("max_history_days", &self.max_history_days)
            .finish_non_exhaustive()
    }
}

fn ensure_entries(entries: &[PortfolioEntry]) -> Result<(), EngineError> {
    if entries.is_empty() {
        return Err(EngineError::InvalidArgument(
            "No holdings found in the request".to_string(),
        ));
    }
    Ok(())
}

fn require_holdings(client_id: ClientId, holdings: Vec<Holding>) -> Result<Vec<Holding>, EngineError> {
    if holdings.is_empty() {
        return Err(EngineError::NotFound(format!(
            "Client id '{client_id}' has no holdings"
        )));
    }
    Ok(holdings)
}

fn into_holdings(entries: &[PortfolioEntry], owner: ClientId) -> Vec<Holding> {
    entries
        .iter()
        .cloned()
        .map(|entry| entry.into_holding(owner))
        .collect()
}

fn symbols_of(holdings: &[Holding]) -> SymbolSet {
    holdings.iter().map(|h| h.symbol_key().clone()).collect()
}
