use crate::error::DbError;
use async_trait::async_trait;
use core_types::{Client, ClientId, Holding, Symbol};

/// Persistence of clients and their holdings.
///
/// A client holds at most one position per symbol. Writers report that
/// conflict as [`DbError::DuplicateHolding`] and a missing owner as
/// [`DbError::UnknownClient`].
#[async_trait]
pub trait HoldingsStore: Send + Sync {
    /// Creates a client with no holdings and returns its generated id.
    async fn create_client(&self) -> Result<ClientId, DbError>;

    /// Creates a client that owns `holdings` and returns its generated id.
    ///
    /// Either the client and all of its holdings are stored, or nothing is.
    /// The stored holdings are owned by the new client whatever their `owner`
    /// field says.
    async fn create_client_with_holdings(&self, holdings: &[Holding]) -> Result<ClientId, DbError>;

    async fn find_client(&self, client_id: ClientId) -> Result<Option<Client>, DbError>;

    async fn client_exists(&self, client_id: ClientId) -> Result<bool, DbError>;

    /// All holdings of `owner`, in the order they were first stored.
    async fn find_holdings(&self, owner: ClientId) -> Result<Vec<Holding>, DbError>;

    async fn find_holding(
        &self,
        owner: ClientId,
        symbol: &Symbol,
    ) -> Result<Option<Holding>, DbError>;

    /// Inserts every holding or none of them.
    async fn save_holdings(&self, holdings: &[Holding]) -> Result<(), DbError>;

    /// Overwrites the amount of an existing `(owner, symbol)` holding.
    async fn update_holding(&self, holding: &Holding) -> Result<(), DbError>;

    /// Removes every holding of `owner`, returning how many were removed.
    async fn delete_holdings_by_owner(&self, owner: ClientId) -> Result<u64, DbError>;

    async fn delete_holding(&self, owner: ClientId, symbol: &Symbol) -> Result<(), DbError>;

    /// Atomically swaps the whole portfolio of `owner` for `holdings`.
    ///
    /// The stored holdings are owned by `owner` whatever their `owner` field says.
    async fn replace_holdings(&self, owner: ClientId, holdings: &[Holding])
    -> Result<(), DbError>;

    /// Every client with its holdings, ordered by id.
    async fn all_clients(&self) -> Result<Vec<Client>, DbError>;

    /// Every stored holding, grouped by owner.
    async fn all_holdings(&self) -> Result<Vec<Holding>, DbError>;
}
