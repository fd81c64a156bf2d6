use crate::error::DbError;
use crate::store::HoldingsStore;
use async_trait::async_trait;
use core_types::{Client, ClientId, Holding, Symbol, contains_symbol, find_by_symbol};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

/// A process-local [`HoldingsStore`].
///
/// Every operation runs under a single lock, so multi-holding writes are
/// atomic. Client ids are handed out from 1.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_client_id: ClientId,
    clients: BTreeMap<ClientId, Vec<Holding>>,
}

impl State {
    fn holdings_mut(&mut self, owner: ClientId) -> Result<&mut Vec<Holding>, DbError> {
        self.clients
            .get_mut(&owner)
            .ok_or(DbError::UnknownClient(owner))
    }

    /// Checks a batch against the stored holdings and against itself.
    fn check_insertable(&self, holdings: &[Holding]) -> Result<(), DbError> {
        let mut seen = BTreeSet::new();
        for holding in holdings {
            let existing = self
                .clients
                .get(&holding.owner)
                .ok_or(DbError::UnknownClient(holding.owner))?;
            let fresh = seen.insert((holding.owner, holding.symbol_key()));
            if !fresh || contains_symbol(existing, holding.symbol_key()) {
                return Err(DbError::DuplicateHolding {
                    owner: holding.owner,
                    symbol: holding.symbol.clone(),
                });
            }
        }
        Ok(())
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HoldingsStore for InMemoryStore {
    async fn create_client(&self) -> Result<ClientId, DbError> {
        let mut state = self.state.write().await;
        state.last_client_id += 1;
        let client_id = state.last_client_id;
        state.clients.insert(client_id, Vec::new());
        Ok(client_id)
    }

    async fn create_client_with_holdings(&self, holdings: &[Holding]) -> Result<ClientId, DbError> {
        let mut state = self.state.write().await;
        let client_id = state.last_client_id + 1;
        let owned: Vec<Holding> = holdings
            .iter()
            .map(|h| Holding::new(h.symbol.clone(), h.amount, client_id))
            .collect();

        state.clients.insert(client_id, Vec::new());
        if let Err(e) = state.check_insertable(&owned) {
            state.clients.remove(&client_id);
            return Err(e);
        }
        state.clients.insert(client_id, owned);
        state.last_client_id = client_id;
        Ok(client_id)
    }

    async fn find_client(&self, client_id: ClientId) -> Result<Option<Client>, DbError> {
        let state = self.state.read().await;
        Ok(state.clients.get(&client_id).map(|holdings| Client {
            client_id,
            holdings: holdings.clone(),
        }))
    }

    async fn client_exists(&self, client_id: ClientId) -> Result<bool, DbError> {
        Ok(self.state.read().await.clients.contains_key(&client_id))
    }

    async fn find_holdings(&self, owner: ClientId) -> Result<Vec<Holding>, DbError> {
        let state = self.state.read().await;
        Ok(state.clients.get(&owner).cloned().unwrap_or_default())
    }

    async fn find_holding(
        &self,
        owner: ClientId,
        symbol: &Symbol,
    ) -> Result<Option<Holding>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .clients
            .get(&owner)
            .and_then(|holdings| find_by_symbol(holdings, symbol))
            .cloned())
    }

    async fn save_holdings(&self, holdings: &[Holding]) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        state.check_insertable(holdings)?;
        for holding in holdings {
            state.holdings_mut(holding.owner)?.push(holding.clone());
        }
        Ok(())
    }

    async fn update_holding(&self, holding: &Holding) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        let stored = state
            .holdings_mut(holding.owner)?
            .iter_mut()
            .find(|h| h.symbol_key() == holding.symbol_key())
            .ok_or(DbError::NotFound)?;
        stored.amount = holding.amount;
        Ok(())
    }

    async fn delete_holdings_by_owner(&self, owner: ClientId) -> Result<u64, DbError> {
        let mut state = self.state.write().await;
        let removed = match state.clients.get_mut(&owner) {
            Some(holdings) => std::mem::take(holdings).len() as u64,
            None => 0,
        };
        Ok(removed)
    }

    async fn delete_holding(&self, owner: ClientId, symbol: &Symbol) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        let holdings = state.holdings_mut(owner)?;
        let index = holdings
            .iter()
            .position(|h| h.symbol_key() == symbol)
            .ok_or(DbError::NotFound)?;
        holdings.remove(index);
        Ok(())
    }

    async fn replace_holdings(
        &self,
        owner: ClientId,
        holdings: &[Holding],
    ) -> Result<(), DbError> {
        let replacement: Vec<Holding> = holdings
            .iter()
            .map(|h| Holding::new(h.symbol.clone(), h.amount, owner))
            .collect();

        let mut state = self.state.write().await;
        let current = std::mem::take(state.holdings_mut(owner)?);
        if let Err(e) = state.check_insertable(&replacement) {
            *state.holdings_mut(owner)? = current;
            return Err(e);
        }
        *state.holdings_mut(owner)? = replacement;
        Ok(())
    }

    async fn all_clients(&self) -> Result<Vec<Client>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .clients
            .iter()
            .map(|(client_id, holdings)| Client {
                client_id: *client_id,
                holdings: holdings.clone(),
            })
            .collect())
    }

    async fn all_holdings(&self) -> Result<Vec<Holding>, DbError> {
        let state = self.state.read().await;
        Ok(state.clients.values().flatten().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(symbol: &str, amount: i64, owner: ClientId) -> Holding {
        Holding::new(Symbol::from(symbol), amount, owner)
    }

    #[tokio::test]
    async fn client_ids_start_at_one_and_increase() {
        let store = InMemoryStore::new();
        assert_eq!(store.create_client().await.unwrap(), 1);
        assert_eq!(store.create_client().await.unwrap(), 2);
        assert!(store.client_exists(2).await.unwrap());
        assert!(!store.client_exists(3).await.unwrap());
    }

    #[tokio::test]
    async fn saved_holdings_keep_insertion_order() {
        let store = InMemoryStore::new();
        let id = store.create_client().await.unwrap();
        store
            .save_holdings(&[holding("BBB", 1, id), holding("AAA", 2, id)])
            .await
            .unwrap();

        let symbols: Vec<_> = store
            .find_holdings(id)
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.symbol.to_string())
            .collect();
        assert_eq!(symbols, vec!["BBB", "AAA"]);
    }

    #[tokio::test]
    async fn duplicate_in_batch_saves_nothing() {
        let store = InMemoryStore::new();
        let id = store.create_client().await.unwrap();
        let err = store
            .save_holdings(&[holding("AAA", 1, id), holding("AAA", 2, id)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateHolding { owner, .. } if owner == id));
        assert!(store.find_holdings(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_holdings_takes_ownership() {
        let store = InMemoryStore::new();
        let id = store
            .create_client_with_holdings(&[holding("AAA", 3, 0), holding("BBB", 4, 0)])
            .await
            .unwrap();
        assert_eq!(id, 1);
        let held = store.find_holdings(id).await.unwrap();
        assert_eq!(held.len(), 2);
        assert!(held.iter().all(|h| h.owner == id));
    }

    #[tokio::test]
    async fn failed_create_with_holdings_leaves_no_client() {
        let store = InMemoryStore::new();
        let err = store
            .create_client_with_holdings(&[holding("AAA", 1, 0), holding("AAA", 2, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateHolding { owner: 1, .. }));
        assert!(store.all_clients().await.unwrap().is_empty());
        assert!(!store.client_exists(1).await.unwrap());
        assert_eq!(store.create_client().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_of_stored_holding_is_rejected() {
        let store = InMemoryStore::new();
        let id = store.create_client().await.unwrap();
        store.save_holdings(&[holding("AAA", 1, id)]).await.unwrap();
        let err = store
            .save_holdings(&[holding("BBB", 1, id), holding("AAA", 5, id)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateHolding { .. }));
        assert_eq!(store.find_holdings(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn saving_for_unknown_client_fails() {
        let store = InMemoryStore::new();
        let err = store.save_holdings(&[holding("AAA", 1, 9)]).await.unwrap_err();
        assert!(matches!(err, DbError::UnknownClient(9)));
    }

    #[tokio::test]
    async fn update_and_delete_single_holding() {
        let store = InMemoryStore::new();
        let id = store.create_client().await.unwrap();
        store
            .save_holdings(&[holding("AAA", 1, id), holding("BBB", 1, id)])
            .await
            .unwrap();

        store.update_holding(&holding("AAA", 7, id)).await.unwrap();
        let aaa = store.find_holding(id, &Symbol::from("AAA")).await.unwrap();
        assert_eq!(aaa.map(|h| h.amount), Some(7));

        store.delete_holding(id, &Symbol::from("BBB")).await.unwrap();
        assert!(store.find_holding(id, &Symbol::from("BBB")).await.unwrap().is_none());

        assert!(matches!(
            store.update_holding(&holding("CCC", 1, id)).await,
            Err(DbError::NotFound)
        ));
        assert!(matches!(
            store.delete_holding(id, &Symbol::from("CCC")).await,
            Err(DbError::NotFound)
        ));
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_portfolio() {
        let store = InMemoryStore::new();
        let id = store.create_client().await.unwrap();
        store
            .save_holdings(&[holding("AAA", 1, id), holding("BBB", 1, id)])
            .await
            .unwrap();

        // The owner field of the replacement is ignored.
        store
            .replace_holdings(id, &[holding("CCC", 3, 42)])
            .await
            .unwrap();
        assert_eq!(store.find_holdings(id).await.unwrap(), vec![holding("CCC", 3, id)]);
    }

    #[tokio::test]
    async fn failed_replace_keeps_the_old_portfolio() {
        let store = InMemoryStore::new();
        let id = store.create_client().await.unwrap();
        store.save_holdings(&[holding("AAA", 1, id)]).await.unwrap();

        let err = store
            .replace_holdings(id, &[holding("BBB", 1, id), holding("BBB", 2, id)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateHolding { .. }));
        assert_eq!(store.find_holdings(id).await.unwrap(), vec![holding("AAA", 1, id)]);
    }

    #[tokio::test]
    async fn listings_cover_every_client() {
        let store = InMemoryStore::new();
        let first = store.create_client().await.unwrap();
        let second = store.create_client().await.unwrap();
        store.save_holdings(&[holding("AAA", 1, second)]).await.unwrap();
        store.save_holdings(&[holding("BBB", 2, first)]).await.unwrap();

        let clients = store.all_clients().await.unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].client_id, first);
        assert!(clients[0].holdings.iter().all(|h| h.owner == first));

        let all = store.all_holdings().await.unwrap();
        assert_eq!(all, vec![holding("BBB", 2, first), holding("AAA", 1, second)]);

        assert_eq!(store.delete_holdings_by_owner(first).await.unwrap(), 1);
        assert_eq!(store.delete_holdings_by_owner(first).await.unwrap(), 0);
    }
}
