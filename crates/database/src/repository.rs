use crate::DbError;
use crate::store::HoldingsStore;
use async_trait::async_trait;
use core_types::{Client, ClientId, Holding, Symbol};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{FromRow, Transaction};
use std::collections::BTreeMap;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A row from the `holdings` table.
#[derive(FromRow, Debug, Clone)]
pub struct DbHolding {
    pub client_id: i64,
    pub symbol: String,
    pub amount: i64,
}

impl From<DbHolding> for Holding {
    fn from(row: DbHolding) -> Self {
        Holding::new(Symbol::new(row.symbol), row.amount, row.client_id)
    }
}

/// Maps constraint violations on `holdings` to the store's error vocabulary.
fn classify_write_error(err: sqlx::Error, holding: &Holding) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DbError::DuplicateHolding {
                owner: holding.owner,
                symbol: holding.symbol.clone(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return DbError::UnknownClient(holding.owner);
        }
    }
    err.into()
}

/// Inserts `holdings` inside an open transaction.
async fn insert_holdings(
    tx: &mut Transaction<'_, Postgres>,
    holdings: &[Holding],
) -> Result<(), DbError> {
    for holding in holdings {
        sqlx::query("INSERT INTO holdings (client_id, symbol, amount) VALUES ($1, $2, $3)")
            .bind(holding.owner)
            .bind(holding.symbol.as_str())
            .bind(holding.amount)
            .execute(&mut **tx) // Note: must use the transaction here
            .await
            .map_err(|e| classify_write_error(e, holding))?;
    }
    Ok(())
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HoldingsStore for DbRepository {
    async fn create_client(&self) -> Result<ClientId, DbError> {
        let client_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO clients DEFAULT VALUES RETURNING client_id",
        )
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(client_id, "Created client.");
        Ok(client_id)
    }

    async fn create_client_with_holdings(&self, holdings: &[Holding]) -> Result<ClientId, DbError> {
        let mut tx = self.pool.begin().await?;

        let client_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO clients DEFAULT VALUES RETURNING client_id",
        )
        .fetch_one(&mut *tx)
        .await?;
        let owned: Vec<Holding> = holdings
            .iter()
            .map(|h| Holding::new(h.symbol.clone(), h.amount, client_id))
            .collect();
        // Dropping `tx` on error rolls the client back too.
        insert_holdings(&mut tx, &owned).await?;

        tx.commit().await?;
        tracing::info!(client_id, holdings = owned.len(), "Created client with holdings.");
        Ok(client_id)
    }

    async fn find_client(&self, client_id: ClientId) -> Result<Option<Client>, DbError> {
        if !self.client_exists(client_id).await? {
            return Ok(None);
        }
        let holdings = self.find_holdings(client_id).await?;
        Ok(Some(Client { client_id, holdings }))
    }

    async fn client_exists(&self, client_id: ClientId) -> Result<bool, DbError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM clients WHERE client_id = $1)",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_holdings(&self, owner: ClientId) -> Result<Vec<Holding>, DbError> {
        let rows = sqlx::query_as::<_, DbHolding>(
            r#"
            SELECT client_id, symbol, amount
            FROM holdings
            WHERE client_id = $1
            ORDER BY holding_id ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Holding::from).collect())
    }

    async fn find_holding(
        &self,
        owner: ClientId,
        symbol: &Symbol,
    ) -> Result<Option<Holding>, DbError> {
        let row = sqlx::query_as::<_, DbHolding>(
            "SELECT client_id, symbol, amount FROM holdings WHERE client_id = $1 AND symbol = $2",
        )
        .bind(owner)
        .bind(symbol.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Holding::from))
    }

    /// Saves a batch of holdings within a single transaction for atomicity.
    async fn save_holdings(&self, holdings: &[Holding]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        insert_holdings(&mut tx, holdings).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_holding(&self, holding: &Holding) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE holdings SET amount = $3 WHERE client_id = $1 AND symbol = $2",
        )
        .bind(holding.owner)
        .bind(holding.symbol.as_str())
        .bind(holding.amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn delete_holdings_by_owner(&self, owner: ClientId) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM holdings WHERE client_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_holding(&self, owner: ClientId, symbol: &Symbol) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM holdings WHERE client_id = $1 AND symbol = $2")
            .bind(owner)
            .bind(symbol.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Deletes and re-inserts the portfolio in one transaction; any failure
    /// rolls back to the previous holdings.
    async fn replace_holdings(
        &self,
        owner: ClientId,
        holdings: &[Holding],
    ) -> Result<(), DbError> {
        let mut tx: Transaction<Postgres> = self.pool.begin().await?;

        // Lock the client row so concurrent replaces serialize.
        let locked = sqlx::query_scalar::<_, i64>(
            "SELECT client_id FROM clients WHERE client_id = $1 FOR UPDATE",
        )
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(DbError::UnknownClient(owner));
        }

        sqlx::query("DELETE FROM holdings WHERE client_id = $1")
            .bind(owner)
            .execute(&mut *tx)
            .await?;
        let owned: Vec<Holding> = holdings
            .iter()
            .map(|h| Holding::new(h.symbol.clone(), h.amount, owner))
            .collect();
        insert_holdings(&mut tx, &owned).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn all_clients(&self) -> Result<Vec<Client>, DbError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT client_id FROM clients ORDER BY client_id")
            .fetch_all(&self.pool)
            .await?;

        let mut clients: BTreeMap<ClientId, Client> =
            ids.into_iter().map(|id| (id, Client::new(id))).collect();
        for holding in self.all_holdings().await? {
            if let Some(client) = clients.get_mut(&holding.owner) {
                client.holdings.push(holding);
            }
        }
        Ok(clients.into_values().collect())
    }

    async fn all_holdings(&self) -> Result<Vec<Holding>, DbError> {
        let rows = sqlx::query_as::<_, DbHolding>(
            "SELECT client_id, symbol, amount FROM holdings ORDER BY client_id, holding_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Holding::from).collect())
    }
}
