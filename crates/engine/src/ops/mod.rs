use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, MutexGuard};

use crate::{Domain, EngineError, ResultEngine};

mod balances;
mod categories;
mod entries;
mod ledger;
mod reports;

pub use ledger::RecordPage;

/// Default bound on how long a writer waits for its domain.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger engine shared by every fund domain.
///
/// Balances are never cached: each read folds the committed records inside a
/// DB transaction. Writes to a domain are serialized by that domain's lock,
/// which spans the balance check, the transaction-number allocation and the
/// insert.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    locks: [Mutex<()>; 3],
    lock_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Waits for exclusive write access to `domain`.
    async fn lock_domain(&self, domain: Domain) -> ResultEngine<MutexGuard<'_, ()>> {
        let lock = &self.locks[domain.index()];
        tokio::time::timeout(self.lock_timeout, lock.lock())
            .await
            .map_err(|_| {
                tracing::warn!(%domain, "timed out waiting for domain write lock");
                EngineError::ConcurrencyConflict(format!(
                    "{domain} ledger is busy, try again"
                ))
            })
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    lock_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How long a write waits for a competing writer of the same domain
    /// before failing with [`EngineError::ConcurrencyConflict`].
    pub fn lock_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            locks: std::array::from_fn(|_| Mutex::new(())),
            lock_timeout: self.lock_timeout.unwrap_or(DEFAULT_LOCK_TIMEOUT),
        })
    }
}
