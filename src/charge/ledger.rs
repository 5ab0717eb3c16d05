//! Balance storage for the charge service.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Key under which the account balance is stored.
pub const BALANCE_KEY: &str = "account1/balance";

/// Balance restored by a reset.
pub const DEFAULT_BALANCE: i64 = 100;

/// Ledger backend error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerError {
    /// Error message.
    pub message: String,
}

impl LedgerError {
    /// Create a new LedgerError.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ledger error: {}", self.message)
    }
}

impl std::error::Error for LedgerError {}

impl From<redis::RedisError> for LedgerError {
    fn from(err: redis::RedisError) -> Self {
        LedgerError::new(err.to_string())
    }
}

impl From<tokio::task::JoinError> for LedgerError {
    fn from(err: tokio::task::JoinError) -> Self {
        LedgerError::new(err.to_string())
    }
}

/// Storage for a single account balance.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current balance. A balance that was never set reads as 0.
    async fn balance(&self) -> Result<i64, LedgerError>;

    /// Deduct `amount` and return the new balance.
    async fn charge(&self, amount: i64) -> Result<i64, LedgerError>;

    /// Overwrite the balance.
    async fn reset(&self, balance: i64) -> Result<(), LedgerError>;
}

/// In-process ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    balance: Mutex<Option<i64>>,
}

impl MemoryLedger {
    /// Create an empty ledger; its balance reads as 0 until reset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger holding `balance`.
    pub fn with_balance(balance: i64) -> Self {
        Self {
            balance: Mutex::new(Some(balance)),
        }
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn balance(&self) -> Result<i64, LedgerError> {
        Ok(self.balance.lock().await.unwrap_or(0))
    }

    async fn charge(&self, amount: i64) -> Result<i64, LedgerError> {
        let mut balance = self.balance.lock().await;
        let remaining = balance
            .unwrap_or(0)
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::new("balance overflow"))?;
        *balance = Some(remaining);
        Ok(remaining)
    }

    async fn reset(&self, balance: i64) -> Result<(), LedgerError> {
        *self.balance.lock().await = Some(balance);
        Ok(())
    }
}

/// Redis-backed ledger. Each operation opens a blocking connection on the
/// blocking thread pool and drops it when done.
#[derive(Debug, Clone)]
pub struct RedisLedger {
    client: redis::Client,
    key: String,
}

impl RedisLedger {
    /// Create a ledger for the redis server at `url`, using [`BALANCE_KEY`].
    pub fn open(url: &str) -> Result<Self, LedgerError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            key: BALANCE_KEY.to_string(),
        })
    }

    async fn with_connection<F, T>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut redis::Connection, &str) -> redis::RedisResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.client.clone();
        let key = self.key.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = client.get_connection()?;
            f(&mut conn, &key)
        })
        .await?;
        Ok(result?)
    }
}

#[async_trait]
impl Ledger for RedisLedger {
    async fn balance(&self) -> Result<i64, LedgerError> {
        use redis::Commands;
        let balance: Option<i64> = self
            .with_connection(|conn, key| conn.get(key))
            .await?;
        debug!("Read balance {:?} from redis key {}", balance, self.key);
        Ok(balance.unwrap_or(0))
    }

    async fn charge(&self, amount: i64) -> Result<i64, LedgerError> {
        use redis::Commands;
        self.with_connection(move |conn, key| conn.decr(key, amount))
            .await
    }

    async fn reset(&self, balance: i64) -> Result<(), LedgerError> {
        use redis::Commands;
        self.with_connection(move |conn, key| conn.set(key, balance))
            .await
    }
}
