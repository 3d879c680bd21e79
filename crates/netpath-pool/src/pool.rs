//! Alias-keyed connection registry.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::PoolError;

/// Opens clients for a connection pool.
///
/// Implementations own the driver: they dial, verify connectivity and
/// return a cheaply clonable client handle.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Settings needed to open a client.
    type Config: Clone + Send + Sync + 'static;

    /// Shared client handle.
    type Client: Clone + Send + Sync + 'static;

    /// Opens a client for `alias`.
    async fn connect(&self, alias: &str, config: &Self::Config) -> Result<Self::Client, PoolError>;
}

/// Named clients, each connected at most once.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use netpath_pool::{ConnectionPool, Connector, PoolError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Connector for Echo {
///     type Config = String;
///     type Client = String;
///
///     async fn connect(&self, alias: &str, config: &String) -> Result<String, PoolError> {
///         Ok(format!("{alias}@{config}"))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let pool = ConnectionPool::new(Echo);
/// pool.add_config("main", "localhost".to_string());
/// pool.connect("main").await?;
/// assert_eq!(pool.get("main").await?, "main@localhost");
/// # Ok::<(), PoolError>(())
/// # }).unwrap();
/// ```
pub struct ConnectionPool<C: Connector> {
    connector: C,
    configs: RwLock<HashMap<String, C::Config>>,
    clients: tokio::sync::RwLock<HashMap<String, C::Client>>,
}

impl<C: Connector> ConnectionPool<C> {
    /// Creates an empty pool.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            configs: RwLock::new(HashMap::new()),
            clients: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    /// Registers the settings for `alias`, replacing earlier ones.
    ///
    /// An alias that is already connected keeps its client.
    pub fn add_config(&self, alias: impl Into<String>, config: C::Config) {
        self.configs.write().insert(alias.into(), config);
    }

    /// Connects `alias` using its registered settings.
    ///
    /// Connecting an alias twice returns the existing client. The write lock
    /// is held while dialing, so concurrent callers never dial twice.
    pub async fn connect(&self, alias: &str) -> Result<C::Client, PoolError> {
        let mut clients = self.clients.write().await;
        if let Some(client) = clients.get(alias) {
            return Ok(client.clone());
        }

        let config = self
            .configs
            .read()
            .get(alias)
            .cloned()
            .ok_or_else(|| PoolError::UnknownAlias(alias.to_owned()))?;

        let client = self.connector.connect(alias, &config).await?;
        tracing::info!(alias, "connection established");
        clients.insert(alias.to_owned(), client.clone());
        Ok(client)
    }

    /// Registers `config` under `alias` and connects it.
    pub async fn connect_with(
        &self,
        alias: &str,
        config: C::Config,
    ) -> Result<C::Client, PoolError> {
        self.add_config(alias, config);
        self.connect(alias).await
    }

    /// Returns the client for a connected alias.
    pub async fn get(&self, alias: &str) -> Result<C::Client, PoolError> {
        self.clients
            .read()
            .await
            .get(alias)
            .cloned()
            .ok_or_else(|| PoolError::NotConnected(alias.to_owned()))
    }

    /// Connected aliases, sorted.
    pub async fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<_> = self.clients.read().await.keys().cloned().collect();
        aliases.sort_unstable();
        aliases
    }

    /// The connector used to open clients.
    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: Connector> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut configured: Vec<_> = self.configs.read().keys().cloned().collect();
        configured.sort_unstable();
        f.debug_struct("ConnectionPool")
            .field("configured", &configured)
            .finish_non_exhaustive()
    }
}
