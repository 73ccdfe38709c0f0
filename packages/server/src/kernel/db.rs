use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::common::{Error, RetryPolicy};
use crate::config::DatabaseConfig;

/// Produces scoped database connections from static configuration.
///
/// Connections are deliberately not pooled: each logical operation (a batch
/// save, an artifact transaction, a listing query) opens its own connection,
/// uses it within one scope, and drops it on every exit path. Transactions
/// taken on these connections roll back on drop unless committed.
pub struct ConnectionProvider {
    config: DatabaseConfig,
}

impl ConnectionProvider {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .database(&self.config.database)
            .username(&self.config.user)
            .password(&self.config.password)
    }

    /// Open a single connection. Used by read paths, which surface
    /// connection failures immediately.
    pub async fn open(&self) -> Result<PgConnection, Error> {
        PgConnection::connect_with(&self.connect_options())
            .await
            .map_err(Error::Connection)
    }

    /// Open a connection with bounded retry. Used by write paths that
    /// must not silently lose data on a transient network failure.
    pub async fn open_with_retry(&self, policy: &RetryPolicy) -> Result<PgConnection, Error> {
        policy.run(|| self.open()).await
    }
}
