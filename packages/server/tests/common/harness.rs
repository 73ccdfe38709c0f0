//! Test harness with testcontainers for integration testing.
//!
//! A single Postgres container is shared across all tests; each test gets
//! its own freshly created database, so the schema guard's self-healing is
//! exercised on every write path.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::Executor;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use server_core::common::RetryPolicy;
use server_core::config::DatabaseConfig;
use server_core::domains::artifacts::ArtifactStore;
use server_core::domains::jobs::JobStore;
use server_core::kernel::ConnectionProvider;

/// Shared container, started once and reused by every test.
struct SharedPg {
    host: String,
    port: u16,
    _container: ContainerAsync<Postgres>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

impl SharedPg {
    async fn init() -> Result<Self> {
        // Respect RUST_LOG when tests are run with --nocapture.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?.to_string();
        let port = postgres.get_host_port_ipv4(5432).await?;

        Ok(Self {
            host,
            port,
            _container: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_PG
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared Postgres container")
            })
            .await
    }
}

/// Per-test context: a connection provider pointing at a fresh database.
///
/// No schema is created here on purpose - the stores are expected to heal
/// it themselves.
pub struct TestDb {
    pub provider: Arc<ConnectionProvider>,
}

impl AsyncTestContext for TestDb {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test database")
    }

    async fn teardown(self) {
        // The database is left behind in the throwaway container.
    }
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let infra = SharedPg::get().await;

        let admin = DatabaseConfig {
            host: infra.host.clone(),
            port: infra.port,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
        };

        let db_name = format!("test_{}", Uuid::new_v4().simple());
        let mut conn = ConnectionProvider::new(admin.clone())
            .open()
            .await
            .context("Failed to connect to admin database")?;
        conn.execute(format!(r#"CREATE DATABASE "{db_name}""#).as_str())
            .await
            .context("Failed to create test database")?;

        let config = DatabaseConfig {
            database: db_name,
            ..admin
        };

        Ok(Self {
            provider: Arc::new(ConnectionProvider::new(config)),
        })
    }

    pub fn job_store(&self) -> JobStore {
        JobStore::new(self.provider.clone(), RetryPolicy::none())
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(self.provider.clone(), RetryPolicy::none())
    }
}
