//! PostgreSQL DDL execution.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::core::identifier::quote_pg;
use crate::error::{Result, SchemaError};

/// Result of executing a DDL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Statement ran; carries the affected row count reported by the server.
    Applied(u64),
    /// The table already exists (SQLSTATE 42P07).
    AlreadyExists,
}

/// Trait for DDL targets.
#[async_trait]
pub trait DdlTarget: Send + Sync {
    /// Create a schema if it doesn't exist.
    async fn create_schema(&self, schema: &str) -> Result<()>;

    /// Execute a DDL statement.
    async fn execute_ddl(&self, ddl: &str) -> Result<ExecuteOutcome>;

    /// Check if a table exists.
    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool>;

    /// Close all connections.
    async fn close(&self);
}

/// PostgreSQL target backed by a deadpool connection pool.
pub struct PgTarget {
    pool: Pool,
    schema: String,
}

impl PgTarget {
    /// Connect to PostgreSQL and verify the connection.
    ///
    /// Unqualified statements run against `config.schema` through the
    /// session `search_path`.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = Manager::from_config(build_pg_config(config), NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(config.max_connections)
            .build()
            .map_err(|e| SchemaError::pool(e.to_string(), "creating PostgreSQL pool"))?;

        let target = Self {
            pool,
            schema: config.schema.clone(),
        };

        // Test connection
        let client = target.client("testing PostgreSQL connection").await?;
        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to PostgreSQL: {}:{}/{} (schema {})",
            config.host, config.port, config.database, config.schema
        );

        Ok(target)
    }

    /// Schema unqualified DDL is created in.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    async fn client(&self, context: &str) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| SchemaError::pool(e.to_string(), context))
    }
}

#[async_trait]
impl DdlTarget for PgTarget {
    async fn create_schema(&self, schema: &str) -> Result<()> {
        let client = self.client("creating schema").await?;

        let sql = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_pg(schema)?);
        client.execute(&sql, &[]).await?;

        debug!("Ensured schema {}", schema);
        Ok(())
    }

    async fn execute_ddl(&self, ddl: &str) -> Result<ExecuteOutcome> {
        let client = self.client("executing DDL").await?;

        match client.execute(ddl, &[]).await {
            Ok(rows) => {
                debug!("Executed DDL ({} rows affected)", rows);
                Ok(ExecuteOutcome::Applied(rows))
            }
            Err(e) if is_duplicate_table(e.code()) => {
                warn!("Table already exists: {}", e);
                Ok(ExecuteOutcome::AlreadyExists)
            }
            Err(e) => Err(SchemaError::Target(e)),
        }
    }

    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        let client = self.client("checking table existence").await?;

        let row = client
            .query_one(
                "SELECT EXISTS (
                    SELECT 1 FROM information_schema.tables
                    WHERE table_schema = $1 AND table_name = $2
                )",
                &[&schema, &table],
            )
            .await?;

        Ok(row.get(0))
    }

    async fn close(&self) {
        self.pool.close();
        debug!("PostgreSQL pool closed");
    }
}

/// Build the driver configuration for a database section.
pub fn build_pg_config(config: &DatabaseConfig) -> PgConfig {
    let mut pg_config = PgConfig::new();
    pg_config.host(&config.host);
    pg_config.port(config.port);
    pg_config.dbname(&config.database);
    pg_config.user(&config.user);
    pg_config.password(&config.password);
    pg_config.application_name("dbf-pg-schema");
    pg_config.options(&format!("-c search_path={}", config.schema));
    pg_config
}

fn is_duplicate_table(code: Option<&SqlState>) -> bool {
    code == Some(&SqlState::DUPLICATE_TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_table_detection() {
        assert!(is_duplicate_table(Some(&SqlState::DUPLICATE_TABLE)));
        assert!(!is_duplicate_table(Some(&SqlState::SYNTAX_ERROR)));
        assert!(!is_duplicate_table(None));
    }

    #[test]
    fn test_build_pg_config() {
        let config = DatabaseConfig {
            host: "db.internal".to_string(),
            port: 6543,
            database: "legacy".to_string(),
            user: "loader".to_string(),
            password: "pw".to_string(),
            schema: "staging".to_string(),
            max_connections: 2,
        };

        let pg = build_pg_config(&config);
        assert_eq!(pg.get_ports(), &[6543]);
        assert_eq!(pg.get_dbname(), Some("legacy"));
        assert_eq!(pg.get_user(), Some("loader"));
        assert_eq!(pg.get_password(), Some(&b"pw"[..]));
        assert_eq!(pg.get_options(), Some("-c search_path=staging"));
    }

    #[tokio::test]
    async fn test_pool_error_when_server_unreachable() {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DatabaseConfig::default()
        };

        match PgTarget::new(&config).await {
            Err(e) => assert_eq!(e.exit_code(), crate::error::EXIT_TARGET_ERROR),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
