use sqlx::PgPool;
use crate::model::error::DatabaseResult;

#[derive(Debug, Clone)]
pub struct DbConnection {
    pool: PgPool, // cloning is cheap, pool is just a wrapper around Arc<>
}

impl DbConnection {
    /// Does not touch the network until the first query.
    pub fn connect(connection_str: &str) -> DatabaseResult<Self> {
        let pool = PgPool::connect_lazy(connection_str)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self, migrations: &std::path::Path) -> DatabaseResult<()> {
        let migrator = sqlx::migrate::Migrator::new(migrations).await?;
        tracing::debug!("applying migrations from {}", migrations.display());
        migrator.run(&self.pool).await?;
        Ok(())
    }
}
