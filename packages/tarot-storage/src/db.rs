use std::{future::Future, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Error, Result, schema};

pub struct Db {
	pub pool: PgPool,
	pub statement_timeout: Duration,
}
impl Db {
	pub async fn connect(cfg: &tarot_config::Postgres) -> Result<Self> {
		let pool = PgPoolOptions::new()
			.max_connections(cfg.pool_max_conns)
			.acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
			.connect(&cfg.dsn)
			.await?;

		Ok(Self { pool, statement_timeout: Duration::from_millis(cfg.statement_timeout_ms) })
	}

	pub async fn ensure_schema(&self, vector_dim: u32) -> Result<()> {
		let sql = schema::render_schema(vector_dim);
		let lock_id: i64 = 7_220_226;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		tracing::info!(vector_dim, "Schema is up to date.");

		Ok(())
	}

	/// Bounds a query by the configured statement timeout.
	pub async fn timed<F, T>(&self, operation: &'static str, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		match tokio::time::timeout(self.statement_timeout, fut).await {
			Ok(result) => result,
			Err(_) => Err(Error::Timeout {
				operation,
				timeout_ms: self.statement_timeout.as_millis() as u64,
			}),
		}
	}
}
