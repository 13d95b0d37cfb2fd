//! Scratch Postgres databases for the `#[ignore]`d storage tests.
//!
//! `TAROT_PG_DSN` points at any database on a server with pgvector installed. Each
//! [`TestDatabase`] lives in its own `tarot_test_*` database on that server.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, PgPool,
	postgres::{PgConnectOptions, PgConnection, PgPoolOptions},
};
use uuid::Uuid;

/// Databases tried, in order, for `CREATE DATABASE` and `DROP DATABASE`.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("TAROT_PG_DSN is not a valid DSN: {err}.")))?;
		let (maintenance, mut conn) = maintenance_connection(&base).await?;
		let name = format!("tarot_test_{}", Uuid::new_v4().simple());

		sqlx::query(&format!(r#"CREATE DATABASE "{name}""#))
			.execute(&mut conn)
			.await
			.map_err(|err| Error::Message(format!("Could not create {name}: {err}.")))?;
		conn.close().await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn pool(&self, max_connections: u32) -> Result<PgPool> {
		Ok(PgPoolOptions::new().max_connections(max_connections).connect(&self.dsn).await?)
	}

	/// Whether the server can `CREATE EXTENSION vector`.
	pub async fn has_pgvector(&self) -> Result<bool> {
		let mut conn = PgConnection::connect(&self.dsn).await?;
		let available: bool = sqlx::query_scalar(
			"SELECT EXISTS (SELECT 1 FROM pg_available_extensions WHERE name = 'vector')",
		)
		.fetch_one(&mut conn)
		.await?;

		conn.close().await?;

		Ok(available)
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = std::mem::take(&mut self.name);
		let maintenance = self.maintenance.clone();
		// A panicking test still owns a live runtime, so the drop runs on a fresh one.
		let outcome = thread::spawn(move || {
			tokio::runtime::Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(err.to_string()))
				.and_then(|runtime| runtime.block_on(drop_database(&name, &maintenance)))
		})
		.join();

		match outcome {
			Ok(Err(err)) => eprintln!("Leaked test database: {err}"),
			Err(_) => eprintln!("Leaked test database: cleanup thread panicked."),
			Ok(Ok(())) => {},
		}
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("TAROT_PG_DSN").ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn maintenance_connection(
	base: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failures = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failures.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!("No maintenance database reachable ({}).", failures.join("; "))))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#))
		.execute(&mut conn)
		.await
		.map_err(|err| Error::Message(format!("Could not drop {name}: {err}.")))?;
	conn.close().await?;

	Ok(())
}
