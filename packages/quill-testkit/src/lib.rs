//! Throwaway Postgres databases for integration tests.
//!
//! Every [`TestDatabase`] is a fresh database created next to the one named by `QUILL_PG_DSN`.
//! It is dropped on [`TestDatabase::cleanup`] or, as a fallback, when the value goes out of scope.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const DSN_ENV: &str = "QUILL_PG_DSN";

/// Maintenance databases tried, in order, for `CREATE DATABASE` and `DROP DATABASE`.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

pub struct TestDatabase {
	name: String,
	dsn: String,
	// Taken once the database has been dropped.
	maintenance: Option<PgConnectOptions>,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("{DSN_ENV} is not a valid DSN: {err}.")))?;
		let (maintenance, mut conn) = open_maintenance(&base).await?;
		let name = format!("quill_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await.map_err(|err| {
			Error::Message(format!("Could not create test database {name}: {err}."))
		})?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance: Some(maintenance) })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database and reports failures. Prefer this over relying on `Drop`.
	pub async fn cleanup(mut self) -> Result<()> {
		match self.maintenance.take() {
			Some(maintenance) => drop_database(&self.name, &maintenance).await,
			None => Ok(()),
		}
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		let Some(maintenance) = self.maintenance.take() else {
			return;
		};
		let name = std::mem::take(&mut self.name);
		// The test runtime may be shutting down, so cleanup gets a runtime of its own.
		let handle = thread::spawn(move || {
			let outcome = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(err.to_string()))
				.and_then(|runtime| runtime.block_on(drop_database(&name, &maintenance)));

			if let Err(err) = outcome {
				eprintln!("Leaked test database {name}: {err}");
			}
		});

		let _ = handle.join();
	}
}

/// The base DSN for database-backed tests, if one is configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn open_maintenance(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
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

	// Pools from the test may still hold connections.
	sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.execute(&mut conn)
	.await?;
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str()).await?;

	Ok(())
}
