use std::{fmt::Display, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
	Result,
	retry::{self, RetryPolicy, Transient},
	schema,
};

const SCHEMA_LOCK_ID: i64 = 7_841_502;

pub struct Db {
	pub pool: PgPool,
	pub retry: RetryPolicy,
}
impl Db {
	pub async fn connect(cfg: &quill_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect(&cfg.dsn).await?;

		Ok(Self { pool, retry: RetryPolicy::from_config(cfg) })
	}

	/// Builds the pool without opening a connection. Connections are established on first use.
	pub fn connect_lazy(cfg: &quill_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect_lazy(&cfg.dsn)?;

		Ok(Self { pool, retry: RetryPolicy::from_config(cfg) })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(SCHEMA_LOCK_ID).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	/// Runs an operation under this database's retry policy.
	pub async fn retrying<T, E, F, Fut>(&self, op: F) -> std::result::Result<T, E>
	where
		E: Transient + Display,
		F: FnMut() -> Fut,
		Fut: Future<Output = std::result::Result<T, E>>,
	{
		retry::with_retry(self.retry, op).await
	}
}

fn pool_options(cfg: &quill_config::Postgres) -> PgPoolOptions {
	PgPoolOptions::new().max_connections(cfg.pool_max_conns).acquire_timeout(Duration::from_secs(10))
}
