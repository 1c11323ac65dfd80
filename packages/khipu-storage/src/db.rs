use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Result, schema};

/// Dialect of the relational engine behind the session. Query execution
/// runs on Postgres, but the order and filter compilers are parameterised
/// on this so their output stays correct for engines with different NULL
/// ordering and case-insensitive matching rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
	Postgres,
	Mysql,
	Sqlite,
}
impl Dialect {
	/// Whether the engine supports an explicit NULLS LAST clause.
	pub fn supports_null_placement(&self) -> bool {
		!matches!(self, Self::Mysql)
	}

	pub fn quote(&self, identifier: &str) -> String {
		match self {
			Self::Mysql => format!("`{identifier}`"),
			Self::Postgres | Self::Sqlite => format!("\"{identifier}\""),
		}
	}
}

#[derive(Clone)]
pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &khipu_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub fn dialect(&self) -> Dialect {
		Dialect::Postgres
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 6_849_112;
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

		Ok(())
	}
}
