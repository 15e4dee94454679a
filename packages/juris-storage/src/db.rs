use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Result, models::CaseRecord, schema};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &juris_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 5_812_603;
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

	pub async fn fetch_case(&self, case_id: &str) -> Result<Option<CaseRecord>> {
		let record = sqlx::query_as::<_, CaseRecord>(
			"\
SELECT case_id, case_name, court, decision_date, citations, download_url
FROM cases
WHERE case_id = $1",
		)
		.bind(case_id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(record)
	}
}
