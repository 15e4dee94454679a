//! Disposable Postgres databases and Qdrant collections for ignored integration tests.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, time::Duration};

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder, VectorParamsBuilder,
	},
};
use serde_json::Value;
use sqlx::{
	ConnectOptions, Connection, Executor, PgPool,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::time;
use uuid::Uuid;

const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];
const QDRANT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestDatabase {
	name: String,
	dsn: String,
	admin_options: PgConnectOptions,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base_options = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse JURIS_PG_DSN: {err}.")))?;
		let (admin_options, mut admin_conn) = connect_admin(&base_options).await?;
		let name = format!("juris_test_{}", Uuid::new_v4().simple());

		admin_conn
			.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to create test database: {err}.")))?;

		let dsn = base_options.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin_options })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database. Callers must close their pools first.
	pub async fn cleanup(self) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.admin_options).await.map_err(|err| {
			Error::Message(format!("Failed to connect to admin database for cleanup: {err}."))
		})?;
		let _ = sqlx::query(
			"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
		)
		.bind(self.name.as_str())
		.fetch_all(&mut conn)
		.await;

		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}""#, self.name).as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to drop test database: {err}.")))?;

		Ok(())
	}
}

/// A uniquely named opinion collection with unnamed cosine vectors.
pub struct TestCollection {
	pub client: Qdrant,
	pub name: String,
}
impl TestCollection {
	pub async fn new(qdrant_url: &str, vector_dim: u64) -> Result<Self> {
		let client = Qdrant::from_url(qdrant_url).build()?;
		let name = format!("juris_test_opinions_{}", Uuid::new_v4().simple());
		let builder = CreateCollectionBuilder::new(name.clone())
			.vectors_config(VectorParamsBuilder::new(vector_dim, Distance::Cosine));

		time::timeout(QDRANT_TIMEOUT, client.create_collection(builder))
			.await
			.map_err(|_| Error::Message("Qdrant create_collection timed out.".to_string()))??;

		Ok(Self { client, name })
	}

	/// Upserts one opinion chunk. `payload` must be a JSON object.
	pub async fn upsert_opinion(&self, vector: Vec<f32>, payload: Value) -> Result<()> {
		let payload = Payload::try_from(payload)
			.map_err(|err| Error::Message(format!("Opinion payload must be an object: {err}.")))?;
		let point = PointStruct::new(Uuid::new_v4().to_string(), vector, payload);

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.name.clone(), vec![point]).wait(true))
			.await?;

		Ok(())
	}

	pub async fn cleanup(self) -> Result<()> {
		time::timeout(QDRANT_TIMEOUT, self.client.delete_collection(self.name.clone()))
			.await
			.map_err(|_| {
				Error::Message(format!("Timed out deleting Qdrant collection {:?}.", self.name))
			})??;

		Ok(())
	}
}

pub struct CaseFixture<'a> {
	pub case_id: &'a str,
	pub case_name: Option<&'a str>,
	pub court: Option<&'a str>,
	pub decision_date: Option<&'a str>,
	pub citations: Option<Value>,
	pub download_url: Option<&'a str>,
}

pub async fn insert_case(pool: &PgPool, case: CaseFixture<'_>) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO cases (case_id, case_name, court, decision_date, citations, download_url)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(case.case_id)
	.bind(case.case_name)
	.bind(case.court)
	.bind(case.decision_date)
	.bind(case.citations)
	.bind(case.download_url)
	.execute(pool)
	.await?;

	Ok(())
}

pub fn env_dsn() -> Option<String> {
	env::var("JURIS_PG_DSN").ok()
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("JURIS_QDRANT_URL").ok()
}

async fn connect_admin(
	base_options: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last_err = None;

	for database in ADMIN_DATABASES {
		let options = base_options.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => {
				last_err = Some(err);
			},
		}
	}

	Err(Error::Message(format!("Failed to connect to an admin database: {last_err:?}.")))
}
