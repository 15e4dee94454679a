use std::{collections::HashMap, time::Duration};

use qdrant_client::qdrant::{Query, QueryPointsBuilder, ScoredPoint, Value, value::Kind};

use crate::{Result, models::OpinionHit};

pub const CASE_ID_KEY: &str = "case_id";
pub const AUTHOR_KEY: &str = "author";
pub const SECTION_KEY: &str = "section";
pub const TEXT_KEY: &str = "text";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_name: Option<String>,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &juris_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url)
			.api_key(cfg.api_key.clone())
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_name: cfg.vector_name.clone(),
			vector_dim: cfg.vector_dim,
		})
	}

	/// Nearest-neighbor search over opinion chunks, most similar first.
	pub async fn search_opinions(&self, vector: Vec<f32>, limit: u64) -> Result<Vec<OpinionHit>> {
		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.with_payload(true)
			.limit(limit);

		if let Some(name) = self.vector_name.as_deref() {
			search = search.using(name);
		}

		let response = self.client.query(search).await?;

		Ok(response.result.into_iter().map(opinion_hit).collect())
	}
}

fn opinion_hit(point: ScoredPoint) -> OpinionHit {
	let payload = &point.payload;

	OpinionHit {
		case_id: payload_case_id(payload),
		author: payload_string(payload, AUTHOR_KEY),
		section: payload_string(payload, SECTION_KEY),
		text: payload_string(payload, TEXT_KEY).unwrap_or_default(),
		score: point.score,
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}

// Case identifiers were ingested as strings, but older collections carry numeric ids.
fn payload_case_id(payload: &HashMap<String, Value>) -> Option<String> {
	let value = payload.get(CASE_ID_KEY)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		Some(Kind::IntegerValue(id)) => Some(id.to_string()),
		// JSON loaders may widen integer ids to doubles.
		Some(Kind::DoubleValue(id)) if id.is_finite() && id.fract() == 0.0 =>
			Some((*id as i64).to_string()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn point(payload: HashMap<String, Value>, score: f32) -> ScoredPoint {
		ScoredPoint { payload, score, ..Default::default() }
	}

	#[test]
	fn decodes_full_payload() {
		let payload = HashMap::from([
			(CASE_ID_KEY.to_string(), Value::from("c1")),
			(AUTHOR_KEY.to_string(), Value::from("Justice Holmes")),
			(SECTION_KEY.to_string(), Value::from("majority")),
			(TEXT_KEY.to_string(), Value::from("The life of the law has not been logic.")),
		]);
		let hit = opinion_hit(point(payload, 0.87));

		assert_eq!(hit.case_id.as_deref(), Some("c1"));
		assert_eq!(hit.author.as_deref(), Some("Justice Holmes"));
		assert_eq!(hit.section.as_deref(), Some("majority"));
		assert_eq!(hit.text, "The life of the law has not been logic.");
		assert_eq!(hit.score, 0.87);
	}

	#[test]
	fn stringifies_integer_case_ids() {
		let payload = HashMap::from([(CASE_ID_KEY.to_string(), Value::from(4_217_i64))]);
		let hit = opinion_hit(point(payload, 0.5));

		assert_eq!(hit.case_id.as_deref(), Some("4217"));
	}

	#[test]
	fn stringifies_whole_double_case_ids() {
		let whole = HashMap::from([(CASE_ID_KEY.to_string(), Value::from(42.0_f64))]);
		let fractional = HashMap::from([(CASE_ID_KEY.to_string(), Value::from(42.5_f64))]);

		assert_eq!(opinion_hit(point(whole, 0.5)).case_id.as_deref(), Some("42"));
		assert_eq!(opinion_hit(point(fractional, 0.5)).case_id, None);
	}

	#[test]
	fn missing_fields_decode_as_absent() {
		let payload = HashMap::from([(AUTHOR_KEY.to_string(), Value::from(true))]);
		let hit = opinion_hit(point(payload, 0.1));

		assert_eq!(hit.case_id, None);
		assert_eq!(hit.author, None);
		assert_eq!(hit.section, None);
		assert_eq!(hit.text, "");
	}
}
