use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time;

use juris_storage::models::{CaseRecord, OpinionHit};

use crate::{Error, JurisService, Result, Stage};

pub const ASSISTANT_ROLE: &str = "assistant";
pub const OPINION_TYPE: &str = "opinion";
pub const UNKNOWN: &str = "Unknown";
pub const PREVIEW_SUFFIX: &str = "...";
pub const PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
	pub query: String,
	#[serde(default)]
	pub top_k: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
	pub role: String,
	pub content: ChatContent,
}
impl ChatResponse {
	pub fn assistant(results: Vec<OpinionResult>) -> Self {
		Self { role: ASSISTANT_ROLE.to_string(), content: ChatContent { results } }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatContent {
	pub results: Vec<OpinionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpinionResult {
	#[serde(rename = "type")]
	pub kind: String,
	pub author: Option<String>,
	pub section: Option<String>,
	pub opinion_text_preview: String,
	pub case: CaseSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
	pub name: String,
	pub court: String,
	pub decision_date: String,
	pub citations: usize,
	pub url: Option<String>,
}
impl CaseSummary {
	/// Applies the "Unknown" and zero-citation defaults. `None` means the case could not be
	/// resolved.
	pub fn from_record(record: Option<CaseRecord>) -> Self {
		let Some(record) = record else {
			return Self {
				name: UNKNOWN.to_string(),
				court: UNKNOWN.to_string(),
				decision_date: UNKNOWN.to_string(),
				citations: 0,
				url: None,
			};
		};
		let citations = record.citation_count();
		let or_unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());

		Self {
			name: or_unknown(record.case_name),
			court: or_unknown(record.court),
			decision_date: or_unknown(record.decision_date),
			citations,
			url: record.download_url,
		}
	}
}

impl JurisService {
	pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
		let results = self.retrieve(&req.query, req.top_k).await?;

		Ok(ChatResponse::assistant(results))
	}

	/// Embeds `query`, searches the opinion index once, and joins each hit with its case.
	///
	/// Only the embedding and search calls are fatal. Hits without a case reference are dropped,
	/// and a case that is missing or fails to load is rendered with default metadata. Each distinct
	/// case id is looked up once per request. Results keep the index order.
	pub async fn retrieve(&self, query: &str, top_k: Option<u32>) -> Result<Vec<OpinionResult>> {
		if query.trim().is_empty() {
			return Err(Error::InvalidInput { message: "query must be non-empty.".to_string() });
		}

		let top_k = self.resolve_top_k(top_k)?;

		tracing::info!(query, top_k, "Incoming query.");

		let vector = self.embed_query(query).await?;
		let hits = self.search_opinions(vector, top_k).await?;

		tracing::info!(hit_count = hits.len(), "Found opinion chunks.");

		let mut resolved = HashMap::<String, Option<CaseRecord>>::new();
		let mut results = Vec::with_capacity(hits.len());

		for hit in hits.into_iter().take(top_k as usize) {
			let Some(case_id) = hit.case_id.as_deref().filter(|id| !id.is_empty()) else {
				tracing::debug!("Skipping opinion chunk without case_id.");

				continue;
			};
			let case = match resolved.get(case_id) {
				Some(case) => case.clone(),
				None => {
					let case = self.lookup_case(case_id).await;

					resolved.insert(case_id.to_string(), case.clone());

					case
				},
			};

			results.push(format_result(hit, case));
		}

		tracing::info!(result_count = results.len(), "Retrieval completed.");

		Ok(results)
	}

	fn resolve_top_k(&self, requested: Option<u32>) -> Result<u32> {
		let cfg = &self.cfg.retrieval;
		let Some(top_k) = requested else {
			return Ok(cfg.top_k);
		};

		if top_k == 0 || top_k > cfg.max_top_k {
			return Err(Error::InvalidInput {
				message: format!("top_k must be between 1 and {}.", cfg.max_top_k),
			});
		}

		Ok(top_k)
	}

	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let timeout_ms = self.cfg.retrieval.embedding_timeout_ms;
		let texts = [query.to_string()];
		let call =
			self.collaborators.embedding.embed(&self.cfg.providers.embedding, texts.as_slice());
		let vectors = match time::timeout(Duration::from_millis(timeout_ms), call).await {
			Ok(Ok(vectors)) => vectors,
			Ok(Err(err)) => return Err(stage_failure(Stage::Embedding, format!("{err:#}"))),
			Err(_) =>
				return Err(stage_failure(
					Stage::Embedding,
					format!("Embedding request timed out after {timeout_ms} ms."),
				)),
		};

		match vectors.into_iter().next() {
			Some(vector) if !vector.is_empty() => Ok(vector),
			_ => Err(stage_failure(
				Stage::Embedding,
				"Embedding provider returned no vector.".to_string(),
			)),
		}
	}

	async fn search_opinions(&self, vector: Vec<f32>, top_k: u32) -> Result<Vec<OpinionHit>> {
		let timeout_ms = self.cfg.retrieval.search_timeout_ms;
		let call = self.collaborators.opinions.search(vector, top_k);

		match time::timeout(Duration::from_millis(timeout_ms), call).await {
			Ok(Ok(hits)) => Ok(hits),
			Ok(Err(err)) => Err(stage_failure(Stage::Search, format!("{err:#}"))),
			Err(_) => Err(stage_failure(
				Stage::Search,
				format!("Opinion search timed out after {timeout_ms} ms."),
			)),
		}
	}

	// A store failure only costs this hit its metadata.
	async fn lookup_case(&self, case_id: &str) -> Option<CaseRecord> {
		match self.collaborators.cases.fetch_case(case_id).await {
			Ok(Some(record)) => {
				tracing::debug!(case_id, case_name = ?record.case_name, "Resolved case.");

				Some(record)
			},
			Ok(None) => {
				tracing::debug!(case_id, "Case not found.");

				None
			},
			Err(err) => {
				tracing::warn!(
					case_id,
					error = %err,
					"Case lookup failed. Using default metadata."
				);

				None
			},
		}
	}
}

/// The first `max_chars` characters of `text`, always followed by `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
	let mut out = text.chars().take(max_chars).collect::<String>();

	out.push_str(PREVIEW_SUFFIX);

	out
}

fn format_result(hit: OpinionHit, case: Option<CaseRecord>) -> OpinionResult {
	OpinionResult {
		kind: OPINION_TYPE.to_string(),
		opinion_text_preview: preview(&hit.text, PREVIEW_CHARS),
		author: hit.author,
		section: hit.section,
		case: CaseSummary::from_record(case),
	}
}

fn stage_failure(stage: Stage, message: String) -> Error {
	tracing::error!(stage = stage.as_str(), error = %message, "Retrieval stage failed.");

	Error::RetrievalFailure { stage, message }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn preview_appends_suffix_to_short_text() {
		assert_eq!(preview("Held: affirmed.", PREVIEW_CHARS), "Held: affirmed....");
		assert_eq!(preview("", PREVIEW_CHARS), "...");
	}

	#[test]
	fn preview_truncates_on_character_boundaries() {
		let text = "é".repeat(400);
		let out = preview(&text, PREVIEW_CHARS);

		assert_eq!(out.chars().count(), 303);
		assert!(out.starts_with(&"é".repeat(300)));
		assert!(out.ends_with(PREVIEW_SUFFIX));
	}

	#[test]
	fn missing_case_defaults_every_field() {
		let summary = CaseSummary::from_record(None);

		assert_eq!(summary.name, UNKNOWN);
		assert_eq!(summary.court, UNKNOWN);
		assert_eq!(summary.decision_date, UNKNOWN);
		assert_eq!(summary.citations, 0);
		assert_eq!(summary.url, None);
	}

	#[test]
	fn partial_case_defaults_only_absent_fields() {
		let record = CaseRecord {
			case_id: "c9".to_string(),
			court: Some("Supreme Court of the United States".to_string()),
			..Default::default()
		};
		let summary = CaseSummary::from_record(Some(record));

		assert_eq!(summary.name, UNKNOWN);
		assert_eq!(summary.court, "Supreme Court of the United States");
		assert_eq!(summary.decision_date, UNKNOWN);
		assert_eq!(summary.citations, 0);
	}

	#[test]
	fn result_serializes_with_wire_field_names() {
		let hit = OpinionHit {
			case_id: Some("c1".to_string()),
			author: None,
			section: Some("dissent".to_string()),
			text: "Text".to_string(),
			score: 0.3,
		};
		let json = serde_json::to_value(format_result(hit, None)).expect("serialize failed");

		assert_eq!(json["type"], "opinion");
		assert_eq!(json["author"], serde_json::Value::Null);
		assert_eq!(json["section"], "dissent");
		assert_eq!(json["opinion_text_preview"], "Text...");
		assert_eq!(json["case"]["name"], "Unknown");
		assert_eq!(json["case"]["citations"], 0);
		assert_eq!(json["case"]["url"], serde_json::Value::Null);
	}
}
