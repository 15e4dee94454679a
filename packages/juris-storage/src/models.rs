use serde_json::Value;

/// One opinion chunk returned by the vector index, in index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpinionHit {
	pub case_id: Option<String>,
	pub author: Option<String>,
	pub section: Option<String>,
	pub text: String,
	pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct CaseRecord {
	pub case_id: String,
	pub case_name: Option<String>,
	pub court: Option<String>,
	pub decision_date: Option<String>,
	pub citations: Option<Value>,
	pub download_url: Option<String>,
}
impl CaseRecord {
	/// Number of citation entries. Anything other than a JSON array counts as none.
	pub fn citation_count(&self) -> usize {
		match &self.citations {
			Some(Value::Array(entries)) => entries.len(),
			_ => 0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_citation_entries() {
		let record = CaseRecord {
			citations: Some(serde_json::json!(["1 U.S. 1", "2 F.3d 3"])),
			..Default::default()
		};

		assert_eq!(record.citation_count(), 2);
	}

	#[test]
	fn missing_or_malformed_citations_count_as_zero() {
		let missing = CaseRecord::default();
		let malformed =
			CaseRecord { citations: Some(serde_json::json!({ "cite": "x" })), ..Default::default() };

		assert_eq!(missing.citation_count(), 0);
		assert_eq!(malformed.citation_count(), 0);
	}
}
