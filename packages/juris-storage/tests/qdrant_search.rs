use serde_json::json;

use juris_config::Qdrant;
use juris_storage::qdrant::QdrantStore;
use juris_testkit::TestCollection;

const VECTOR_DIM: u32 = 3;

#[tokio::test]
#[ignore = "Requires external Qdrant. Set JURIS_QDRANT_URL to run."]
async fn search_returns_nearest_opinions_first() {
	let Some(url) = juris_testkit::env_qdrant_url() else {
		eprintln!("Skipping search_returns_nearest_opinions_first; set JURIS_QDRANT_URL to run.");

		return;
	};
	let collection = TestCollection::new(&url, u64::from(VECTOR_DIM))
		.await
		.expect("Failed to create collection.");

	collection
		.upsert_opinion(
			vec![1.0, 0.0, 0.0],
			json!({ "case_id": "c1", "author": "Holmes", "section": "majority", "text": "Near." }),
		)
		.await
		.expect("Failed to upsert opinion.");
	collection
		.upsert_opinion(vec![0.0, 1.0, 0.0], json!({ "case_id": 42, "text": "Far." }))
		.await
		.expect("Failed to upsert opinion.");
	collection
		.upsert_opinion(vec![0.0, 0.0, 1.0], json!({ "text": "Orthogonal." }))
		.await
		.expect("Failed to upsert opinion.");

	let store = QdrantStore::new(&Qdrant {
		url,
		api_key: None,
		collection: collection.name.clone(),
		vector_name: None,
		vector_dim: VECTOR_DIM,
		timeout_ms: 10_000,
	})
	.expect("Failed to build Qdrant store.");
	let hits = store.search_opinions(vec![0.9, 0.1, 0.0], 2).await.expect("Search failed.");

	assert_eq!(hits.len(), 2);
	assert_eq!(hits[0].case_id.as_deref(), Some("c1"));
	assert_eq!(hits[0].author.as_deref(), Some("Holmes"));
	assert_eq!(hits[0].text, "Near.");
	assert_eq!(hits[1].case_id.as_deref(), Some("42"));
	assert_eq!(hits[1].section, None);
	assert!(hits[0].score >= hits[1].score);

	collection.cleanup().await.expect("Failed to delete collection.");
}
