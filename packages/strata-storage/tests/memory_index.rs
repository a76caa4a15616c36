use serde_json::{Map, Value};

use strata_storage::{Error, memory::MemoryIndex};

fn metadata(title: &str) -> Map<String, Value> {
	let mut map = Map::new();

	map.insert("title".to_string(), Value::String(title.to_string()));

	map
}

fn upsert(index: &MemoryIndex, entries: &[(&str, Vec<f32>)]) {
	let ids: Vec<String> = entries.iter().map(|(id, _)| id.to_string()).collect();
	let documents: Vec<String> = entries.iter().map(|(id, _)| format!("doc {id}")).collect();
	let embeddings: Vec<Vec<f32>> = entries.iter().map(|(_, vec)| vec.clone()).collect();
	let metadatas: Vec<Map<String, Value>> =
		entries.iter().map(|(id, _)| metadata(id)).collect();

	index.upsert_actions(&ids, &documents, &embeddings, &metadatas).expect("Upsert must succeed.");
}

#[test]
fn query_orders_by_similarity_descending() {
	let index = MemoryIndex::new();

	upsert(&index, &[
		("A1", vec![1.0, 0.0]),
		("A2", vec![0.0, 1.0]),
		("A3", vec![0.6, 0.8]),
	]);

	let results =
		index.query_by_embedding(&[1.0, 0.0], 3).expect("Query must succeed.");
	let ids: Vec<&str> = results.iter().map(|result| result.action_id.as_str()).collect();

	assert_eq!(ids, ["A1", "A3", "A2"]);
	assert!(results.windows(2).all(|pair| pair[0].similarity >= pair[1].similarity));
}

#[test]
fn query_breaks_ties_by_action_id() {
	let index = MemoryIndex::new();

	upsert(&index, &[("A9", vec![1.0, 0.0]), ("A1", vec![1.0, 0.0])]);

	let results =
		index.query_by_embedding(&[1.0, 0.0], 2).expect("Query must succeed.");
	let ids: Vec<&str> = results.iter().map(|result| result.action_id.as_str()).collect();

	assert_eq!(ids, ["A1", "A9"]);
}

#[test]
fn query_truncates_to_top_k() {
	let index = MemoryIndex::new();

	upsert(&index, &[
		("A1", vec![1.0, 0.0]),
		("A2", vec![0.9, 0.1]),
		("A3", vec![0.8, 0.2]),
	]);

	let results =
		index.query_by_embedding(&[1.0, 0.0], 2).expect("Query must succeed.");

	assert_eq!(results.len(), 2);
}

#[test]
fn upsert_replaces_entries_sharing_an_id() {
	let index = MemoryIndex::new();

	upsert(&index, &[("A1", vec![1.0, 0.0])]);
	upsert(&index, &[("A1", vec![0.0, 1.0])]);

	assert_eq!(index.len(), 1);

	let results =
		index.query_by_embedding(&[0.0, 1.0], 1).expect("Query must succeed.");

	assert_eq!(results[0].action_id, "A1");
	assert!((results[0].similarity - 1.0).abs() < 1e-6);
}

#[test]
fn similarity_is_clamped_to_unit_interval() {
	let index = MemoryIndex::new();

	// Deliberately non-normalized vector; the raw dot product exceeds 1.
	upsert(&index, &[("A1", vec![2.0, 0.0]), ("A2", vec![-1.0, 0.0])]);

	let results =
		index.query_by_embedding(&[1.0, 0.0], 2).expect("Query must succeed.");

	assert_eq!(results[0].similarity, 1.0);
	assert_eq!(results[1].similarity, 0.0);
}

#[test]
fn upsert_rejects_mismatched_lengths() {
	let index = MemoryIndex::new();
	let result = index.upsert_actions(
		&["A1".to_string(), "A2".to_string()],
		&["doc".to_string()],
		&[vec![1.0, 0.0]],
		&[Map::new()],
	);

	assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn query_on_empty_index_returns_no_results() {
	let index = MemoryIndex::new();
	let results =
		index.query_by_embedding(&[1.0, 0.0], 5).expect("Query must succeed.");

	assert!(results.is_empty());
	assert!(index.is_empty());
}

#[test]
fn metadata_round_trips_through_the_index() {
	let index = MemoryIndex::new();

	upsert(&index, &[("A1", vec![1.0, 0.0])]);

	let results =
		index.query_by_embedding(&[1.0, 0.0], 1).expect("Query must succeed.");

	assert_eq!(results[0].metadata.get("title"), Some(&Value::String("A1".to_string())));
	assert_eq!(results[0].document, "doc A1");
}
