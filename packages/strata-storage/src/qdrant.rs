use std::collections::HashMap;

use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder,
		UpsertPointsBuilder, Value, VectorParamsBuilder, value::Kind,
	},
};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::{
	Result,
	models::{ScoredAction, check_upsert_lengths, clamp_similarity},
};

const ACTION_ID_KEY: &str = "action_id";
const DOCUMENT_KEY: &str = "document";

pub struct QdrantStore {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &strata_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the cosine-distance collection if it does not exist yet.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			return Ok(());
		}

		let vectors =
			VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine);

		self.client
			.create_collection(CreateCollectionBuilder::new(&self.collection).vectors_config(vectors))
			.await?;

		Ok(())
	}

	/// Upserts action documents with embeddings and sanitized metadata.
	///
	/// Qdrant point ids must be uuid or integer, so the action id maps to a
	/// UUIDv5 of itself and the original string rides in the payload. The
	/// derivation is deterministic, which keeps upserts idempotent. `wait`
	/// blocks until the write is durably visible so queries issued afterwards
	/// within the same run observe it.
	pub async fn upsert_actions(
		&self,
		ids: &[String],
		documents: &[String],
		embeddings: &[Vec<f32>],
		metadatas: &[Map<String, JsonValue>],
	) -> Result<()> {
		check_upsert_lengths(ids.len(), documents.len(), embeddings.len(), metadatas.len())?;

		if ids.is_empty() {
			return Ok(());
		}

		let mut points = Vec::with_capacity(ids.len());

		for (((id, document), embedding), metadata) in
			ids.iter().zip(documents).zip(embeddings).zip(metadatas)
		{
			let mut payload_map = HashMap::new();

			payload_map.insert(ACTION_ID_KEY.to_string(), Value::from(id.clone()));
			payload_map.insert(DOCUMENT_KEY.to_string(), Value::from(document.clone()));

			for (key, value) in metadata {
				payload_map.insert(key.clone(), Value::from(value.clone()));
			}

			points.push(PointStruct::new(
				point_id_for_action(id).to_string(),
				embedding.clone(),
				Payload::from(payload_map),
			));
		}

		let upsert = UpsertPointsBuilder::new(&self.collection, points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	/// Queries the most similar actions for an embedding, ordered by
	/// similarity descending and clamped to [0, 1].
	pub async fn query_by_embedding(
		&self,
		embedding: &[f32],
		top_k: u32,
	) -> Result<Vec<ScoredAction>> {
		let query = QueryPointsBuilder::new(&self.collection)
			.query(Query::new_nearest(embedding.to_vec()))
			.limit(u64::from(top_k))
			.with_payload(true);
		let response = self.client.query(query).await?;

		let mut out = Vec::with_capacity(response.result.len());

		for point in response.result {
			let Some(action_id) = payload_string(&point.payload, ACTION_ID_KEY) else {
				// A point without an action_id cannot have come from this
				// store; skip it rather than invent an identity.
				continue;
			};
			let document = payload_string(&point.payload, DOCUMENT_KEY).unwrap_or_default();
			let mut metadata = Map::new();

			for (key, value) in &point.payload {
				if key == ACTION_ID_KEY || key == DOCUMENT_KEY {
					continue;
				}

				metadata.insert(key.clone(), kind_to_json(value));
			}

			out.push(ScoredAction {
				action_id,
				similarity: clamp_similarity(point.score),
				metadata,
				document,
			});
		}

		Ok(out)
	}
}

pub fn point_id_for_action(action_id: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_URL, action_id.as_bytes())
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

fn kind_to_json(value: &Value) -> JsonValue {
	match &value.kind {
		Some(Kind::StringValue(text)) => JsonValue::String(text.clone()),
		Some(Kind::IntegerValue(number)) => JsonValue::from(*number),
		Some(Kind::DoubleValue(number)) => JsonValue::from(*number),
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(*flag),
		Some(Kind::NullValue(_)) | None => JsonValue::Null,
		Some(other) => JsonValue::String(format!("{other:?}")),
	}
}
