pub mod align;

mod error;

pub use align::{AlignmentEngine, AlignmentRunResult, MatchResult, StrategyResult};
pub use error::Error;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::{Map, Value};

use strata_config::EmbeddingProviderConfig;
use strata_providers::embedding;
use strata_storage::{memory::MemoryIndex, models::ScoredAction, qdrant::QdrantStore};

pub type ServiceResult<T> = Result<T, Error>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text-to-vector seam. The default implementation calls the configured HTTP
/// endpoint; tests substitute a lookup table.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

/// Vector index seam: upsert keyed by action id, approximate top-k cosine
/// retrieval. Both sides of the contract deal in sanitized primitive-only
/// metadata; the engine sanitizes before calling `upsert`.
pub trait ActionIndex
where
	Self: Send + Sync,
{
	fn upsert<'a>(
		&'a self,
		ids: &'a [String],
		documents: &'a [String],
		embeddings: &'a [Vec<f32>],
		metadatas: &'a [Map<String, Value>],
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn query<'a>(
		&'a self,
		embedding: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ScoredAction>>>;
}

#[derive(Clone)]
pub struct Backends {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub index: Arc<dyn ActionIndex>,
}
impl Backends {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, index: Arc<dyn ActionIndex>) -> Self {
		Self { embedding, index }
	}

	/// Default production wiring: HTTP embedding provider plus Qdrant.
	pub fn with_qdrant(store: QdrantStore) -> Self {
		Self { embedding: Arc::new(HttpEmbedding), index: Arc::new(store) }
	}
}

struct HttpEmbedding;

impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ActionIndex for QdrantStore {
	fn upsert<'a>(
		&'a self,
		ids: &'a [String],
		documents: &'a [String],
		embeddings: &'a [Vec<f32>],
		metadatas: &'a [Map<String, Value>],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.upsert_actions(ids, documents, embeddings, metadatas)
				.await
				.map_err(color_eyre::Report::new)
		})
	}

	fn query<'a>(
		&'a self,
		embedding: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ScoredAction>>> {
		Box::pin(async move {
			self.query_by_embedding(embedding, top_k).await.map_err(color_eyre::Report::new)
		})
	}
}

impl ActionIndex for MemoryIndex {
	fn upsert<'a>(
		&'a self,
		ids: &'a [String],
		documents: &'a [String],
		embeddings: &'a [Vec<f32>],
		metadatas: &'a [Map<String, Value>],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.upsert_actions(ids, documents, embeddings, metadatas)
				.map_err(color_eyre::Report::new)
		})
	}

	fn query<'a>(
		&'a self,
		embedding: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ScoredAction>>> {
		Box::pin(async move {
			self.query_by_embedding(embedding, top_k).map_err(color_eyre::Report::new)
		})
	}
}
