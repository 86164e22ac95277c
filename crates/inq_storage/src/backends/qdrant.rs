use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use qdrant_client::{
    Qdrant,
    qdrant::{
        vectors_config::Config, CreateCollection, Distance, PointStruct, SearchPoints,
        UpsertPoints, VectorParams, Vectors, VectorsConfig, WithPayloadSelector,
    },
};
use inq_core::{ChunkStorage, EmbeddedChunk, Result, RetrievedChunk, EMBEDDING_DIM};
use crate::{BackendConfig, StorageBackend};

const COLLECTION: &str = "insurance-articles";

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub config: BackendConfig,
}

impl QdrantConfig {
    pub fn new() -> Self {
        let host = env::var("QDRANT_HOST").unwrap_or_else(|_| "localhost".to_string());
        let url = format!("http://{}:6334", host);
        Self {
            config: BackendConfig::new(url, COLLECTION.to_string(), EMBEDDING_DIM as u64),
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct QdrantStore {
    client: Arc<Qdrant>,
    collection_name: String,
}

impl QdrantStore {
    pub async fn new(url: &str, collection_name: String) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .api_key(env::var("QDRANT_API_KEY"))
            .build()
            .map_err(|e| inq_core::Error::External(e.into()))?;
        let client = Arc::new(client);

        let collections = client
            .list_collections()
            .await
            .map_err(|e| inq_core::Error::External(e.into()))?;

        if !collections.collections.iter().any(|c| c.name == collection_name) {
            tracing::info!("📦 Creating collection {} ({} dims)", collection_name, EMBEDDING_DIM);
            let vector_config = VectorsConfig {
                config: Some(Config::Params(VectorParams {
                    size: EMBEDDING_DIM as u64,
                    distance: Distance::Cosine.into(),
                    ..Default::default()
                })),
            };

            client
                .create_collection(CreateCollection {
                    collection_name: collection_name.clone(),
                    vectors_config: Some(vector_config),
                    ..Default::default()
                })
                .await
                .map_err(|e| inq_core::Error::External(e.into()))?;
        }

        Ok(Self {
            client,
            collection_name,
        })
    }

    pub async fn upsert_chunks(&self, chunks: &[EmbeddedChunk]) -> Result<()> {
        let mut points = Vec::with_capacity(chunks.len());
        for embedded in chunks {
            let chunk = &embedded.chunk;
            let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
            payload.insert("url".to_string(), chunk.url.clone().into());
            payload.insert("title".to_string(), chunk.title.clone().into());
            payload.insert("source".to_string(), chunk.source.clone().into());
            payload.insert("chunk_index".to_string(), (chunk.index as i64).into());
            payload.insert("total_chunks".to_string(), (chunk.total as i64).into());
            payload.insert("text".to_string(), chunk.text.clone().into());
            payload.insert("preview".to_string(), chunk.preview().into());

            // Point ids derive from the chunk id so re-ingestion overwrites.
            let point_id = Uuid::new_v5(&Uuid::NAMESPACE_URL, chunk.id().as_bytes());

            points.push(PointStruct {
                id: Some(point_id.to_string().into()),
                vectors: Some(Vectors::from(embedded.embedding.clone())),
                payload,
            });
        }

        if points.is_empty() {
            return Ok(());
        }

        self.client
            .upsert_points(UpsertPoints {
                collection_name: self.collection_name.clone(),
                points,
                ..Default::default()
            })
            .await
            .map_err(|e| inq_core::Error::External(e.into()))?;

        Ok(())
    }

    pub async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<RetrievedChunk>> {
        let search_request = SearchPoints {
            collection_name: self.collection_name.clone(),
            vector: embedding.to_vec(),
            limit: limit as u64,
            with_payload: Some(WithPayloadSelector::from(true)),
            ..Default::default()
        };

        let results = self
            .client
            .search_points(search_request)
            .await
            .map_err(|e| inq_core::Error::External(e.into()))?;

        let mut chunks = Vec::new();
        for point in results.result {
            let payload = point.payload;
            let text = payload.get("text").and_then(|v| v.as_str().map(String::from));
            let url = payload.get("url").and_then(|v| v.as_str().map(String::from));
            let title = payload.get("title").and_then(|v| v.as_str().map(String::from));
            if let (Some(text), Some(url), Some(title)) = (text, url, title) {
                chunks.push(RetrievedChunk {
                    url,
                    title,
                    text,
                    score: point.score,
                });
            }
        }

        Ok(chunks)
    }
}

/// Hosted Qdrant index. The collection is created with 1536-dim cosine
/// vectors the first time the backend connects.
pub struct QdrantStorage {
    store: Arc<RwLock<QdrantStore>>,
    config: QdrantConfig,
}

impl QdrantStorage {
    pub async fn connect(url_override: Option<&str>) -> Result<Self> {
        let mut config = QdrantConfig::new();
        if let Some(url) = url_override {
            config.config.with_url(url);
        }
        let store = QdrantStore::new(&config.config.url, config.config.collection.clone()).await?;
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            config,
        })
    }
}

#[async_trait]
impl StorageBackend for QdrantStorage {
    fn get_error_message() -> &'static str {
        "Qdrant should be reachable via QDRANT_HOST (gRPC port 6334)"
    }

    async fn new() -> Result<Self> {
        Self::connect(None).await
    }

    fn get_config(&mut self) -> Option<&mut BackendConfig> {
        Some(&mut self.config.config)
    }
}

#[async_trait]
impl ChunkStorage for QdrantStorage {
    async fn upsert_chunks(&self, chunks: &[EmbeddedChunk]) -> Result<()> {
        let store = self.store.read().await;
        store.upsert_chunks(chunks).await
    }

    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<RetrievedChunk>> {
        let store = self.store.read().await;
        store.query(embedding, limit).await
    }
}
