//! In-memory vector index using cosine similarity
//!
//! Keeps everything in process memory; contents are lost on restart. Used for
//! local development (`VECTOR_BACKEND=memory`) and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::Result;
use crate::providers::vector_index::VectorIndex;
use crate::types::{IndexedVector, Match, Metadata, VectorQuery};

/// Process-local vector index
#[derive(Debug, Default)]
pub struct MemoryIndex {
    store: RwLock<Store>,
}

#[derive(Debug, Default)]
struct Store {
    /// Insertion order, used to break score ties deterministically
    order: Vec<String>,
    vectors: HashMap<String, IndexedVector>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.store.read().vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all stored vectors in insertion order
    pub fn vectors(&self) -> Vec<IndexedVector> {
        let store = self.store.read();
        store
            .order
            .iter()
            .filter_map(|id| store.vectors.get(id).cloned())
            .collect()
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, batch: &[IndexedVector]) -> Result<()> {
        let mut store = self.store.write();
        for vector in batch {
            if store.vectors.insert(vector.id.clone(), vector.clone()).is_none() {
                store.order.push(vector.id.clone());
            }
        }
        Ok(())
    }

    async fn query(&self, query: &VectorQuery) -> Result<Vec<Match>> {
        let store = self.store.read();
        let mut scored: Vec<(usize, f32, &IndexedVector)> = store
            .order
            .iter()
            .enumerate()
            .filter_map(|(pos, id)| store.vectors.get(id).map(|v| (pos, v)))
            .map(|(pos, v)| (pos, cosine_similarity(&query.vector, &v.values), v))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(query.top_k);

        Ok(scored
            .into_iter()
            .map(|(_, score, v)| Match {
                id: v.id.clone(),
                score,
                metadata: if query.include_metadata {
                    v.metadata.clone()
                } else {
                    Metadata::new()
                },
            })
            .collect())
    }
}
