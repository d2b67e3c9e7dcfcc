use crate::error::QueryError;
use async_trait::async_trait;

pub const DEFAULT_LOCAL_DIMENSIONS: usize = 256;

/// Interface to the embedding service, hosted or local. Both the build
/// phase and the query phase must go through the same provider so that
/// stored vectors and query vectors live in the same space.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, QueryError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QueryError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Local deterministic embedder: hashed character-trigram frequencies,
/// L2-normalized. No model download, no network, never fails.
#[derive(Debug, Clone, Copy)]
pub struct NgramHashEmbedder {
    pub dimensions: usize,
}

impl Default for NgramHashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_LOCAL_DIMENSIONS,
        }
    }
}

impl NgramHashEmbedder {
    fn encode(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.len() < 3 {
            for ch in &chars {
                let bucket = (fnv1a(ch.to_string().as_bytes()) % vector.len() as u64) as usize;
                vector[bucket] += 1.0;
            }
        } else {
            for window in chars.windows(3) {
                let token: String = window.iter().collect();
                let bucket = (fnv1a(token.as_bytes()) % vector.len() as u64) as usize;
                vector[bucket] += 1.0;
            }
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 1469598103934665603u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for NgramHashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, QueryError> {
        Ok(self.encode(text))
    }
}
