use crate::error::QueryError;
use crate::models::{RetrievedChunk, SectionChunk, StoreEntry};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_STORE_DIR: &str = "./chroma_db";

const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "entries.jsonl";

#[derive(Debug, Serialize, Deserialize)]
struct StoreManifest {
    dimensions: usize,
    created_at: DateTime<Utc>,
}

/// Append-only vector store persisted under a single directory: a manifest
/// pinning the embedding dimension plus one JSONL row per entry. Search is
/// brute-force cosine over every row, which is plenty for a single
/// document's worth of chunks.
pub struct DiskVectorStore {
    dir: PathBuf,
    dimensions: usize,
}

impl DiskVectorStore {
    /// Open or create the store directory. An existing manifest must agree
    /// on the embedding dimension; mixing providers against one store is
    /// refused here rather than producing silently broken rankings.
    pub fn open(dir: impl Into<PathBuf>, dimensions: usize) -> Result<Self, QueryError> {
        if dimensions == 0 {
            return Err(QueryError::Store(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let manifest_path = dir.join(MANIFEST_FILE);
        if manifest_path.exists() {
            let manifest: StoreManifest =
                serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
            if manifest.dimensions != dimensions {
                return Err(QueryError::Store(format!(
                    "store at {} was built with dimension {}, requested {}",
                    dir.display(),
                    manifest.dimensions,
                    dimensions
                )));
            }
        } else {
            let manifest = StoreManifest {
                dimensions,
                created_at: Utc::now(),
            };
            fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
        }

        Ok(Self { dir, dimensions })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entries_path(&self) -> PathBuf {
        self.dir.join(ENTRIES_FILE)
    }

    fn read_entries(&self) -> Result<Vec<StoreEntry>, QueryError> {
        let path = self.entries_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }
}

fn cosine(left: &[f32], right: &[f32]) -> f64 {
    let mut dot = 0f64;
    let mut left_norm = 0f64;
    let mut right_norm = 0f64;
    for (a, b) in left.iter().zip(right.iter()) {
        dot += f64::from(*a) * f64::from(*b);
        left_norm += f64::from(*a) * f64::from(*a);
        right_norm += f64::from(*b) * f64::from(*b);
    }
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm.sqrt() * right_norm.sqrt())
}

#[async_trait]
impl VectorIndex for DiskVectorStore {
    async fn index_chunks(
        &self,
        chunks: &[SectionChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), QueryError> {
        if chunks.len() != embeddings.len() {
            return Err(QueryError::Store(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        if chunks.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.entries_path())?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            if embedding.len() != self.dimensions {
                return Err(QueryError::Store(format!(
                    "embedding dimension {} != {}",
                    embedding.len(),
                    self.dimensions
                )));
            }

            let entry = StoreEntry {
                entry_id: Uuid::new_v4().to_string(),
                chunk: chunk.clone(),
                embedding: embedding.clone(),
                indexed_at: Utc::now(),
            };
            let mut line = serde_json::to_string(&entry)?;
            line.push('\n');
            file.write_all(line.as_bytes())?;
        }

        file.flush()?;
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, QueryError> {
        if query_vector.len() != self.dimensions {
            return Err(QueryError::Store(format!(
                "query vector dim {} is not {}",
                query_vector.len(),
                self.dimensions
            )));
        }

        let mut hits = self
            .read_entries()?
            .into_iter()
            .map(|entry| {
                let score = cosine(query_vector, &entry.embedding);
                RetrievedChunk { entry, score }
            })
            .collect::<Vec<_>>();

        hits.sort_by(|left, right| right.score.total_cmp(&left.score));
        hits.truncate(top_k);
        Ok(hits)
    }
}
