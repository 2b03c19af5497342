//! Vector store implementations
//!
//! Both stores rank by exhaustive scan: every stored embedding is scored
//! against the query, O(N·D) per search. There is no index, which keeps
//! ranking exact but limits the stores to small personal knowledge bases.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;

use ragkb_core::{
    EmbeddedChunk, Error, QueryResult, Result, StoreStats, StoredRecord, VectorStore,
};

/// Cosine similarity of two equal-length vectors
///
/// Defined as 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: b.len(),
            actual: a.len(),
        });
    }

    // Accumulate in f64; long f32 sums drift and tiny components underflow.
    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| *x as f64 * *x as f64).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| *x as f64 * *x as f64).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot_product / (norm_a * norm_b)) as f32)
}

/// Score every record with an embedding and keep the best `k`
///
/// The sort is stable: equal scores keep their storage order.
pub fn rank_records(records: &[StoredRecord], query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut scored = records
        .iter()
        .filter(|record| !record.embedding.is_empty())
        .map(|record| Ok(record.to_result(cosine_similarity(query, &record.embedding)?)))
        .collect::<Result<Vec<QueryResult>>>()?;

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(k);

    Ok(scored)
}

/// Dimension shared by the stored records, if any carries an embedding
fn stored_dimension(records: &[StoredRecord]) -> Option<usize> {
    records
        .iter()
        .find(|record| !record.embedding.is_empty())
        .map(|record| record.embedding.len())
}

/// Reject a batch whose embeddings disagree with each other or with the store
fn check_dimensions(existing: Option<usize>, incoming: &[EmbeddedChunk]) -> Result<()> {
    let mut expected = existing;

    for chunk in incoming.iter().filter(|chunk| !chunk.embedding.is_empty()) {
        match expected {
            None => expected = Some(chunk.dimension()),
            Some(dimension) if dimension != chunk.dimension() => {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: chunk.dimension(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn search_records(records: &[StoredRecord], query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
    // An empty query has no direction to compare against.
    if query.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(dimension) = stored_dimension(records) {
        if query.len() != dimension {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }
    }
    rank_records(records, query, k)
}

fn distinct_sources(records: &[StoredRecord]) -> usize {
    records
        .iter()
        .map(|record| record.source.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn to_stored(records: Vec<EmbeddedChunk>) -> Vec<StoredRecord> {
    let now = Utc::now();
    records
        .into_iter()
        .map(|chunk| StoredRecord::from_embedded(chunk, now))
        .collect()
}

fn lock_error<E: std::fmt::Display>(e: E) -> Error {
    Error::VectorStore(format!("Lock error: {}", e))
}

/// In-memory vector store, records kept in insertion order
pub struct MemoryVectorStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_chunks(&self, records: Vec<EmbeddedChunk>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut stored = self.records.write().map_err(lock_error)?;
        check_dimensions(stored_dimension(&stored), &records)?;

        let count = records.len();
        stored.extend(to_stored(records));
        Ok(count)
    }

    async fn vector_search(&self, query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let stored = self.records.read().map_err(lock_error)?;
        search_records(&stored, query, k)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut stored = self.records.write().map_err(lock_error)?;
        let count = stored.len();
        stored.clear();
        Ok(count)
    }

    async fn get_stats(&self) -> Result<StoreStats> {
        let stored = self.records.read().map_err(lock_error)?;
        Ok(StoreStats {
            total_chunks: stored.len(),
            total_documents: distinct_sources(&stored),
            backend: "memory".to_string(),
            location: ":memory:".to_string(),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    records: Vec<StoredRecord>,
}

/// Vector store persisted as a single JSON document
///
/// Every mutating call rewrites the file through a temp file and rename, so
/// the file always holds the state before or after a whole call.
pub struct JsonFileVectorStore {
    path: PathBuf,
    records: RwLock<Vec<StoredRecord>>,
}

impl JsonFileVectorStore {
    /// Open the store at `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), records = records.len(), "Opened vector store");

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<Vec<StoredRecord>> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Connectivity(format!("cannot read store {}: {}", path.display(), e))
        })?;
        let store_file: StoreFile = serde_json::from_str(&content).map_err(|e| {
            Error::Connectivity(format!("store {} is not readable: {}", path.display(), e))
        })?;
        Ok(store_file.records)
    }

    fn save_to_file(&self, records: &[StoredRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let temp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, &StoreFileRef { records })?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| Error::VectorStore(format!("failed to replace {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    records: &'a [StoredRecord],
}

#[async_trait]
impl VectorStore for JsonFileVectorStore {
    async fn insert_chunks(&self, records: Vec<EmbeddedChunk>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut stored = self.records.write().map_err(lock_error)?;
        check_dimensions(stored_dimension(&stored), &records)?;

        let count = records.len();
        let mut updated = stored.clone();
        updated.extend(to_stored(records));
        self.save_to_file(&updated)?;
        *stored = updated;

        Ok(count)
    }

    async fn vector_search(&self, query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let stored = self.records.read().map_err(lock_error)?;
        search_records(&stored, query, k)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut stored = self.records.write().map_err(lock_error)?;
        let count = stored.len();
        self.save_to_file(&[])?;
        stored.clear();
        Ok(count)
    }

    async fn get_stats(&self) -> Result<StoreStats> {
        let stored = self.records.read().map_err(lock_error)?;
        Ok(StoreStats {
            total_chunks: stored.len(),
            total_documents: distinct_sources(&stored),
            backend: "json-file".to_string(),
            location: self.path.display().to_string(),
        })
    }
}
