//! Common types used across the RAGKB system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format tag of a loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Txt,
    Markdown,
    Json,
    Pdf,
}

impl DocumentType {
    /// Map a file extension (without the dot) to a document type
    pub fn from_extension(extension: &str) -> Option<DocumentType> {
        match extension.to_lowercase().as_str() {
            "txt" => Some(DocumentType::Txt),
            "md" | "markdown" => Some(DocumentType::Markdown),
            "json" => Some(DocumentType::Json),
            "pdf" => Some(DocumentType::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Txt => "txt",
            DocumentType::Markdown => "markdown",
            DocumentType::Json => "json",
            DocumentType::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw content produced by a document loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>, doc_type: DocumentType) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            doc_type,
        }
    }
}

/// Position of a chunk within its parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A unit of retrievable text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub text: String,
    pub source: String,
    pub metadata: ChunkMetadata,
}

/// A chunk with its embedding attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }

    /// Embedding dimensionality, zero when no embedding is attached
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// Persisted form of an embedded chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub chunk_id: String,
    pub text: String,
    pub source: String,
    pub metadata: ChunkMetadata,
    #[serde(default)]
    pub embedding: Vec<f32>,
    pub ingested_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn from_embedded(embedded: EmbeddedChunk, ingested_at: DateTime<Utc>) -> Self {
        let EmbeddedChunk { chunk, embedding } = embedded;
        Self {
            chunk_id: chunk.chunk_id,
            text: chunk.text,
            source: chunk.source,
            metadata: chunk.metadata,
            embedding,
            ingested_at,
        }
    }

    /// Copy the record into a ranked result with the given score
    pub fn to_result(&self, score: f32) -> QueryResult {
        QueryResult {
            chunk_id: self.chunk_id.clone(),
            text: self.text.clone(),
            source: self.source.clone(),
            metadata: self.metadata.clone(),
            score,
        }
    }
}

/// A stored record ranked against a query embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub chunk_id: String,
    pub text: String,
    pub source: String,
    pub metadata: ChunkMetadata,
    pub score: f32,
}

/// Collection statistics reported by a vector store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_chunks: usize,
    pub total_documents: usize,
    pub backend: String,
    pub location: String,
}

/// Outcome of an ingest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Success,
    NoDocuments,
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Success => "success",
            IngestStatus::NoDocuments => "no_documents",
        }
    }
}

impl std::fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counters returned by an ingest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub inserted: usize,
    /// Records removed beforehand when the caller asked to clear the store
    pub cleared: usize,
    pub status: IngestStatus,
}

impl IngestReport {
    pub fn no_documents(cleared: usize) -> Self {
        Self {
            documents: 0,
            chunks: 0,
            inserted: 0,
            cleared,
            status: IngestStatus::NoDocuments,
        }
    }
}

/// Answer to a question together with the retrieved grounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<String>,
    pub chunks: Vec<QueryResult>,
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message sent to a generation provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_chunk() -> Chunk {
        Chunk {
            chunk_id: "c-1".to_string(),
            text: "Paris is the capital of France.".to_string(),
            source: "kb/france.txt".to_string(),
            metadata: ChunkMetadata {
                doc_type: DocumentType::Txt,
                chunk_index: 0,
                total_chunks: 1,
            },
        }
    }

    #[test]
    fn test_document_type_from_extension() {
        assert_eq!(DocumentType::from_extension("txt"), Some(DocumentType::Txt));
        assert_eq!(DocumentType::from_extension("MD"), Some(DocumentType::Markdown));
        assert_eq!(
            DocumentType::from_extension("markdown"),
            Some(DocumentType::Markdown)
        );
        assert_eq!(DocumentType::from_extension("Json"), Some(DocumentType::Json));
        assert_eq!(DocumentType::from_extension("PDF"), Some(DocumentType::Pdf));
        assert_eq!(DocumentType::Pdf.to_string(), "pdf");
        assert_eq!(DocumentType::from_extension("rs"), None);
    }

    #[test]
    fn test_chunk_metadata_serializes_type_tag() {
        let value = serde_json::to_value(sample_chunk().metadata).unwrap();
        assert_eq!(
            value,
            json!({"type": "txt", "chunk_index": 0, "total_chunks": 1})
        );
    }

    #[test]
    fn test_embedded_chunk_is_flat() {
        let embedded = EmbeddedChunk::new(sample_chunk(), vec![0.5, 0.5]);
        let value = serde_json::to_value(&embedded).unwrap();
        assert_eq!(value["chunk_id"], "c-1");
        assert_eq!(value["embedding"], json!([0.5, 0.5]));
        assert_eq!(embedded.dimension(), 2);
    }

    #[test]
    fn test_stored_record_to_result() {
        let record = StoredRecord::from_embedded(
            EmbeddedChunk::new(sample_chunk(), vec![1.0]),
            Utc::now(),
        );
        let result = record.to_result(0.75);
        assert_eq!(result.chunk_id, "c-1");
        assert_eq!(result.source, "kb/france.txt");
        assert_eq!(result.score, 0.75);
    }

    #[test]
    fn test_ingest_status_strings() {
        assert_eq!(IngestStatus::Success.to_string(), "success");
        assert_eq!(IngestStatus::NoDocuments.to_string(), "no_documents");
        assert_eq!(
            serde_json::to_value(IngestStatus::NoDocuments).unwrap(),
            json!("no_documents")
        );
    }

    #[test]
    fn test_chat_message_roles() {
        let message = ChatMessage::system("rules");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"role": "system", "content": "rules"})
        );
        assert_eq!(ChatMessage::user("hi").role, Role::User);
    }
}
