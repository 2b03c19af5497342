//! Filesystem document loader

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use ragkb_core::{Document, DocumentLoader, DocumentType, Error, Result};

/// Loads `.txt`, `.md`/`.markdown`, `.json` and `.pdf` files from a directory tree
#[derive(Debug, Clone, Default)]
pub struct DirectoryLoader;

impl DirectoryLoader {
    pub fn new() -> Self {
        Self
    }

    /// Every regular file under `root`, in sorted path order
    ///
    /// Symlinks are followed; a directory reached twice is walked once.
    async fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            if let Ok(real) = tokio::fs::canonicalize(&dir).await {
                if !visited.insert(real) {
                    continue;
                }
            }

            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if dir == root => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(path = %dir.display(), error = %e, "Stopped listing directory");
                        break;
                    }
                };

                let path = entry.path();
                match tokio::fs::metadata(&path).await {
                    Ok(metadata) if metadata.is_dir() => pending.push(path),
                    Ok(metadata) if metadata.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    }
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Load one file, returning `None` for unsupported extensions
    pub async fn load_file(&self, path: &Path) -> Result<Option<Document>> {
        let Some(doc_type) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentType::from_extension)
        else {
            return Ok(None);
        };

        let content = match doc_type {
            DocumentType::Txt | DocumentType::Markdown => tokio::fs::read_to_string(path).await?,
            DocumentType::Json => {
                let raw = tokio::fs::read_to_string(path).await?;
                json_to_text(&serde_json::from_str(&raw)?)
            }
            DocumentType::Pdf => pdf_to_text(&tokio::fs::read(path).await?)?,
        };

        Ok(Some(Document::new(content, path.display().to_string(), doc_type)))
    }
}

/// Text of every page that has any, separated by a blank line
pub fn pdf_to_text(bytes: &[u8]) -> Result<String> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| Error::InvalidInput(format!("unreadable PDF: {}", e)))?;

    let mut pages = Vec::new();
    for number in document.get_pages().into_keys() {
        match document.extract_text(&[number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => tracing::debug!(page = number, error = %e, "No text on PDF page"),
        }
    }

    Ok(pages.join("\n\n"))
}

/// Flatten a JSON document into indexable text
///
/// Objects contribute their `content` or `text` field when present, arrays
/// contribute one part per element separated by a blank line. Objects without
/// either field keep their key order and are written with `", "` and `": "`
/// separators.
pub fn json_to_text(value: &Value) -> String {
    match value {
        Value::Object(_) => text_field(value)
            .map(str::to_string)
            .unwrap_or_else(|| serde_json::to_string_pretty(value).unwrap_or_default()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) => text_field(item)
                    .map(str::to_string)
                    .unwrap_or_else(|| spaced_json(item)),
                other => scalar_text(other),
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        other => scalar_text(other),
    }
}

fn text_field(value: &Value) -> Option<&str> {
    ["content", "text"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => spaced_json(other),
    }
}

/// Single-line JSON with a space after every `,` and `:`
fn spaced_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

#[async_trait]
impl DocumentLoader for DirectoryLoader {
    async fn load_directory(&self, path: &Path) -> Result<Vec<Document>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(Error::NotFound(format!("not a directory: {}", path.display())));
            }
            Err(_) => {
                return Err(Error::NotFound(format!("directory not found: {}", path.display())));
            }
        }

        let mut documents = Vec::new();

        for file in self.collect_files(path).await? {
            match self.load_file(&file).await {
                Ok(Some(document)) if document.content.trim().is_empty() => {
                    tracing::debug!(path = %file.display(), "Skipping empty document");
                }
                Ok(Some(document)) => documents.push(document),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "Failed to load document");
                }
            }
        }

        tracing::info!(
            directory = %path.display(),
            documents = documents.len(),
            "Loaded documents"
        );

        Ok(documents)
    }
}
