//! Document discovery and loading.
//!
//! Recursively scans a source directory for `.txt` and `.pdf` files and
//! loads each into an in-memory [`Document`]. Other extensions are skipped.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::Document;

const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "pdf"];

/// Load every supported file under `data_dir`, in sorted path order.
///
/// A missing directory is a fatal error. A directory with no supported
/// files yields an empty vec; the caller decides how to report that. A
/// single unreadable or empty file is reported and skipped so one bad
/// input cannot abort the whole run.
pub fn load_documents(data_dir: &Path) -> Result<Vec<Document>> {
    if !data_dir.is_dir() {
        return Err(Error::NotFound(format!(
            "document directory '{}' does not exist",
            data_dir.display()
        ))
        .into());
    }

    let files = list_source_files(data_dir);
    let mut docs = Vec::new();
    for path in &files {
        match load_file(path) {
            Ok(Some(doc)) => docs.push(doc),
            Ok(None) => {
                tracing::warn!(path = %path.display(), "no text extracted, skipping");
                eprintln!("⚠️ No text extracted from {}, skipping", path.display());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load, skipping");
                eprintln!("⚠️ Failed to load {}: {}", path.display(), e);
            }
        }
    }
    Ok(docs)
}

fn load_file(path: &Path) -> Result<Option<Document>> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    let text = match ext.as_str() {
        "txt" => read_text_content(path)?,
        "pdf" => pdf_extract::extract_text(path)
            .map_err(|e| anyhow::anyhow!("PDF extraction failed: {e}"))?,
        _ => return Ok(None),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Document {
        doc_id: extract_doc_id(path),
        path: path.to_path_buf(),
        text,
    }))
}

fn read_text_content(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        // Not valid UTF-8; take what we can get.
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
    }
}

fn extract_doc_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn list_source_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                SUPPORTED_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if supported {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}
