//! Document ingestion: load the JD and every resume, chunk the text, tag
//! chunk metadata, and hand everything to the retriever.
//!
//! Supported formats: `.txt`/`.md` (read directly) and `.pdf` (pdf-extract).
//! Anything else is `UnsupportedInputFormat` — a hard failure, since a run
//! over partially ingested documents would rank candidates against missing
//! evidence.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::PipelineError;
use crate::retrieval::{
    ChunkMetadata, DocType, RetrievalChunk, Retriever, JD_COLLECTION, RESUME_COLLECTION,
};

/// Target chunk size in characters.
const CHUNK_SIZE: usize = 800;
/// Overlap carried from the tail of one chunk into the next.
const CHUNK_OVERLAP: usize = 150;

/// Reads one document into plain text, dispatching on extension.
pub fn load_document(path: &Path) -> Result<String, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "md" => Ok(fs::read_to_string(path)?),
        "pdf" => pdf_extract::extract_text(path).map_err(|e| {
            PipelineError::UnsupportedInputFormat(format!(
                "failed to extract text from '{}': {e}",
                path.display()
            ))
        }),
        other => Err(PipelineError::UnsupportedInputFormat(format!(
            "'{}': extension '.{other}' is not supported (use .txt, .md, or .pdf)",
            path.display()
        ))),
    }
}

/// Splits text into overlapping chunks, preferring paragraph and sentence
/// boundaries over mid-word cuts. Whitespace-only input yields no chunks.
pub fn chunk_text(text: &str) -> Vec<String> {
    chunk_with(text, CHUNK_SIZE, CHUNK_OVERLAP)
}

fn chunk_with(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        // `size` is a byte count, so the hard limit can land inside a
        // multibyte character; back up onto a boundary before slicing.
        let mut hard_end = (start + size).min(text.len());
        while !text.is_char_boundary(hard_end) {
            hard_end -= 1;
        }
        let end = if hard_end == text.len() {
            hard_end
        } else {
            find_break(text, start, hard_end)
        };

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if end == text.len() {
            break;
        }
        // Step back by the overlap, staying on a char boundary and making
        // forward progress.
        let mut next = end.saturating_sub(overlap).max(start + 1);
        while !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    chunks
}

/// Picks the best split point in `(start, hard_end]`: paragraph break,
/// then sentence end, then whitespace, then the hard limit. `hard_end`
/// must sit on a char boundary.
fn find_break(text: &str, start: usize, hard_end: usize) -> usize {
    let window = &text[start..hard_end];
    if let Some(pos) = window.rfind("\n\n") {
        if pos > 0 {
            return start + pos;
        }
    }
    if let Some(pos) = window.rfind(". ") {
        if pos > 0 {
            return start + pos + 1;
        }
    }
    if let Some(pos) = window.rfind(char::is_whitespace) {
        if pos > 0 {
            return start + pos;
        }
    }
    hard_end
}

/// Lists candidate ids: sorted file stems of every supported resume file.
pub fn list_candidate_ids(resumes_dir: &Path) -> Result<Vec<String>, PipelineError> {
    let mut ids: Vec<String> = resume_files(resumes_dir)?
        .iter()
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    ids.sort();
    Ok(ids)
}

fn resume_files(resumes_dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files: Vec<PathBuf> = fs::read_dir(resumes_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && matches!(
                    p.extension().and_then(|e| e.to_str()).map(str::to_lowercase),
                    Some(ref ext) if ["txt", "md", "pdf"].contains(&ext.as_str())
                )
        })
        .collect();
    files.sort();
    Ok(files)
}

/// End-to-end ingestion: JD into the jd collection, each resume into the
/// resume collection tagged with its candidate id.
pub async fn ingest_all(
    retriever: &dyn Retriever,
    jd_path: &Path,
    resumes_dir: &Path,
) -> Result<(), PipelineError> {
    let jd_text = load_document(jd_path)?;
    let jd_file = file_name(jd_path);
    let jd_chunks: Vec<RetrievalChunk> = chunk_text(&jd_text)
        .into_iter()
        .map(|text| RetrievalChunk {
            text,
            metadata: ChunkMetadata {
                doc_type: DocType::Jd,
                source_file: jd_file.clone(),
                candidate_id: None,
            },
        })
        .collect();
    info!("Ingesting {} JD chunks from {}", jd_chunks.len(), jd_file);
    retriever.ingest(JD_COLLECTION, jd_chunks).await?;

    for path in resume_files(resumes_dir)? {
        let candidate_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let text = load_document(&path)?;
        let source_file = file_name(&path);
        let chunks: Vec<RetrievalChunk> = chunk_text(&text)
            .into_iter()
            .map(|text| RetrievalChunk {
                text,
                metadata: ChunkMetadata {
                    doc_type: DocType::Resume,
                    source_file: source_file.clone(),
                    candidate_id: Some(candidate_id.clone()),
                },
            })
            .collect();
        info!(
            "Ingesting {} resume chunks for candidate '{}'",
            chunks.len(),
            candidate_id
        );
        retriever.ingest(RESUME_COLLECTION, chunks).await?;
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
