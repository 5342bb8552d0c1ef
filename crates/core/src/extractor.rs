//! Page text extraction for input documents.
//!
//! PDFs are read page by page with `lopdf` (feature `pdf`); if that yields no
//! text the whole document goes through `pdf-extract` instead. Plain-text
//! files are accepted too, with form feeds separating pages.

use crate::error::IngestError;
use crate::models::{Document, Page};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

pub fn load_document(path: &Path) -> Result<Document, IngestError> {
    let kind = detect_kind(path)?;
    let raw_pages = match kind {
        DocumentKind::Pdf => pdf_pages(path)?,
        DocumentKind::Text => text_pages(path)?,
    };
    let pages: Vec<Page> = raw_pages
        .into_iter()
        .enumerate()
        .map(|(number, text)| Page {
            number,
            text: normalize_text(&text),
        })
        .filter(|p| !p.text.is_empty())
        .collect();
    if pages.is_empty() {
        return Err(IngestError::NoText {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), pages = pages.len(), "extracted document");
    Ok(Document {
        name: display_name(path),
        path: path.to_path_buf(),
        pages,
    })
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Sniffs magic bytes first, then falls back to the extension for text.
pub fn detect_kind(path: &Path) -> Result<DocumentKind, IngestError> {
    let sniffed = infer::get_from_path(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(kind) = sniffed {
        if kind.mime_type() == "application/pdf" {
            return Ok(DocumentKind::Pdf);
        }
        return Err(IngestError::Unsupported {
            path: path.to_path_buf(),
            detected: kind.mime_type().to_string(),
        });
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "md" | "text" => Ok(DocumentKind::Text),
        "pdf" => Err(IngestError::Pdf {
            path: path.to_path_buf(),
            message: "missing %PDF header".to_string(),
        }),
        _ => Err(IngestError::Unsupported {
            path: path.to_path_buf(),
            detected: if ext.is_empty() {
                "no extension".to_string()
            } else {
                format!(".{}", ext)
            },
        }),
    }
}

fn text_pages(path: &Path) -> Result<Vec<String>, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(split_form_feeds(&text))
}

fn split_form_feeds(text: &str) -> Vec<String> {
    text.split('\u{c}').map(str::to_string).collect()
}

#[cfg(feature = "pdf")]
fn pdf_pages(path: &Path) -> Result<Vec<String>, IngestError> {
    let pdf_err = |message: String| IngestError::Pdf {
        path: path.to_path_buf(),
        message,
    };
    let doc = lopdf::Document::load(path).map_err(|e| pdf_err(e.to_string()))?;
    let mut pages = Vec::new();
    for number in doc.get_pages().keys() {
        match doc.extract_text(&[*number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                debug!(path = %path.display(), page = number, error = %e, "page text extraction failed");
                pages.push(String::new());
            }
        }
    }
    if pages.iter().all(|p| p.trim().is_empty()) {
        debug!(path = %path.display(), "falling back to whole-document extraction");
        let content = pdf_extract::extract_text(path).map_err(|e| pdf_err(e.to_string()))?;
        return Ok(split_form_feeds(&content));
    }
    Ok(pages)
}

#[cfg(not(feature = "pdf"))]
fn pdf_pages(path: &Path) -> Result<Vec<String>, IngestError> {
    Err(IngestError::Unsupported {
        path: path.to_path_buf(),
        detected: "application/pdf (built without the `pdf` feature)".to_string(),
    })
}

/// Collapses runs of spaces and tabs, trims line ends, keeps at most one
/// blank line between paragraphs.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        out.push_str(&line);
        blank_run = 0;
    }
    out
}
