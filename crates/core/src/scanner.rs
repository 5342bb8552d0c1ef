//! Resolves user-supplied paths into the ordered list of documents to ingest.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions picked up when walking a directory.
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

/// Expands `inputs` in order. Files are kept as given, even when they do not
/// exist, so the loader can report them; directories are walked recursively
/// in file-name order, skipping hidden entries and anything matching
/// `excludes`.
pub fn collect_documents(inputs: &[PathBuf], excludes: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let exclude_set = build_globset(excludes)?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            if is_excluded(input, &exclude_set) {
                debug!(path = %input.display(), "excluded by pattern");
                continue;
            }
            if seen.insert(input.clone()) {
                out.push(input.clone());
            }
            continue;
        }

        for entry in WalkDir::new(input)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || should_descend(e.path(), &exclude_set))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_dir() || !has_document_extension(path) {
                continue;
            }
            if seen.insert(path.to_path_buf()) {
                out.push(path.to_path_buf());
            }
        }
    }
    Ok(out)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, excludes: &GlobSet) -> bool {
    !is_excluded(path, excludes) && !is_hidden(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    excludes.is_match(path)
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DOCUMENT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
