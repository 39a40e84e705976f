// Local document reader — text, markdown and HTML files from a directory.
//
// The directory is walked breadth-first. Files directly in the root are at
// depth 0; `max_depth` limits how many levels of subdirectories are entered.
// Within each directory entries are visited in sorted order so a run over the
// same tree always produces the same document sequence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::html;
use super::traits::{Document, DocumentSource};

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];
const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Reads documents from files under a root directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Entries of one directory, split into (files, subdirectories), both sorted.
async fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

async fn read_document(path: &Path, depth: u32) -> Result<Option<Document>> {
    let Some(ext) = extension_of(path) else {
        return Ok(None);
    };
    let is_html = HTML_EXTENSIONS.contains(&ext.as_str());
    if !is_html && !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(None);
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw = String::from_utf8_lossy(&bytes);
    let text = if is_html {
        html::extract_text(&raw)
    } else {
        raw.into_owned()
    };

    Ok(Some(Document::new(path.display().to_string(), depth, text)))
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn produce(&self, seed: &str, max_depth: u32, tx: mpsc::Sender<Document>) -> Result<()> {
        info!(seed, root = %self.root.display(), max_depth, "Reading documents from disk");

        let mut level = vec![self.root.clone()];
        let mut produced = 0usize;

        for depth in 0..=max_depth {
            let mut next_level = Vec::new();

            for dir in &level {
                let (files, dirs) = match list_dir(dir).await {
                    Ok(listing) => listing,
                    // The root has to exist; a vanished subdirectory doesn't
                    Err(e) if depth == 0 => return Err(e),
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                        continue;
                    }
                };

                for path in files {
                    match read_document(&path, depth).await {
                        Ok(Some(doc)) => {
                            if tx.send(doc).await.is_err() {
                                debug!("Document consumer went away, stopping");
                                return Ok(());
                            }
                            produced += 1;
                        }
                        Ok(None) => debug!(path = %path.display(), "Not a text file, skipping"),
                        Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
                    }
                }
                next_level.extend(dirs);
            }

            if next_level.is_empty() {
                break;
            }
            level = next_level;
        }

        info!(documents = produced, "Finished reading documents");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
