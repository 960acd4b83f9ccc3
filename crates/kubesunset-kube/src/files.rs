//! Manifest file collector
//!
//! Reads manifests from files, directories (recursively, `.yaml`/`.yml`/
//! `.json` only) and standard input (`-`).

use async_trait::async_trait;
use kubesunset_core::{DiscoveredResource, Source, parse_documents};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::collector::Collector;
use crate::error::{CollectError, Result};

/// Path argument meaning "read standard input"
pub const STDIN_PATH: &str = "-";

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Collects resources from manifest files and stdin
#[derive(Debug, Clone)]
pub struct FileCollector {
    paths: Vec<String>,
}

impl FileCollector {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    fn collect_blocking(paths: &[String]) -> Result<Vec<DiscoveredResource>> {
        let mut resources = Vec::new();

        for path in paths {
            if path == STDIN_PATH {
                let mut content = String::new();
                std::io::stdin()
                    .read_to_string(&mut content)
                    .map_err(|source| CollectError::Io {
                        path: "<stdin>".to_string(),
                        source,
                    })?;
                resources.extend(parse_documents(&content, &Source::Stdin)?);
                continue;
            }

            for file in manifest_files(Path::new(path))? {
                resources.extend(read_manifest(&file)?);
            }
        }

        Ok(resources)
    }
}

#[async_trait]
impl Collector for FileCollector {
    fn name(&self) -> &str {
        "file"
    }

    async fn collect(&self) -> Result<Vec<DiscoveredResource>> {
        let paths = self.paths.clone();
        let resources = tokio::task::spawn_blocking(move || Self::collect_blocking(&paths)).await??;

        tracing::info!(count = resources.len(), "file collector finished");
        Ok(resources)
    }
}

/// Expand a path argument into manifest files, sorted for stable output
fn manifest_files(path: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| CollectError::Io {
        path: path.display().to_string(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(io_err)?;
    if !metadata.is_dir() {
        // Explicitly named files are read whatever their extension
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| CollectError::Io {
            path: path.display().to_string(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && has_manifest_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
}

/// Read one manifest file
///
/// The source records the canonical path, so one file reached through
/// overlapping arguments (`dir/` and `dir/a.yaml`) deduplicates.
fn read_manifest(path: &Path) -> Result<Vec<DiscoveredResource>> {
    let io_err = |source| CollectError::Io {
        path: path.display().to_string(),
        source,
    };
    let canonical = std::fs::canonicalize(path).map_err(io_err)?;
    let content = std::fs::read_to_string(&canonical).map_err(io_err)?;

    let source = Source::File {
        path: canonical.display().to_string(),
    };
    let resources = parse_documents(&content, &source)?;
    tracing::debug!(file = %path.display(), count = resources.len(), "read manifest");
    Ok(resources)
}
