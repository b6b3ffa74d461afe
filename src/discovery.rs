use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::{CLUSTER_FILE_GLOB, CLUSTER_FILE_PREFIX, CLUSTER_FILE_SUFFIX};
use crate::error::{PrepError, Result};

/// A cluster input file and the id parsed from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterFile {
    pub cluster_id: u32,
    pub path: PathBuf,
}

/// Result of listing an input directory
#[derive(Debug, Default)]
pub struct Discovery {
    /// Valid cluster files, ordered by cluster id
    pub clusters: Vec<ClusterFile>,
    /// Files that look like cluster files but whose id is not an integer
    pub skipped: Vec<PathBuf>,
}

impl Discovery {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

/// Pattern for candidate file names, matched against bare names so the
/// directory path never needs escaping
pub fn cluster_file_pattern() -> Result<Pattern> {
    Ok(Pattern::new(CLUSTER_FILE_GLOB)?)
}

/// Extracts the id from `cluster_<digits>.jsonl`.
///
/// Signs, whitespace and anything that overflows `u32` are rejected.
pub fn parse_cluster_id(file_name: &str) -> Option<u32> {
    let digits = file_name
        .strip_prefix(CLUSTER_FILE_PREFIX)?
        .strip_suffix(CLUSTER_FILE_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lists the cluster files directly inside `dir` (non-recursive).
///
/// A missing directory is an error; an existing empty one is not.
pub fn discover_cluster_files(dir: &Path) -> Result<Discovery> {
    if !dir.exists() {
        return Err(PrepError::InputDirMissing(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(PrepError::NotADirectory(dir.to_path_buf()));
    }

    let pattern = cluster_file_pattern()?;
    let mut discovery = Discovery::default();
    let entries = fs::read_dir(dir).map_err(|e| PrepError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| PrepError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !pattern.matches(file_name) {
            continue;
        }

        match parse_cluster_id(file_name) {
            Some(cluster_id) => {
                debug!(cluster_id, "Discovered {}", path.display());
                discovery.clusters.push(ClusterFile { cluster_id, path });
            }
            None => discovery.skipped.push(path),
        }
    }

    discovery
        .clusters
        .sort_by(|a, b| a.cluster_id.cmp(&b.cluster_id).then_with(|| a.path.cmp(&b.path)));
    discovery.skipped.sort();

    if discovery.clusters.is_empty() && discovery.skipped.is_empty() {
        warn!("No cluster files found in {}", dir.display());
    }

    Ok(discovery)
}
