//! On-disk index generations and the in-process serving handle
//!
//! Layout under the index directory:
//!
//! ```text
//! CURRENT                 name of the live generation
//! gen-<timestamp>/
//!     vectors.bin         bincode Vec<Vec<f32>>
//!     metadata.json       Vec<JobRecord>
//!     manifest.json       IndexManifest
//! ```
//!
//! A generation is fully written before `CURRENT` is replaced by rename, so a
//! reader following the pointer sees either the old pair or the new pair.

use crate::error::{Result, SkillBridgeError};
use crate::processing::vector_index::{JobRecord, VectorIndex};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

const POINTER_FILE: &str = "CURRENT";
const VECTORS_FILE: &str = "vectors.bin";
const METADATA_FILE: &str = "metadata.json";
const MANIFEST_FILE: &str = "manifest.json";
const GENERATION_PREFIX: &str = "gen-";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub generation: String,
    pub count: usize,
    pub dimension: usize,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
}

pub struct IndexStore {
    root: PathBuf,
    keep_generations: usize,
}

impl IndexStore {
    pub fn new<P: AsRef<Path>>(root: P, keep_generations: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            keep_generations: keep_generations.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a new generation, switch `CURRENT` to it and prune old ones
    pub fn save(&self, index: &VectorIndex) -> Result<IndexManifest> {
        std::fs::create_dir_all(&self.root)?;

        let created_at = Utc::now();
        let (generation, dir) = self.fresh_generation_dir(&created_at)?;

        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            generation: generation.clone(),
            count: index.len(),
            dimension: index.dimension(),
            model_name: index.model_name().to_string(),
            created_at,
        };

        let vectors = bincode::serialize(index.vectors())
            .map_err(|e| SkillBridgeError::Processing(format!("Failed to encode vectors: {}", e)))?;
        std::fs::write(dir.join(VECTORS_FILE), vectors)?;
        std::fs::write(dir.join(METADATA_FILE), serde_json::to_vec(index.records())?)?;
        std::fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;

        self.swap_pointer(&generation)?;
        log::info!(
            "Saved index generation {} ({} records, {} dimensions)",
            generation,
            manifest.count,
            manifest.dimension
        );

        if let Err(e) = self.prune() {
            log::warn!("Failed to prune old index generations: {}", e);
        }

        Ok(manifest)
    }

    /// Load the generation `CURRENT` points to
    pub fn load(&self) -> Result<VectorIndex> {
        let generation = self.current_generation()?;
        let dir = self.root.join(&generation);
        let manifest = self.read_manifest(&dir)?;

        let vectors_bytes = read_required(&dir.join(VECTORS_FILE))?;
        let vectors: Vec<Vec<f32>> = bincode::deserialize(&vectors_bytes)
            .map_err(|e| SkillBridgeError::IndexCorrupted(format!("Unreadable {}: {}", VECTORS_FILE, e)))?;

        let metadata_bytes = read_required(&dir.join(METADATA_FILE))?;
        let records: Vec<JobRecord> = serde_json::from_slice(&metadata_bytes)
            .map_err(|e| SkillBridgeError::IndexCorrupted(format!("Unreadable {}: {}", METADATA_FILE, e)))?;

        if vectors.len() != manifest.count || records.len() != manifest.count {
            return Err(SkillBridgeError::IndexCorrupted(format!(
                "Generation {} declares {} records but holds {} vectors and {} metadata entries",
                generation,
                manifest.count,
                vectors.len(),
                records.len()
            )));
        }

        let index = VectorIndex::from_parts(manifest.dimension, manifest.model_name, vectors, records)
            .map_err(|e| match e {
                SkillBridgeError::DimensionMismatch { expected, actual } => SkillBridgeError::IndexCorrupted(
                    format!("Stored vector of dimension {} in a {}-dimensional index", actual, expected),
                ),
                other => other,
            })?;

        log::debug!("Loaded index generation {} ({} records)", generation, index.len());
        Ok(index)
    }

    /// Manifest of the live generation
    pub fn info(&self) -> Result<IndexManifest> {
        let generation = self.current_generation()?;
        self.read_manifest(&self.root.join(generation))
    }

    pub fn current_generation(&self) -> Result<String> {
        let pointer = self.root.join(POINTER_FILE);
        let content = std::fs::read_to_string(&pointer).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SkillBridgeError::IndexUnavailable(format!("No index has been built in {}", self.root.display()))
            } else {
                SkillBridgeError::Io(e)
            }
        })?;

        let generation = content.trim().to_string();
        if generation.is_empty() {
            return Err(SkillBridgeError::IndexCorrupted("Empty index pointer".to_string()));
        }
        Ok(generation)
    }

    /// Generation directory names, oldest first
    pub fn generations(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(GENERATION_PREFIX) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove all but the newest `keep_generations`; the live one always stays
    pub fn prune(&self) -> Result<usize> {
        let current = self.current_generation().ok();
        let generations = self.generations()?;
        let excess = generations.len().saturating_sub(self.keep_generations);

        let mut removed = 0;
        for name in generations.into_iter().take(excess) {
            if current.as_deref() == Some(name.as_str()) {
                continue;
            }
            std::fs::remove_dir_all(self.root.join(&name))?;
            log::debug!("Pruned index generation {}", name);
            removed += 1;
        }
        Ok(removed)
    }

    fn fresh_generation_dir(&self, created_at: &DateTime<Utc>) -> Result<(String, PathBuf)> {
        let stamp = created_at.format("%Y%m%dT%H%M%S%6f").to_string();
        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                format!("{}{}", GENERATION_PREFIX, stamp)
            } else {
                format!("{}{}-{:03}", GENERATION_PREFIX, stamp, suffix)
            };
            let dir = self.root.join(&name);
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok((name, dir)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn swap_pointer(&self, generation: &str) -> Result<()> {
        let mut temp = NamedTempFile::new_in(&self.root)?;
        temp.write_all(generation.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.root.join(POINTER_FILE)).map_err(|e| SkillBridgeError::Io(e.error))?;
        Ok(())
    }

    fn read_manifest(&self, dir: &Path) -> Result<IndexManifest> {
        let bytes = read_required(&dir.join(MANIFEST_FILE))?;
        let manifest: IndexManifest = serde_json::from_slice(&bytes)
            .map_err(|e| SkillBridgeError::IndexCorrupted(format!("Unreadable {}: {}", MANIFEST_FILE, e)))?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(SkillBridgeError::IndexCorrupted(format!(
                "Unsupported index format version {}",
                manifest.format_version
            )));
        }
        Ok(manifest)
    }
}

fn read_required(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SkillBridgeError::IndexUnavailable(format!("Missing index file {}", path.display()))
        } else {
            SkillBridgeError::Io(e)
        }
    })
}

/// Read-mostly handle to the serving index.
///
/// Readers clone the `Arc` and query without holding the lock; a rebuild
/// installs a whole new index.
#[derive(Default)]
pub struct SharedIndex {
    inner: RwLock<Option<Arc<VectorIndex>>>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, index: VectorIndex) {
        *self.inner.write() = Some(Arc::new(index));
    }

    pub fn load_from(&self, store: &IndexStore) -> Result<()> {
        let index = store.load()?;
        self.install(index);
        Ok(())
    }

    pub fn get(&self) -> Result<Arc<VectorIndex>> {
        self.inner
            .read()
            .clone()
            .ok_or_else(|| SkillBridgeError::IndexUnavailable("No index loaded".to_string()))
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_index(count: usize) -> VectorIndex {
        let vectors = (0..count).map(|i| vec![i as f32, 0.0]).collect();
        let records = (0..count)
            .map(|i| JobRecord {
                job_title: format!("Job{}", i),
                industry: "Tech".to_string(),
                description: "description".to_string(),
                skills_required: vec!["Rust".to_string()],
                experience_required: "1".to_string(),
            })
            .collect();
        VectorIndex::from_parts(2, "test-model", vectors, records).unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::new(temp_dir.path(), 2);

        let manifest = store.save(&sample_index(3)).unwrap();
        assert_eq!(manifest.count, 3);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.model_name(), "test-model");
        assert_eq!(loaded.records()[2].job_title, "Job2");
        assert_eq!(store.info().unwrap().generation, manifest.generation);
    }

    #[test]
    fn test_missing_index_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::new(temp_dir.path().join("absent"), 2);

        assert!(matches!(store.load(), Err(SkillBridgeError::IndexUnavailable(_))));
        assert!(matches!(store.info(), Err(SkillBridgeError::IndexUnavailable(_))));
    }

    #[test]
    fn test_missing_metadata_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::new(temp_dir.path(), 2);
        let manifest = store.save(&sample_index(2)).unwrap();

        std::fs::remove_file(temp_dir.path().join(&manifest.generation).join(METADATA_FILE)).unwrap();
        assert!(matches!(store.load(), Err(SkillBridgeError::IndexUnavailable(_))));
    }

    #[test]
    fn test_count_mismatch_is_corrupted() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::new(temp_dir.path(), 2);
        let manifest = store.save(&sample_index(2)).unwrap();

        let metadata_path = temp_dir.path().join(&manifest.generation).join(METADATA_FILE);
        std::fs::write(&metadata_path, "[]").unwrap();
        assert!(matches!(store.load(), Err(SkillBridgeError::IndexCorrupted(_))));
    }

    #[test]
    fn test_old_generations_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::new(temp_dir.path(), 2);

        store.save(&sample_index(1)).unwrap();
        store.save(&sample_index(2)).unwrap();
        let latest = store.save(&sample_index(3)).unwrap();

        let generations = store.generations().unwrap();
        assert_eq!(generations.len(), 2);
        assert_eq!(generations.last(), Some(&latest.generation));
        assert_eq!(store.load().unwrap().len(), 3);
    }

    #[test]
    fn test_shared_index_swap() {
        let shared = SharedIndex::new();
        assert!(matches!(shared.get(), Err(SkillBridgeError::IndexUnavailable(_))));

        shared.install(sample_index(1));
        let before = shared.get().unwrap();
        shared.install(sample_index(4));

        assert_eq!(before.len(), 1);
        assert_eq!(shared.get().unwrap().len(), 4);

        shared.clear();
        assert!(!shared.is_loaded());
    }
}
