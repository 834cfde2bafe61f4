//! In-memory flat vector index with exact Euclidean k-NN

use crate::error::{Result, SkillBridgeError};
use crate::processing::embeddings::Embedder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Metadata stored alongside each corpus vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_title: String,
    pub industry: String,
    /// Cleaned description; this is the text that gets embedded
    pub description: String,
    pub skills_required: Vec<String>,
    pub experience_required: String,
}

impl JobRecord {
    /// Plain-text block used as grounding context in prompts
    pub fn context_block(&self) -> String {
        format!(
            "Job Title: {}\nIndustry: {}\nRequired Skills: {}\nExperience Required: {} years\nJob Description: {}\n",
            self.job_title,
            self.industry,
            self.skills_required.join(", "),
            self.experience_required,
            self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedRecord {
    pub position: usize,
    pub distance: f32,
    pub record: JobRecord,
}

/// Vectors and metadata, position `i` of one belonging to position `i` of the other.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    model_name: String,
    vectors: Vec<Vec<f32>>,
    records: Vec<JobRecord>,
}

impl VectorIndex {
    /// Assemble an index from already computed parts, validating alignment
    pub fn from_parts(
        dimension: usize,
        model_name: impl Into<String>,
        vectors: Vec<Vec<f32>>,
        records: Vec<JobRecord>,
    ) -> Result<Self> {
        if vectors.len() != records.len() {
            return Err(SkillBridgeError::IndexCorrupted(format!(
                "{} vectors but {} metadata records",
                vectors.len(),
                records.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(SkillBridgeError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        Ok(Self {
            dimension,
            model_name: model_name.into(),
            vectors,
            records,
        })
    }

    pub fn build(records: Vec<JobRecord>, embedder: &dyn Embedder) -> Result<Self> {
        Self::build_with_progress(records, embedder, usize::MAX, |_| {})
    }

    /// Embed record descriptions in input order, `batch_size` at a time,
    /// reporting the number of records done after each batch.
    pub fn build_with_progress<F>(
        records: Vec<JobRecord>,
        embedder: &dyn Embedder,
        batch_size: usize,
        mut on_batch: F,
    ) -> Result<Self>
    where
        F: FnMut(usize),
    {
        let texts: Vec<String> = records.iter().map(|r| r.description.clone()).collect();
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(batch_size.max(1)) {
            let embedded = embedder.embed(batch)?;
            if embedded.len() != batch.len() {
                return Err(SkillBridgeError::Embedding(format!(
                    "Embedder returned {} vectors for {} texts",
                    embedded.len(),
                    batch.len()
                )));
            }
            vectors.extend(embedded);
            on_batch(vectors.len());
        }

        log::info!("Embedded {} records with {}", vectors.len(), embedder.model_name());
        Self::from_parts(embedder.dimension(), embedder.model_name(), vectors, records)
    }

    /// The `min(k, len)` nearest records, ascending by distance, ties by position
    pub fn query(&self, query_vector: &[f32], k: usize) -> Result<Vec<RetrievedRecord>> {
        if query_vector.len() != self.dimension {
            return Err(SkillBridgeError::DimensionMismatch {
                expected: self.dimension,
                actual: query_vector.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, euclidean_distance(query_vector, vector)))
            .collect();

        // Stable sort keeps position order among equal distances
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| RetrievedRecord {
                position,
                distance,
                record: self.records[position].clone(),
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }
}

pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
