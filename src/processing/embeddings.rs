//! Embedding adapters: Model2Vec static models and a deterministic hashing fallback

use crate::error::{Result, SkillBridgeError};
use crate::config::{Config, EmbeddingBackend};
use model2vec_rs::model::StaticModel;
use parking_lot::Mutex;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

/// Text to vector boundary.
///
/// Implementations return exactly one vector per input text, in input order,
/// all of length `dimension()`.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| SkillBridgeError::Embedding("Embedder returned no vector".to_string()))
    }
}

/// Build the embedder selected in the configuration
pub fn from_config(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.models.embedding_backend {
        EmbeddingBackend::Model2vec => {
            let embedder = Model2VecEmbedder::load(&config.models.embedding_model, config.models.batch_size)?;
            Ok(Arc::new(embedder))
        }
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbedder::new(config.models.hash_dimension))),
    }
}

/// Cached texts per embedder before the cache is flushed
const MAX_CACHE_ENTRIES: usize = 10_000;

/// Model2Vec wrapper with a per-process text cache bounded by `MAX_CACHE_ENTRIES`
pub struct Model2VecEmbedder {
    model: StaticModel,
    batch_size: usize,
    dimension: usize,
    cache: Mutex<HashMap<String, Vec<f32>>>,
    model_name: String,
}

impl Model2VecEmbedder {
    /// Load from a local model folder or a HuggingFace repo id
    pub fn load(repo_or_path: &str, batch_size: usize) -> Result<Self> {
        let start_time = Instant::now();
        log::info!("Loading Model2Vec embedding model from: {}", repo_or_path);

        let model = StaticModel::from_pretrained(repo_or_path, None, None, None)?;

        let dimension = model.encode_single("dimension probe").len();
        if dimension == 0 {
            return Err(SkillBridgeError::Embedding(format!(
                "Model {} produced empty embeddings",
                repo_or_path
            )));
        }

        log::info!("Model loaded in {:.2?} ({} dimensions)", start_time.elapsed(), dimension);

        Ok(Self {
            model,
            batch_size: batch_size.max(1),
            dimension,
            cache: Mutex::new(HashMap::new()),
            model_name: repo_or_path.to_string(),
        })
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        {
            let cache = self.cache.lock();
            for (i, text) in texts.iter().enumerate() {
                match cache.get(text) {
                    Some(embedding) => results[i] = Some(embedding.clone()),
                    None => {
                        uncached_texts.push(text.clone());
                        uncached_indices.push(i);
                    }
                }
            }
        }

        if !uncached_texts.is_empty() {
            let embeddings = self.model.encode(&uncached_texts);
            if embeddings.len() != uncached_texts.len() {
                return Err(SkillBridgeError::Embedding(format!(
                    "Model returned {} vectors for {} texts",
                    embeddings.len(),
                    uncached_texts.len()
                )));
            }

            let mut cache = self.cache.lock();
            make_room(&mut cache, uncached_texts.len(), MAX_CACHE_ENTRIES);
            for ((index, text), embedding) in uncached_indices.into_iter().zip(uncached_texts).zip(embeddings) {
                cache.insert(text, embedding.clone());
                results[index] = Some(embedding);
            }
        }

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| SkillBridgeError::Embedding("Missing embedding in batch".to_string())))
            .collect()
    }
}

fn make_room(cache: &mut HashMap<String, Vec<f32>>, incoming: usize, capacity: usize) {
    if cache.len() + incoming > capacity {
        log::debug!("Flushing embedding cache at {} texts", cache.len());
        cache.clear();
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.encode_batch(batch)?);
        }
        log::debug!("Embedding cache holds {} texts", self.cache.lock().len());
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Fixed SipHash keys. Changing them changes every hashed vector, so any
/// persisted index built with the hash backend must be rebuilt.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

fn hash_token(token: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
    token.hash(&mut hasher);
    hasher.finish()
}

/// Signed feature hashing of lowercase unicode words into a fixed-size,
/// L2-normalized vector. Needs no model files; identical text always maps to
/// the identical vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    model_name: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model_name: format!("feature-hash-{}", dimension),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text.unicode_words() {
            let token = word.to_lowercase();
            let bucket = (hash_token(&token) % self.dimension as u64) as usize;
            let sign = if hash_token(&format!("{}_sign", token)) % 2 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_text("Python SQL Docker");
        let b = embedder.embed_text("python sql docker");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_embedder_normalizes() {
        let embedder = HashEmbedder::new(32);
        let vector = embedder.embed_text("rust tokio serde rust");
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        assert!(embedder.embed_text("   ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_embed_preserves_order_and_count() {
        let embedder = HashEmbedder::new(16);
        let texts = vec!["alpha".to_string(), "beta".to_string(), "alpha".to_string()];
        let vectors = embedder.embed(&texts).unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], vectors[2]);
        assert_eq!(embedder.embed_one("beta").unwrap(), vectors[1]);
    }

    #[test]
    fn test_cache_is_flushed_at_capacity() {
        let mut cache: HashMap<String, Vec<f32>> = (0..3).map(|i| (i.to_string(), vec![0.0])).collect();

        make_room(&mut cache, 1, 4);
        assert_eq!(cache.len(), 3);

        make_room(&mut cache, 2, 4);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_token_hash_is_seeded_siphash13() {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        "kubernetes".hash(&mut hasher);
        assert_eq!(hash_token("kubernetes"), hasher.finish());

        let mut unkeyed = SipHasher13::new();
        "kubernetes".hash(&mut unkeyed);
        assert_ne!(hash_token("kubernetes"), unkeyed.finish());
    }

    #[test]
    fn test_single_word_vector_is_signed_unit_bucket() {
        let embedder = HashEmbedder::new(64);
        let vector = embedder.embed_text("Docker");

        let bucket = (hash_token("docker") % 64) as usize;
        let sign = if hash_token("docker_sign") % 2 == 0 { 1.0 } else { -1.0 };
        assert_eq!(vector[bucket], sign);
        assert_eq!(vector.iter().filter(|x| **x != 0.0).count(), 1);
    }
}
