//! Skill matching, scoring, retrieval and analysis

pub mod normalizer;
pub mod fuzzy;
pub mod domain;
pub mod scorer;
pub mod profile;
pub mod learning_path;
pub mod job_fit;
pub mod embeddings;
pub mod vector_index;
pub mod index_store;
pub mod retrieval;
pub mod analyzer;
