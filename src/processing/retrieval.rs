//! Retrieval-grounded skill gap explanations

use crate::error::{Result, SkillBridgeError};
use crate::llm::generator::{self, Explanation, TextGenerator};
use crate::llm::prompts::{PromptTemplates, SkillGapPromptParams};
use crate::processing::embeddings::Embedder;
use crate::processing::index_store::SharedIndex;
use crate::processing::normalizer::SkillSet;
use crate::processing::scorer::{MatchResult, SkillGapScorer};
use crate::processing::vector_index::RetrievedRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const NO_CONTEXT_MESSAGE: &str = "No matching job descriptions found for this role.";
pub const NOTHING_MISSING_MESSAGE: &str = "You already have all required skills for this role!";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagExplanation {
    pub target_role: String,
    pub retrieved: Vec<RetrievedRecord>,
    /// Union of the retrieved records' required skills, first spelling kept
    pub required_skills: Vec<String>,
    /// `None` when nothing was retrieved
    pub match_result: Option<MatchResult>,
    pub explanation: Explanation,
}

impl RagExplanation {
    pub fn matched_skills(&self) -> &[String] {
        self.match_result.as_ref().map(|r| r.matched_skills.as_slice()).unwrap_or(&[])
    }

    pub fn missing_skills(&self) -> &[String] {
        self.match_result.as_ref().map(|r| r.missing_skills.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub context: Vec<RetrievedRecord>,
    /// `None` when no generator is configured or it failed
    pub answer: Option<String>,
}

pub struct ContextRetriever {
    index: Arc<SharedIndex>,
    embedder: Arc<dyn Embedder>,
    scorer: Arc<SkillGapScorer>,
    generator: Option<Arc<dyn TextGenerator>>,
    prompts: PromptTemplates,
}

impl ContextRetriever {
    pub fn new(
        index: Arc<SharedIndex>,
        embedder: Arc<dyn Embedder>,
        scorer: Arc<SkillGapScorer>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            index,
            embedder,
            scorer,
            generator,
            prompts: PromptTemplates::default(),
        }
    }

    pub fn retrieve_for_text(&self, text: &str, k: usize) -> Result<Vec<RetrievedRecord>> {
        let index = self.index.get()?;

        let query = self
            .embedder
            .embed_one(text)
            .map_err(|e| SkillBridgeError::IndexUnavailable(format!("Query embedding failed: {}", e)))?;

        let results = index.query(&query, k)?;
        log::info!("Retrieved {} of top-{} records for query '{}'", results.len(), k, text);
        Ok(results)
    }

    pub fn retrieve_for_skills<S: AsRef<str>>(&self, skills: &[S], k: usize) -> Result<Vec<RetrievedRecord>> {
        let query = skills.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(" ");
        self.retrieve_for_text(&query, k)
    }

    /// Score the candidate against the skills of the roles nearest to `target_role`
    pub fn explain_with_context<S: AsRef<str>>(
        &self,
        candidate_skills: &[S],
        target_role: &str,
        k: usize,
    ) -> Result<RagExplanation> {
        let retrieved = self.retrieve_for_text(target_role, k)?;

        if retrieved.is_empty() {
            log::warn!("No job context retrieved for: {}", target_role);
            return Ok(RagExplanation {
                target_role: target_role.to_string(),
                retrieved,
                required_skills: Vec::new(),
                match_result: None,
                explanation: Explanation::Templated(NO_CONTEXT_MESSAGE.to_string()),
            });
        }

        let required: SkillSet = retrieved
            .iter()
            .flat_map(|r| r.record.skills_required.iter())
            .collect();
        let required_skills: Vec<String> = required.into();

        let result = self.scorer.score(candidate_skills, &required_skills);

        let explanation = if result.missing_skills.is_empty() {
            Explanation::Templated(NOTHING_MISSING_MESSAGE.to_string())
        } else {
            let prompt = self.prompts.render_skill_gap(&SkillGapPromptParams {
                target_role: target_role.to_string(),
                candidate_skills: candidate_skills.iter().map(|s| s.as_ref().to_string()).collect(),
                missing_skills: result.missing_skills.clone(),
                context: retrieved.iter().map(|r| r.record.context_block()).collect(),
            });
            generator::explain(self.generator.as_deref(), &prompt, &result)
        };

        Ok(RagExplanation {
            target_role: target_role.to_string(),
            retrieved,
            required_skills,
            match_result: Some(result),
            explanation,
        })
    }

    /// Free-form question answered only from retrieved job descriptions
    pub fn answer_question(&self, question: &str, k: usize) -> Result<QuestionAnswer> {
        let context = self.retrieve_for_text(question, k)?;

        let answer = match (&self.generator, context.is_empty()) {
            (Some(generator), false) => {
                let blocks: Vec<String> = context.iter().map(|r| r.record.context_block()).collect();
                let prompt = self.prompts.render_question(&blocks, question);
                match generator.generate(&prompt) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        log::warn!("Generator '{}' failed to answer: {}", generator.name(), e);
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(QuestionAnswer {
            question: question.to_string(),
            context,
            answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::domain::DomainDetector;
    use crate::processing::embeddings::HashEmbedder;
    use crate::processing::vector_index::{JobRecord, VectorIndex};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator {
        calls: AtomicUsize,
    }

    impl TextGenerator for CountingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("Focus on the missing skills.".to_string())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn record(title: &str, skills: &[&str]) -> JobRecord {
        JobRecord {
            job_title: title.to_string(),
            industry: "Tech".to_string(),
            description: title.to_lowercase(),
            skills_required: skills.iter().map(|s| s.to_string()).collect(),
            experience_required: "2".to_string(),
        }
    }

    fn retriever(generator: Option<Arc<dyn TextGenerator>>) -> (ContextRetriever, Arc<SharedIndex>) {
        let embedder = Arc::new(HashEmbedder::new(64));
        let index = VectorIndex::build(
            vec![
                record("Data Engineer", &["SQL", "Spark", "Airflow"]),
                record("Frontend Engineer", &["JavaScript", "React"]),
            ],
            embedder.as_ref(),
        )
        .unwrap();

        let shared = Arc::new(SharedIndex::new());
        shared.install(index);

        let detector = Arc::new(DomainDetector::new(Vec::new()).unwrap());
        let scorer = Arc::new(SkillGapScorer::new(detector, 0.7, 30.0));
        (ContextRetriever::new(shared.clone(), embedder, scorer, generator), shared)
    }

    #[test]
    fn test_retrieve_nearest_first() {
        let (retriever, _) = retriever(None);
        let results = retriever.retrieve_for_text("data engineer", 5).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.job_title, "Data Engineer");
        assert!(results[0].distance <= results[1].distance);
    }

    #[test]
    fn test_unloaded_index_is_unavailable() {
        let (retriever, shared) = retriever(None);
        shared.clear();
        assert!(matches!(
            retriever.retrieve_for_skills(&["SQL"], 3),
            Err(SkillBridgeError::IndexUnavailable(_))
        ));
    }

    #[test]
    fn test_explain_with_missing_skills_calls_generator() {
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
        });
        let (retriever, _) = retriever(Some(generator.clone()));

        let rag = retriever.explain_with_context(&["sql"], "Data Engineer", 1).unwrap();

        assert_eq!(rag.required_skills, vec!["SQL", "Spark", "Airflow"]);
        assert_eq!(rag.matched_skills(), &["sql"]);
        assert_eq!(rag.missing_skills(), &["Spark", "Airflow"]);
        assert_eq!(rag.explanation, Explanation::Generated("Focus on the missing skills.".to_string()));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nothing_missing_skips_generator() {
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
        });
        let (retriever, _) = retriever(Some(generator.clone()));

        let rag = retriever
            .explain_with_context(&["SQL", "Spark", "Airflow"], "Data Engineer", 1)
            .unwrap();

        assert_eq!(rag.explanation.text(), NOTHING_MISSING_MESSAGE);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_k_is_benign_empty_outcome() {
        let (retriever, _) = retriever(None);
        let rag = retriever.explain_with_context(&["SQL"], "Data Engineer", 0).unwrap();

        assert!(rag.retrieved.is_empty());
        assert!(rag.match_result.is_none());
        assert_eq!(rag.explanation.text(), NO_CONTEXT_MESSAGE);
    }

    #[test]
    fn test_question_without_generator_returns_context() {
        let (retriever, _) = retriever(None);
        let answer = retriever.answer_question("frontend engineer skills", 1).unwrap();
        assert_eq!(answer.context.len(), 1);
        assert!(answer.answer.is_none());
    }
}
