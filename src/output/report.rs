//! Report structures shared by every output format

use crate::processing::analyzer::{GapAnalysis, JobMatchReport, RoleLearningPlan};
use crate::processing::index_store::IndexManifest;
use crate::processing::job_fit::{JobFitRow, ReadinessLevel};
use crate::processing::retrieval::{QuestionAnswer, RagExplanation};
use crate::processing::scorer::Suitability;
use crate::processing::vector_index::RetrievedRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A report together with when and by what it was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub metadata: ReportMetadata,
    pub report: Report,
}

impl ReportEnvelope {
    pub fn new(report: Report) -> Self {
        Self {
            metadata: ReportMetadata::now(),
            report,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
}

impl ReportMetadata {
    pub fn now() -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Gap(GapAnalysis),
    LearningPath(RoleLearningPlan),
    JobMatch(JobMatchReport),
    Comparison(ComparisonReport),
    Neighbors(NeighborReport),
    Retrieval(RagExplanation),
    Answer(QuestionAnswer),
    JobFit(JobFitSummary),
    Index(IndexSummary),
}

/// One line of a candidate ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub rank: usize,
    pub candidate_name: String,
    pub job_fit: f64,
    pub match_percentage: f64,
    pub suitability: Suitability,
    pub readiness: ReadinessLevel,
    pub missing_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub target_role: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonReport {
    /// Ranks follow the order of `analyses`, which is expected best-first
    pub fn from_analyses(target_role: &str, analyses: &[GapAnalysis]) -> Self {
        let rows = analyses
            .iter()
            .enumerate()
            .map(|(i, analysis)| ComparisonRow {
                rank: i + 1,
                candidate_name: analysis.candidate.name.clone(),
                job_fit: analysis.job_fit,
                match_percentage: analysis.match_result.match_percentage,
                suitability: analysis.match_result.suitability,
                readiness: analysis.readiness,
                missing_count: analysis.match_result.missing_skills.len(),
            })
            .collect();

        Self {
            target_role: target_role.to_string(),
            rows,
        }
    }
}

/// Plain nearest-neighbour lookup, no scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborReport {
    pub query: String,
    pub k: usize,
    pub records: Vec<RetrievedRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFitSummary {
    pub output_path: PathBuf,
    pub candidates: usize,
    pub jobs: usize,
    /// Highest scoring rows, best first
    pub top_rows: Vec<JobFitRow>,
}

impl JobFitSummary {
    pub fn new(output_path: PathBuf, candidates: usize, jobs: usize, rows: &[JobFitRow], top: usize) -> Self {
        let mut top_rows = rows.to_vec();
        top_rows.sort_by(|a, b| b.job_fit.partial_cmp(&a.job_fit).unwrap_or(std::cmp::Ordering::Equal));
        top_rows.truncate(top);

        Self {
            output_path,
            candidates,
            jobs,
            top_rows,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    pub index_dir: PathBuf,
    pub manifest: IndexManifest,
    pub generations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(candidate: &str, job: &str, fit: f64) -> JobFitRow {
        JobFitRow {
            candidate_name: candidate.to_string(),
            job_title: job.to_string(),
            job_fit: fit,
        }
    }

    #[test]
    fn test_job_fit_summary_keeps_best_rows() {
        let rows = vec![row("A", "x", 0.2), row("B", "y", 0.9), row("C", "z", 0.5)];
        let summary = JobFitSummary::new(PathBuf::from("out.csv"), 3, 1, &rows, 2);

        let names: Vec<&str> = summary.top_rows.iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_report_serializes_with_kind_tag() {
        let report = Report::Comparison(ComparisonReport {
            target_role: "QA Engineer".to_string(),
            rows: Vec::new(),
        });
        let json = serde_json::to_value(ReportEnvelope::new(report)).unwrap();

        assert_eq!(json["report"]["kind"], "comparison");
        assert_eq!(json["report"]["target_role"], "QA Engineer");
        assert!(json["metadata"]["generated_at"].is_string());
    }
}
