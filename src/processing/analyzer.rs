//! Analysis engine: gap analysis, job match and candidate comparison

use crate::error::{Result, SkillBridgeError};
use crate::input::catalog::{RoleCatalog, RoleResolution};
use crate::llm::generator::{self, Explanation, TextGenerator};
use crate::llm::prompts::{JobMatchPromptParams, PromptTemplates};
use crate::processing::job_fit::{job_fit, ReadinessLevel};
use crate::processing::learning_path::{build_learning_path, LearningPath};
use crate::processing::profile::{CandidateProfile, ExperienceLevel};
use crate::processing::scorer::{DomainTexts, MatchResult, SkillGapScorer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Minimum trimmed length of each free text in a job match
pub const MIN_TEXT_CHARS: usize = 50;
/// Importance assumed for skills without an explicit weight
pub const DEFAULT_IMPORTANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn from_importance(importance: f64) -> Self {
        if importance >= 0.8 {
            PriorityLevel::High
        } else if importance >= 0.5 {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriorityLevel::High => "High",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::Low => "Low",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPriority {
    pub skill: String,
    pub priority: PriorityLevel,
    pub importance: f64,
}

/// Rank missing skills by importance, highest first; equal weights keep input order
pub fn prioritize_skills<S: AsRef<str>>(missing: &[S], importance: &HashMap<String, f64>) -> Vec<SkillPriority> {
    let mut prioritized: Vec<SkillPriority> = missing
        .iter()
        .map(|skill| {
            let skill = skill.as_ref();
            let importance = importance.get(skill).copied().unwrap_or(DEFAULT_IMPORTANCE);
            SkillPriority {
                skill: skill.to_string(),
                priority: PriorityLevel::from_importance(importance),
                importance,
            }
        })
        .collect();

    prioritized.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(Ordering::Equal));
    prioritized
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub candidate: CandidateProfile,
    pub experience_level: ExperienceLevel,
    pub target_role: String,
    pub role_resolution: RoleResolution,
    pub required_skills: Vec<String>,
    pub match_result: MatchResult,
    pub prioritized_missing: Vec<SkillPriority>,
    pub learning_path: LearningPath,
    pub job_fit: f64,
    pub readiness: ReadinessLevel,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleLearningPlan {
    pub candidate_name: String,
    pub target_role: String,
    pub role_resolution: RoleResolution,
    pub learning_path: LearningPath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatchRequest {
    pub candidate_name: String,
    pub current_role: String,
    pub experience_years: u32,
    pub candidate_skills: Vec<String>,
    pub candidate_text: String,
    pub target_role: String,
    /// Explicit requirements; the catalog entry for `target_role` otherwise
    pub required_skills: Option<Vec<String>>,
    pub requirement_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatchReport {
    pub candidate_name: String,
    pub target_role: String,
    pub match_result: MatchResult,
    pub improvement_areas: Vec<String>,
    pub learning_plan: Vec<String>,
    pub explanation: Explanation,
    pub processing_time_ms: u64,
}

pub struct AnalysisEngine {
    catalog: Arc<RoleCatalog>,
    scorer: Arc<SkillGapScorer>,
    generator: Option<Arc<dyn TextGenerator>>,
    prompts: PromptTemplates,
    display_cap: usize,
    learning_path_cap: usize,
}

impl AnalysisEngine {
    pub fn new(
        catalog: Arc<RoleCatalog>,
        scorer: Arc<SkillGapScorer>,
        generator: Option<Arc<dyn TextGenerator>>,
        display_cap: usize,
        learning_path_cap: usize,
    ) -> Self {
        Self {
            catalog,
            scorer,
            generator,
            prompts: PromptTemplates::default(),
            display_cap,
            learning_path_cap,
        }
    }

    /// Full gap analysis of one candidate against a catalog role
    pub fn analyze_gap(&self, profile: &CandidateProfile, target_role: &str) -> Result<GapAnalysis> {
        let start_time = Instant::now();
        validate_profile(profile)?;
        let target_role = validate_role(target_role)?;

        log::info!("Analyzing skill gap for {} -> {}", profile.name, target_role);

        let lookup = self.catalog.lookup(target_role);
        let required_skills = lookup.requirement.skills.clone();

        let match_result = self.scorer.score(profile.skills.as_slice(), &required_skills);
        let prioritized_missing = prioritize_skills(&match_result.missing_skills, &HashMap::new());
        let learning_path = build_learning_path(self.capped_for_path(&match_result.missing_skills));
        let fit = job_fit(profile.skills.as_slice(), &required_skills);

        log::info!("Analysis complete: {:.1}% fit", fit * 100.0);

        Ok(GapAnalysis {
            candidate: profile.clone(),
            experience_level: profile.experience_level(),
            target_role: target_role.to_string(),
            role_resolution: lookup.resolution,
            required_skills,
            match_result,
            prioritized_missing,
            learning_path,
            job_fit: fit,
            readiness: ReadinessLevel::from_fit(fit),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Learning path towards a catalog role. A candidate already holding every
    /// skill gets an advancement plan instead of an empty one.
    pub fn plan_learning_path(&self, profile: &CandidateProfile, target_role: &str) -> Result<RoleLearningPlan> {
        validate_profile(profile)?;
        let target_role = validate_role(target_role)?;

        let lookup = self.catalog.lookup(target_role);
        let match_result = self.scorer.score(profile.skills.as_slice(), &lookup.requirement.skills);

        let skills = if match_result.missing_skills.is_empty() {
            advancement_skills(&lookup.requirement.skills)
        } else {
            self.capped_for_path(&match_result.missing_skills).to_vec()
        };

        let learning_path = build_learning_path(&skills);
        log::info!(
            "Generated learning path with {} skills for {}",
            learning_path.steps.len(),
            target_role
        );

        Ok(RoleLearningPlan {
            candidate_name: profile.name.clone(),
            target_role: target_role.to_string(),
            role_resolution: lookup.resolution,
            learning_path,
        })
    }

    /// Match with free texts on both sides, domain penalty and explanation
    pub fn job_match(&self, request: &JobMatchRequest) -> Result<JobMatchReport> {
        let start_time = Instant::now();

        if request.candidate_skills.iter().all(|s| s.trim().is_empty()) {
            return Err(SkillBridgeError::InvalidInput(
                "Candidate must have at least one skill".to_string(),
            ));
        }
        validate_text(&request.candidate_text, "Candidate text")?;
        validate_text(&request.requirement_text, "Requirement text")?;
        let target_role = validate_role(&request.target_role)?;

        log::info!("Job match: {} -> {}", request.candidate_name, target_role);

        let required_skills = match &request.required_skills {
            Some(skills) if skills.iter().any(|s| !s.trim().is_empty()) => skills.clone(),
            _ => self.catalog.lookup(target_role).requirement.skills,
        };

        let match_result = self.scorer.score_with_domains(
            &request.candidate_skills,
            &required_skills,
            DomainTexts {
                candidate: Some(request.candidate_text.as_str()),
                requirement: Some(request.requirement_text.as_str()),
            },
        );

        let improvement_areas = self.improvement_areas(&match_result);
        let learning_plan = self.short_learning_plan(&match_result);

        let prompt = self.prompts.render_job_match(&JobMatchPromptParams {
            target_role: target_role.to_string(),
            current_role: request.current_role.clone(),
            experience_years: request.experience_years,
            required_skills: required_skills.clone(),
            matched_skills: match_result.matched_skills.clone(),
            missing_skills: match_result.missing_skills.clone(),
            match_percentage: match_result.match_percentage,
            suitability: match_result.suitability,
            domain_penalty: match_result.domain.penalty,
        });
        let explanation = generator::explain(self.generator.as_deref(), &prompt, &match_result);

        Ok(JobMatchReport {
            candidate_name: request.candidate_name.clone(),
            target_role: target_role.to_string(),
            match_result,
            improvement_areas,
            learning_plan,
            explanation,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Analyses of every candidate that can be analysed, best job fit first
    pub fn compare_candidates(&self, profiles: &[CandidateProfile], target_role: &str) -> Vec<GapAnalysis> {
        let mut analyses: Vec<GapAnalysis> = profiles
            .iter()
            .filter_map(|profile| match self.analyze_gap(profile, target_role) {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    log::error!("Error analyzing candidate {}: {}", profile.name, e);
                    None
                }
            })
            .collect();

        analyses.sort_by(|a, b| b.job_fit.partial_cmp(&a.job_fit).unwrap_or(Ordering::Equal));
        log::info!("Compared {} candidates", analyses.len());
        analyses
    }

    fn capped_for_path<'a>(&self, missing: &'a [String]) -> &'a [String] {
        &missing[..missing.len().min(self.learning_path_cap)]
    }

    fn improvement_areas(&self, result: &MatchResult) -> Vec<String> {
        if result.missing_skills.is_empty() {
            return vec!["Strengthen expertise in core areas".to_string()];
        }
        result
            .display_missing(self.display_cap)
            .iter()
            .map(|skill| format!("Learn {}", capitalize(skill)))
            .collect()
    }

    fn short_learning_plan(&self, result: &MatchResult) -> Vec<String> {
        if result.missing_skills.is_empty() {
            return vec!["Week 1-2: Advanced training".to_string()];
        }
        result
            .display_missing(self.display_cap)
            .iter()
            .enumerate()
            .map(|(i, skill)| format!("Week {}-{}: {}", i + 1, i + 2, capitalize(skill)))
            .collect()
    }
}

fn advancement_skills(required: &[String]) -> Vec<String> {
    let mut skills = Vec::with_capacity(3);
    if let Some(first) = required.first() {
        skills.push(format!("Advanced {}", first));
    }
    skills.push("Industry Best Practices".to_string());
    skills.push("Performance Optimization".to_string());
    skills
}

/// Upper-case the first character, leaving the rest as written
fn capitalize(skill: &str) -> String {
    let mut chars = skill.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn validate_profile(profile: &CandidateProfile) -> Result<()> {
    if profile.skills.is_empty() {
        return Err(SkillBridgeError::InvalidInput(format!(
            "Candidate {} must have at least one skill",
            profile.name
        )));
    }
    Ok(())
}

fn validate_role(target_role: &str) -> Result<&str> {
    let trimmed = target_role.trim();
    if trimmed.chars().count() < 2 {
        return Err(SkillBridgeError::InvalidInput("Target role must be specified".to_string()));
    }
    Ok(trimmed)
}

fn validate_text(text: &str, what: &str) -> Result<()> {
    let length = text.trim().chars().count();
    if length < MIN_TEXT_CHARS {
        return Err(SkillBridgeError::InvalidInput(format!(
            "{} must have at least {} characters, got {}",
            what, MIN_TEXT_CHARS, length
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::scorer::Suitability;

    fn engine() -> AnalysisEngine {
        let catalog = Arc::new(RoleCatalog::builtin().unwrap());
        let detector = Arc::new(catalog.domain_detector().unwrap());
        let scorer = Arc::new(SkillGapScorer::new(detector, 0.7, 30.0));
        AnalysisEngine::new(catalog, scorer, None, 5, 8)
    }

    #[test]
    fn test_analyze_gap_known_role() {
        let profile = CandidateProfile::new("Dana", &["Python", "SQL", "Excel"], 3);
        let analysis = engine().analyze_gap(&profile, "Data Analyst").unwrap();

        assert_eq!(analysis.role_resolution, RoleResolution::Exact);
        assert_eq!(analysis.match_result.matched_skills, vec!["Excel", "SQL", "Python"]);
        assert_eq!(analysis.match_result.match_percentage, 42.86);
        assert_eq!(analysis.match_result.suitability, Suitability::Moderate);
        assert_eq!(analysis.job_fit, 0.43);
        assert_eq!(analysis.readiness, ReadinessLevel::ModeratelyQualified);
        assert_eq!(analysis.experience_level, ExperienceLevel::MidLevel);
        assert_eq!(analysis.learning_path.steps.len(), 4);
        assert_eq!(analysis.prioritized_missing[0].priority, PriorityLevel::Medium);
    }

    #[test]
    fn test_analyze_gap_unknown_role_falls_back() {
        let profile = CandidateProfile::new("Eli", &["Teamwork"], 0);
        let analysis = engine().analyze_gap(&profile, "Astronaut").unwrap();

        assert!(matches!(analysis.role_resolution, RoleResolution::Fallback { .. }));
        assert_eq!(analysis.required_skills, vec!["Communication", "Problem Solving", "Teamwork"]);
        assert_eq!(analysis.match_result.match_percentage, 33.33);
    }

    #[test]
    fn test_analyze_gap_rejects_empty_skills() {
        let profile = CandidateProfile::new("Nobody", &[" "], 1);
        let err = engine().analyze_gap(&profile, "Data Analyst").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_learning_path_cap() {
        let catalog = Arc::new(
            RoleCatalog::parse(
                r#"
fallback_skills = ["Communication"]

[[roles]]
name = "Generalist"
skills = ["S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8", "S9", "S10"]
"#,
            )
            .unwrap(),
        );
        let detector = Arc::new(catalog.domain_detector().unwrap());
        let scorer = Arc::new(SkillGapScorer::new(detector, 0.99, 30.0));
        let engine = AnalysisEngine::new(catalog, scorer, None, 5, 8);

        let profile = CandidateProfile::new("Fay", &["Cooking"], 2);
        let analysis = engine.analyze_gap(&profile, "Generalist").unwrap();
        assert_eq!(analysis.match_result.missing_skills.len(), 10);
        assert_eq!(analysis.learning_path.steps.len(), 8);
        assert_eq!(analysis.learning_path.total_weeks, 33);
    }

    #[test]
    fn test_plan_when_nothing_missing() {
        let profile = CandidateProfile::new(
            "Gus",
            &["Docker", "Kubernetes", "Terraform", "AWS", "CI/CD", "Linux", "Ansible"],
            6,
        );
        let plan = engine().plan_learning_path(&profile, "DevOps Engineer").unwrap();
        let skills: Vec<&str> = plan.learning_path.steps.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(
            skills,
            vec!["Advanced Docker", "Industry Best Practices", "Performance Optimization"]
        );
    }

    fn match_request(candidate_text: &str, requirement_text: &str) -> JobMatchRequest {
        JobMatchRequest {
            candidate_name: "Hana".to_string(),
            current_role: "Analyst".to_string(),
            experience_years: 2,
            candidate_skills: vec!["Python".to_string(), "SQL".to_string()],
            candidate_text: candidate_text.to_string(),
            target_role: "Backend Engineer".to_string(),
            required_skills: None,
            requirement_text: requirement_text.to_string(),
        }
    }

    #[test]
    fn test_job_match_short_text_rejected() {
        let request = match_request("too short", &"x".repeat(60));
        assert!(engine().job_match(&request).unwrap_err().is_validation());
    }

    #[test]
    fn test_job_match_without_generator_uses_template() {
        let request = match_request(
            "Python developer writing backend software and SQL queries for an API platform",
            "We build backend software in Python with Docker, SQL and a REST API on Kubernetes",
        );
        let report = engine().job_match(&request).unwrap();

        assert_eq!(report.match_result.total_required, 7);
        assert_eq!(report.match_result.domain.penalty, 0.0);
        assert_eq!(report.improvement_areas.len(), 5);
        assert_eq!(report.improvement_areas[0], "Learn Docker");
        assert_eq!(report.learning_plan[0], "Week 1-2: Docker");
        assert!(!report.explanation.is_generated());
    }

    #[test]
    fn test_job_match_domain_penalty() {
        let mut request = match_request(
            "Mechanical engineer experienced with solidworks, cad models and thermodynamics",
            "We build backend software in Python with Docker, SQL and a REST API on Kubernetes",
        );
        request.required_skills = Some(vec!["Python".to_string(), "SQL".to_string()]);

        let report = engine().job_match(&request).unwrap();
        assert_eq!(report.match_result.domain.penalty, 30.0);
        assert_eq!(report.match_result.match_percentage, 70.0);
        assert_eq!(report.improvement_areas, vec!["Strengthen expertise in core areas"]);
        assert_eq!(report.learning_plan, vec!["Week 1-2: Advanced training"]);
    }

    #[test]
    fn test_compare_sorted_by_fit() {
        let profiles = vec![
            CandidateProfile::new("Low", &["Excel"], 1),
            CandidateProfile::new("Empty", &[""], 1),
            CandidateProfile::new("High", &["Excel", "SQL", "Python", "Tableau"], 4),
        ];
        let analyses = engine().compare_candidates(&profiles, "Data Analyst");

        let names: Vec<&str> = analyses.iter().map(|a| a.candidate.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Low"]);
    }

    #[test]
    fn test_prioritize_skills() {
        let mut weights = HashMap::new();
        weights.insert("Docker".to_string(), 0.9);
        weights.insert("Go".to_string(), 0.2);

        let prioritized = prioritize_skills(&["Go", "SQL", "Docker"], &weights);
        let order: Vec<(&str, PriorityLevel)> = prioritized.iter().map(|p| (p.skill.as_str(), p.priority)).collect();
        assert_eq!(
            order,
            vec![
                ("Docker", PriorityLevel::High),
                ("SQL", PriorityLevel::Medium),
                ("Go", PriorityLevel::Low),
            ]
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("docker"), "Docker");
        assert_eq!(capitalize("AWS"), "AWS");
        assert_eq!(capitalize(""), "");
    }
}
