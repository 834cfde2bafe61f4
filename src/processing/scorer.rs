//! Skill gap scoring: match percentage, domain penalty and suitability tier

use crate::processing::domain::DomainDetector;
use crate::processing::fuzzy::match_skills;
use crate::processing::normalizer::SkillSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suitability {
    Challenging,
    Moderate,
    Good,
    Excellent,
}

impl Suitability {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Suitability::Excellent
        } else if percentage >= 60.0 {
            Suitability::Good
        } else if percentage >= 40.0 {
            Suitability::Moderate
        } else {
            Suitability::Challenging
        }
    }
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Suitability::Excellent => "Excellent",
            Suitability::Good => "Good",
            Suitability::Moderate => "Moderate",
            Suitability::Challenging => "Challenging",
        };
        f.pad(label)
    }
}

/// Domains inferred from both sides and the penalty they produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainAssessment {
    pub candidate_domain: Option<String>,
    pub requirement_domain: Option<String>,
    pub penalty: f64,
}

impl DomainAssessment {
    pub fn is_mismatch(&self) -> bool {
        self.penalty > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Candidate-side tokens, in required-skill order
    pub matched_skills: Vec<String>,
    /// Required-side tokens with no acceptable candidate match
    pub missing_skills: Vec<String>,
    pub total_required: usize,
    pub match_percentage: f64,
    pub suitability: Suitability,
    pub domain: DomainAssessment,
}

impl MatchResult {
    /// Missing skills truncated for presentation only
    pub fn display_missing(&self, cap: usize) -> &[String] {
        &self.missing_skills[..self.missing_skills.len().min(cap)]
    }
}

/// Free text describing each side, used only for domain detection
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainTexts<'a> {
    pub candidate: Option<&'a str>,
    pub requirement: Option<&'a str>,
}

/// `round(100 * matched / total, 2)`, or 0 when nothing is required
pub fn match_percentage(matched: usize, total_required: usize) -> f64 {
    if total_required == 0 {
        return 0.0;
    }
    let raw = matched as f64 / total_required as f64 * 100.0;
    round2(raw).clamp(0.0, 100.0)
}

/// Two decimals, exact halves to even: 0.125 becomes 0.12
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub struct SkillGapScorer {
    detector: Arc<DomainDetector>,
    threshold: f64,
    domain_penalty: f64,
}

impl SkillGapScorer {
    pub fn new(detector: Arc<DomainDetector>, threshold: f64, domain_penalty: f64) -> Self {
        Self {
            detector,
            threshold,
            domain_penalty,
        }
    }

    /// Score without domain information; no penalty can apply
    pub fn score<C: AsRef<str>, R: AsRef<str>>(&self, candidate_skills: &[C], required_skills: &[R]) -> MatchResult {
        self.score_with_domains(candidate_skills, required_skills, DomainTexts::default())
    }

    pub fn score_with_domains<C: AsRef<str>, R: AsRef<str>>(
        &self,
        candidate_skills: &[C],
        required_skills: &[R],
        texts: DomainTexts<'_>,
    ) -> MatchResult {
        let candidate: SkillSet = candidate_skills.iter().map(|s| s.as_ref()).collect();
        let required: SkillSet = required_skills.iter().map(|s| s.as_ref()).collect();

        let (matched_skills, missing_skills) =
            match_skills(candidate.as_slice(), required.as_slice(), self.threshold);

        let mut percentage = match_percentage(matched_skills.len(), required.len());

        let domain = self.assess_domains(texts);
        if domain.is_mismatch() {
            log::info!(
                "Domain mismatch: {:?} vs {:?}, applying -{} penalty",
                domain.candidate_domain,
                domain.requirement_domain,
                domain.penalty
            );
            percentage = (percentage - domain.penalty).max(0.0);
        }

        MatchResult {
            matched_skills,
            missing_skills,
            total_required: required.len(),
            match_percentage: percentage,
            suitability: Suitability::from_percentage(percentage),
            domain,
        }
    }

    fn assess_domains(&self, texts: DomainTexts<'_>) -> DomainAssessment {
        let candidate_domain = texts.candidate.and_then(|text| self.detector.detect(text));
        let requirement_domain = texts.requirement.and_then(|text| self.detector.detect(text));

        let penalty = match (&candidate_domain, &requirement_domain) {
            (Some(candidate), Some(requirement)) if candidate != requirement => self.domain_penalty,
            _ => 0.0,
        };

        DomainAssessment {
            candidate_domain,
            requirement_domain,
            penalty,
        }
    }
}
