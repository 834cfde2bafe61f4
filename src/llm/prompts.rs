//! Prompt templates for explanation generation

use crate::processing::scorer::Suitability;
use serde::{Deserialize, Serialize};

/// Required skills listed in a job match prompt
const PROMPT_REQUIRED_CAP: usize = 10;
/// Missing skills listed in a job match prompt
const PROMPT_MISSING_CAP: usize = 5;

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub job_match_mixed: String,
    pub job_match_all_matched: String,
    pub job_match_none_matched: String,
    pub skill_gap: String,
    pub question: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            job_match_mixed: JOB_MATCH_MIXED_TEMPLATE.to_string(),
            job_match_all_matched: JOB_MATCH_ALL_MATCHED_TEMPLATE.to_string(),
            job_match_none_matched: JOB_MATCH_NONE_MATCHED_TEMPLATE.to_string(),
            skill_gap: SKILL_GAP_TEMPLATE.to_string(),
            question: QUESTION_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatchPromptParams {
    pub target_role: String,
    pub current_role: String,
    pub experience_years: u32,
    pub required_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub match_percentage: f64,
    pub suitability: Suitability,
    pub domain_penalty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapPromptParams {
    pub target_role: String,
    pub candidate_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Retrieved job descriptions, already formatted as text blocks
    pub context: Vec<String>,
}

impl PromptTemplates {
    /// Pick the variant matching what the candidate has, then fill it in
    pub fn render_job_match(&self, params: &JobMatchPromptParams) -> String {
        let template = match (params.matched_skills.is_empty(), params.missing_skills.is_empty()) {
            (false, false) => &self.job_match_mixed,
            (false, true) => &self.job_match_all_matched,
            (true, _) => &self.job_match_none_matched,
        };

        let required: Vec<&str> = params
            .required_skills
            .iter()
            .take(PROMPT_REQUIRED_CAP)
            .map(String::as_str)
            .collect();
        let missing: Vec<&str> = params
            .missing_skills
            .iter()
            .take(PROMPT_MISSING_CAP)
            .map(String::as_str)
            .collect();

        let domain = if params.domain_penalty > 0.0 {
            format!("Different Domain (-{}%)", params.domain_penalty)
        } else {
            "Same Domain".to_string()
        };

        template
            .replace("{target_role}", &params.target_role)
            .replace("{current_role}", &params.current_role)
            .replace("{experience_years}", &params.experience_years.to_string())
            .replace("{required}", &join_or_none(&required))
            .replace("{matched}", &join_or_none(&params.matched_skills))
            .replace("{missing}", &join_or_none(&missing))
            .replace("{match_percentage}", &params.match_percentage.to_string())
            .replace("{suitability_lower}", &params.suitability.to_string().to_lowercase())
            .replace("{suitability}", &params.suitability.to_string())
            .replace("{domain}", &domain)
    }

    pub fn render_skill_gap(&self, params: &SkillGapPromptParams) -> String {
        self.skill_gap
            .replace("{target_role}", &params.target_role)
            .replace("{candidate_skills}", &join_or_none(&params.candidate_skills))
            .replace("{missing}", &join_or_none(&params.missing_skills))
            .replace("{context}", &params.context.join("\n"))
    }

    pub fn render_question(&self, context: &[String], question: &str) -> String {
        self.question
            .replace("{context}", &context.join("\n"))
            .replace("{question}", question)
    }
}

fn join_or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", ")
    }
}

const JOB_MATCH_MIXED_TEMPLATE: &str = r#"You are analyzing a job match for a {target_role} position.

CANDIDATE PROFILE:
- Current Role: {current_role}
- Years of Experience: {experience_years}
- Current Skills: {matched}

JOB REQUIREMENTS:
- Target Role: {target_role}
- Required Skills: {required}

MATCH ANALYSIS:
- Matched Skills: {matched}
- Missing Skills: {missing}
- Match Score: {match_percentage}%
- Suitability Level: {suitability}
- Domain Match: {domain}

Based on this analysis, provide a concise assessment (2-3 sentences):
1. Why are they a {suitability_lower} fit for this role?
2. What is the most critical skill gap they need to address immediately?
3. What's their realistic timeline to become job-ready?

Be honest and constructive."#;

const JOB_MATCH_ALL_MATCHED_TEMPLATE: &str = r#"You are analyzing a job match for a {target_role} position.

CANDIDATE PROFILE:
- Current Role: {current_role}
- Years of Experience: {experience_years}
- Current Skills: {matched}

MATCH ANALYSIS:
- Match Score: {match_percentage}%
- Suitability: {suitability}

The candidate has ALL the required skills ({matched}).

Provide a concise assessment (2-3 sentences):
1. Why are they an excellent fit for this role?
2. What advanced/specialized areas should they focus on to stand out?
3. Are there any industry best practices they should be aware of?"#;

const JOB_MATCH_NONE_MATCHED_TEMPLATE: &str = r#"You are analyzing a job match for a {target_role} position.

CANDIDATE PROFILE:
- Current Role: {current_role}
- Years of Experience: {experience_years}

JOB REQUIREMENTS:
- Target Role: {target_role}
- Required Skills: {required}

MATCH ANALYSIS:
- Match Score: {match_percentage}%
- Suitability: {suitability}

The candidate has very few matching skills and significant gaps.

Provide a concise assessment (2-3 sentences):
1. Is this role realistic for the candidate's current background?
2. What should be their first learning priorities?
3. What's a reasonable timeline for skill acquisition?

Be honest about the challenge level."#;

const SKILL_GAP_TEMPLATE: &str = r#"You are a career guidance assistant.
Candidate current skills: {candidate_skills}
Target job role: {target_role}
Missing skills: {missing}

Relevant job descriptions:
{context}

For each missing skill, explain why it is important for the target job,
and give actionable recommendations on how to learn it efficiently.
Provide concise, practical advice suitable for a candidate."#;

const QUESTION_TEMPLATE: &str = r#"You are a professional career advisor.
Answer ONLY using the context provided.
If information is missing, say so clearly.

Context:
{context}

Question:
{question}

Answer:"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn params(matched: &[&str], missing: &[&str]) -> JobMatchPromptParams {
        JobMatchPromptParams {
            target_role: "Backend Engineer".to_string(),
            current_role: "Support Engineer".to_string(),
            experience_years: 3,
            required_skills: (0..12).map(|i| format!("Skill{}", i)).collect(),
            matched_skills: matched.iter().map(|s| s.to_string()).collect(),
            missing_skills: missing.iter().map(|s| s.to_string()).collect(),
            match_percentage: 42.5,
            suitability: Suitability::Moderate,
            domain_penalty: 0.0,
        }
    }

    #[test]
    fn test_mixed_variant() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_job_match(&params(&["Python"], &["A", "B", "C", "D", "E", "F"]));

        assert!(prompt.contains("Missing Skills: A, B, C, D, E\n"));
        assert!(prompt.contains("Why are they a moderate fit"));
        assert!(prompt.contains("Domain Match: Same Domain"));
        assert!(prompt.contains("Skill9"));
        assert!(!prompt.contains("Skill10"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_all_matched_variant() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_job_match(&params(&["Python", "SQL"], &[]));
        assert!(prompt.contains("ALL the required skills (Python, SQL)"));
    }

    #[test]
    fn test_none_matched_variant() {
        let templates = PromptTemplates::default();
        let mut p = params(&[], &["Docker"]);
        p.domain_penalty = 30.0;
        let prompt = templates.render_job_match(&p);
        assert!(prompt.contains("very few matching skills"));
        assert!(prompt.contains("Match Score: 42.5%"));
    }

    #[test]
    fn test_skill_gap_prompt_includes_context() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_skill_gap(&SkillGapPromptParams {
            target_role: "Data Engineer".to_string(),
            candidate_skills: vec!["SQL".to_string()],
            missing_skills: vec!["spark".to_string(), "airflow".to_string()],
            context: vec!["Job Title: Data Engineer\n".to_string()],
        });

        assert!(prompt.contains("Missing skills: spark, airflow"));
        assert!(prompt.contains("Job Title: Data Engineer"));
    }

    #[test]
    fn test_question_prompt() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_question(&["ctx".to_string()], "What skills?");
        assert!(prompt.contains("Context:\nctx"));
        assert!(prompt.ends_with("What skills?\n\nAnswer:"));
    }
}
