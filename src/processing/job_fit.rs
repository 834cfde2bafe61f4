//! All-pairs job fit between candidate profiles and job records

use crate::error::Result;
use crate::processing::normalizer::normalize_skill;
use crate::processing::profile::CandidateProfile;
use crate::processing::scorer::round2;
use crate::processing::vector_index::JobRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFitRow {
    pub candidate_name: String,
    pub job_title: String,
    pub job_fit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    HighlyQualified,
    WellQualified,
    ModeratelyQualified,
    EntryLevel,
    NeedsDevelopment,
}

impl ReadinessLevel {
    pub fn from_fit(job_fit: f64) -> Self {
        if job_fit >= 0.8 {
            ReadinessLevel::HighlyQualified
        } else if job_fit >= 0.6 {
            ReadinessLevel::WellQualified
        } else if job_fit >= 0.4 {
            ReadinessLevel::ModeratelyQualified
        } else if job_fit >= 0.2 {
            ReadinessLevel::EntryLevel
        } else {
            ReadinessLevel::NeedsDevelopment
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReadinessLevel::HighlyQualified => "Highly Qualified",
            ReadinessLevel::WellQualified => "Well Qualified",
            ReadinessLevel::ModeratelyQualified => "Moderately Qualified",
            ReadinessLevel::EntryLevel => "Entry Level",
            ReadinessLevel::NeedsDevelopment => "Needs Development",
        };
        write!(f, "{}", label)
    }
}

fn lowered_set<S: AsRef<str>>(skills: &[S]) -> HashSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Share of distinct required skills the candidate lists verbatim (case-insensitive),
/// rounded to two decimals. No fuzzy matching here.
pub fn job_fit<C: AsRef<str>, R: AsRef<str>>(candidate_skills: &[C], required_skills: &[R]) -> f64 {
    let required = lowered_set(required_skills);
    if required.is_empty() {
        return 0.0;
    }
    let candidate = lowered_set(candidate_skills);
    let overlap = required.intersection(&candidate).count();
    round2(overlap as f64 / required.len() as f64)
}

/// One row per (profile, record) pair, profile-major
pub fn compute_job_fit(profiles: &[CandidateProfile], records: &[JobRecord]) -> Vec<JobFitRow> {
    let rows: Vec<JobFitRow> = profiles
        .par_iter()
        .flat_map_iter(|profile| {
            records.iter().map(move |record| JobFitRow {
                candidate_name: profile.name.clone(),
                job_title: record.job_title.clone(),
                job_fit: job_fit(profile.skills.as_slice(), &record.skills_required),
            })
        })
        .collect();

    log::info!(
        "Computed {} job fit scores ({} candidates x {} jobs)",
        rows.len(),
        profiles.len(),
        records.len()
    );
    rows
}

pub fn write_job_fit_csv(rows: &[JobFitRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("Job fit scores for {} pairs saved to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, skills: &[&str]) -> JobRecord {
        JobRecord {
            job_title: title.to_string(),
            industry: String::new(),
            description: String::new(),
            skills_required: skills.iter().map(|s| s.to_string()).collect(),
            experience_required: String::new(),
        }
    }

    #[test]
    fn test_job_fit_exact_case_insensitive() {
        assert_eq!(job_fit(&["python", "SQL"], &["Python", "SQL", "Docker", "AWS"]), 0.5);
        assert_eq!(job_fit(&["Python 3"], &["Python"]), 0.0);
        assert_eq!(job_fit(&["Rust"], &["rust", "RUST"]), 1.0);
        assert_eq!(job_fit(&["Go", "Rust", "C"], &["Go", "Rust", "Zig"]), 0.67);
    }

    #[test]
    fn test_job_fit_eighths_round_half_to_even() {
        let required: Vec<String> = (0..8).map(|i| format!("S{}", i)).collect();

        assert_eq!(job_fit(&["S0"], &required), 0.12);
        assert_eq!(job_fit(&["S0", "S1", "S2"], &required), 0.38);
        assert_eq!(job_fit(&["S0", "S1", "S2", "S3", "S4"], &required), 0.62);
        assert_eq!(job_fit(&["S0", "S1", "S2", "S3", "S4", "S5", "S6"], &required), 0.88);
    }

    #[test]
    fn test_job_fit_empty_required() {
        let required: [&str; 0] = [];
        assert_eq!(job_fit(&["Python"], &required), 0.0);
        assert_eq!(job_fit(&["Python"], &["  "]), 0.0);
    }

    #[test]
    fn test_rows_are_profile_major() {
        let profiles = vec![
            CandidateProfile::new("Alice", &["Python", "SQL"], 3),
            CandidateProfile::new("Bob", &["Java"], 1),
        ];
        let records = vec![record("Analyst", &["SQL", "Excel"]), record("Backend", &["Java", "SQL"])];

        let rows = compute_job_fit(&profiles, &records);
        let pairs: Vec<(&str, &str, f64)> = rows
            .iter()
            .map(|r| (r.candidate_name.as_str(), r.job_title.as_str(), r.job_fit))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("Alice", "Analyst", 0.5),
                ("Alice", "Backend", 0.5),
                ("Bob", "Analyst", 0.0),
                ("Bob", "Backend", 0.5),
            ]
        );
    }

    #[test]
    fn test_readiness_levels() {
        assert_eq!(ReadinessLevel::from_fit(0.8), ReadinessLevel::HighlyQualified);
        assert_eq!(ReadinessLevel::from_fit(0.6), ReadinessLevel::WellQualified);
        assert_eq!(ReadinessLevel::from_fit(0.4), ReadinessLevel::ModeratelyQualified);
        assert_eq!(ReadinessLevel::from_fit(0.2), ReadinessLevel::EntryLevel);
        assert_eq!(ReadinessLevel::from_fit(0.19), ReadinessLevel::NeedsDevelopment);
        assert_eq!(ReadinessLevel::EntryLevel.to_string(), "Entry Level");
    }
}
