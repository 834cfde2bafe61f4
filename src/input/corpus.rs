//! CSV loading for job description corpora and resume collections

use crate::error::{Result, SkillBridgeError};
use crate::processing::normalizer::split_skill_list;
use crate::processing::profile::CandidateProfile;
use crate::processing::vector_index::JobRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s,]").expect("Invalid character class regex"));
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Lowercase, keep only ASCII letters, digits, whitespace and commas, collapse runs of whitespace
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept = RE_DISALLOWED.replace_all(&lowered, "");
    RE_WHITESPACE.replace_all(&kept, " ").trim().to_string()
}

#[derive(Debug, Deserialize)]
struct JobDescriptionRow {
    job_title: String,
    #[serde(default)]
    industry: String,
    job_description: String,
    #[serde(default)]
    skills_required: String,
    #[serde(default)]
    experience_required: String,
}

impl From<JobDescriptionRow> for JobRecord {
    fn from(row: JobDescriptionRow) -> Self {
        JobRecord {
            job_title: row.job_title.trim().to_string(),
            industry: row.industry.trim().to_string(),
            description: clean_text(&row.job_description),
            skills_required: split_skill_list(&row.skills_required),
            experience_required: row.experience_required.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResumeRow {
    candidate_name: String,
    #[serde(default)]
    skills: String,
    #[serde(default)]
    job_role: Option<String>,
    #[serde(default)]
    experience_years: Option<u32>,
}

impl From<ResumeRow> for CandidateProfile {
    fn from(row: ResumeRow) -> Self {
        let skills = split_skill_list(&row.skills);
        let mut profile = CandidateProfile::new(row.candidate_name.trim(), &skills, row.experience_years.unwrap_or(0));
        profile.current_role = row.job_role.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        profile
    }
}

pub fn load_job_records(path: &Path) -> Result<Vec<JobRecord>> {
    let file = open_csv(path)?;
    let records = read_job_records(file)?;
    log::info!("Loaded {} job descriptions from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_job_records<R: Read>(reader: R) -> Result<Vec<JobRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize::<JobDescriptionRow>() {
        records.push(JobRecord::from(row?));
    }
    if records.is_empty() {
        return Err(SkillBridgeError::InvalidInput("Job description CSV is empty".to_string()));
    }
    Ok(records)
}

pub fn load_profiles(path: &Path) -> Result<Vec<CandidateProfile>> {
    let file = open_csv(path)?;
    let profiles = read_profiles(file)?;
    log::info!("Loaded {} candidate profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}

pub fn read_profiles<R: Read>(reader: R) -> Result<Vec<CandidateProfile>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut profiles = Vec::new();
    for row in csv_reader.deserialize::<ResumeRow>() {
        profiles.push(CandidateProfile::from(row?));
    }
    if profiles.is_empty() {
        return Err(SkillBridgeError::InvalidInput("Resume CSV is empty".to_string()));
    }
    Ok(profiles)
}

fn open_csv(path: &Path) -> Result<std::fs::File> {
    if !path.exists() {
        return Err(SkillBridgeError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    Ok(std::fs::File::open(path)?)
}
