//! Candidate profiles and experience bands

use crate::processing::normalizer::SkillSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub current_role: Option<String>,
    pub skills: SkillSet,
    pub experience_years: u32,
}

impl CandidateProfile {
    pub fn new<S: AsRef<str>>(name: impl Into<String>, skills: &[S], experience_years: u32) -> Self {
        Self {
            name: name.into(),
            current_role: None,
            skills: skills.iter().collect(),
            experience_years,
        }
    }

    pub fn with_current_role(mut self, role: impl Into<String>) -> Self {
        self.current_role = Some(role.into());
        self
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        ExperienceLevel::from_years(self.experience_years)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Junior,
    MidLevel,
    Senior,
}

impl ExperienceLevel {
    pub fn from_years(years: u32) -> Self {
        if years < 2 {
            ExperienceLevel::Junior
        } else if years < 5 {
            ExperienceLevel::MidLevel
        } else {
            ExperienceLevel::Senior
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
        };
        write!(f, "{}", label)
    }
}
