//! Skill token normalization and case-insensitive skill sets

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Canonical comparison form of a skill: trimmed and case-folded.
///
/// Whitespace-only input yields an empty string, which must never be stored
/// as a skill.
pub fn normalize_skill(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Skills unique by normalized form, keeping the first spelling seen for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkillSet {
    skills: Vec<String>,
    normalized: HashSet<String>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw skill. Returns false when it was empty or already present.
    pub fn insert(&mut self, raw: &str) -> bool {
        let normalized = normalize_skill(raw);
        if normalized.is_empty() || self.normalized.contains(&normalized) {
            return false;
        }
        self.normalized.insert(normalized);
        self.skills.push(raw.trim().to_string());
        true
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.normalized.contains(&normalize_skill(raw))
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Display spellings in insertion order
    pub fn as_slice(&self) -> &[String] {
        &self.skills
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.skills.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(skill.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for SkillSet {
    fn from(skills: Vec<String>) -> Self {
        skills.into_iter().collect()
    }
}

impl From<SkillSet> for Vec<String> {
    fn from(set: SkillSet) -> Self {
        set.skills
    }
}

/// Split a comma separated skill list, dropping empty entries
pub fn split_skill_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
