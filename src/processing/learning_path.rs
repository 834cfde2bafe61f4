//! Learning path scheduling for missing skills

use serde::{Deserialize, Serialize};
use std::fmt;

/// Weeks allotted to every step
pub const WEEKS_PER_STEP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl DifficultyLevel {
    const LEVELS: [DifficultyLevel; 4] = [
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
        DifficultyLevel::Expert,
    ];

    /// Two skills per level, capped at Expert
    pub fn for_position(index: usize) -> Self {
        Self::LEVELS[(index / 2).min(Self::LEVELS.len() - 1)]
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
            DifficultyLevel::Expert => "Expert",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPathStep {
    pub skill: String,
    pub start_week: u32,
    pub end_week: u32,
    pub difficulty: DifficultyLevel,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub steps: Vec<LearningPathStep>,
    pub total_weeks: u32,
}

impl LearningPath {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Schedule consecutive fixed-length steps, one per skill, in the given order.
///
/// Callers cap the list beforehand; every skill passed in gets a step.
pub fn build_learning_path<S: AsRef<str>>(missing_skills: &[S]) -> LearningPath {
    let mut steps = Vec::with_capacity(missing_skills.len());
    let mut start_week = 1;

    for (index, skill) in missing_skills.iter().enumerate() {
        let skill = skill.as_ref();
        let difficulty = DifficultyLevel::for_position(index);
        let end_week = start_week + WEEKS_PER_STEP;

        steps.push(LearningPathStep {
            skill: skill.to_string(),
            start_week,
            end_week,
            difficulty,
            resources: resources_for(skill, difficulty),
        });

        start_week = end_week;
    }

    let total_weeks = steps.last().map(|step| step.end_week).unwrap_or(WEEKS_PER_STEP);

    LearningPath { steps, total_weeks }
}

/// Ordered study suggestions; harder steps get more of them
pub fn resources_for(skill: &str, difficulty: DifficultyLevel) -> Vec<String> {
    let mut resources = vec![
        format!("Udemy course on {}", skill),
        format!("Official {} documentation", skill),
        format!("Free online tutorials for {}", skill),
        format!("Practice projects using {}", skill),
        format!("Community forums and discussions on {}", skill),
    ];

    match difficulty {
        DifficultyLevel::Beginner => {}
        DifficultyLevel::Intermediate => {
            resources.push(format!("Advanced projects in {}", skill));
        }
        DifficultyLevel::Advanced | DifficultyLevel::Expert => {
            resources.push(format!("Contribute to {} open-source projects", skill));
            resources.push(format!("Read research papers on {}", skill));
        }
    }

    resources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_four_week_steps() {
        let path = build_learning_path(&["Docker", "Kubernetes", "Terraform"]);

        let weeks: Vec<(u32, u32)> = path.steps.iter().map(|s| (s.start_week, s.end_week)).collect();
        assert_eq!(weeks, vec![(1, 5), (5, 9), (9, 13)]);
        assert_eq!(path.total_weeks, 13);
    }

    #[test]
    fn test_empty_path_is_four_weeks() {
        let skills: [&str; 0] = [];
        let path = build_learning_path(&skills);
        assert!(path.is_empty());
        assert_eq!(path.total_weeks, 4);
    }

    #[test]
    fn test_difficulty_is_monotonic_and_capped() {
        let skills: Vec<String> = (0..10).map(|i| format!("skill{}", i)).collect();
        let path = build_learning_path(&skills);

        let levels: Vec<DifficultyLevel> = path.steps.iter().map(|s| s.difficulty).collect();
        assert_eq!(levels[0], DifficultyLevel::Beginner);
        assert_eq!(levels[1], DifficultyLevel::Beginner);
        assert_eq!(levels[2], DifficultyLevel::Intermediate);
        assert_eq!(levels[5], DifficultyLevel::Advanced);
        assert_eq!(levels[6], DifficultyLevel::Expert);
        assert_eq!(levels[9], DifficultyLevel::Expert);
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_resources_grow_with_difficulty() {
        let beginner = resources_for("Rust", DifficultyLevel::Beginner);
        let intermediate = resources_for("Rust", DifficultyLevel::Intermediate);
        let expert = resources_for("Rust", DifficultyLevel::Expert);

        assert_eq!(beginner.len(), 5);
        assert_eq!(beginner[0], "Udemy course on Rust");
        assert_eq!(intermediate.last().unwrap(), "Advanced projects in Rust");
        assert_eq!(expert.len(), 7);
        assert_eq!(expert[6], "Read research papers on Rust");
    }
}
