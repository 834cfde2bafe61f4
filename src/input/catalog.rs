//! Role requirement table and domain keyword map

use crate::config::MatchingConfig;
use crate::error::{Result, SkillBridgeError};
use crate::processing::domain::{DomainDetector, DomainKeywords};
use crate::processing::normalizer::SkillSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Minimum normalized similarity for a role name to be offered as a hint
const SUGGESTION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub name: String,
    pub skills: Vec<String>,
}

/// How a requested role name was resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoleResolution {
    Exact,
    CaseInsensitive,
    /// Unknown role; the fallback skill set was used
    Fallback { suggestion: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleLookup {
    pub requirement: RoleRequirement,
    pub resolution: RoleResolution,
}

impl RoleLookup {
    pub fn is_fallback(&self) -> bool {
        matches!(self.resolution, RoleResolution::Fallback { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCatalog {
    pub fallback_skills: Vec<String>,
    #[serde(default)]
    pub roles: Vec<RoleRequirement>,
    #[serde(default)]
    pub domains: Vec<DomainKeywords>,
}

impl RoleCatalog {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::parse(&content)?;
        log::info!(
            "Loaded catalog from {} ({} roles, {} domains)",
            path.display(),
            catalog.roles.len(),
            catalog.domains.len()
        );
        Ok(catalog)
    }

    /// The configured catalog file, or the built-in one
    pub fn from_config(config: &MatchingConfig) -> Result<Self> {
        match &config.catalog_path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let catalog: RoleCatalog = toml::from_str(content)
            .map_err(|e| SkillBridgeError::Configuration(format!("Failed to parse catalog: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if SkillSet::from_iter(&self.fallback_skills).is_empty() {
            return Err(SkillBridgeError::Configuration(
                "Catalog fallback_skills must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for role in &self.roles {
            let key = role.name.trim().to_lowercase();
            if key.is_empty() {
                return Err(SkillBridgeError::Configuration("Catalog role with empty name".to_string()));
            }
            if !seen.insert(key) {
                return Err(SkillBridgeError::Configuration(format!(
                    "Duplicate catalog role: {}",
                    role.name
                )));
            }
        }
        Ok(())
    }

    /// Exact name first, then case-insensitive, else the fallback set
    pub fn lookup(&self, role: &str) -> RoleLookup {
        let wanted = role.trim();

        if let Some(found) = self.roles.iter().find(|r| r.name == wanted) {
            return RoleLookup {
                requirement: found.clone(),
                resolution: RoleResolution::Exact,
            };
        }

        let lowered = wanted.to_lowercase();
        if let Some(found) = self.roles.iter().find(|r| r.name.to_lowercase() == lowered) {
            return RoleLookup {
                requirement: found.clone(),
                resolution: RoleResolution::CaseInsensitive,
            };
        }

        let suggestion = self.closest_role(wanted);
        match &suggestion {
            Some(name) => log::warn!("Unknown role '{}', using fallback skills (did you mean '{}'?)", wanted, name),
            None => log::warn!("Unknown role '{}', using fallback skills", wanted),
        }

        RoleLookup {
            requirement: RoleRequirement {
                name: wanted.to_string(),
                skills: self.fallback_skills.clone(),
            },
            resolution: RoleResolution::Fallback { suggestion },
        }
    }

    /// Most similar known role name, if any is reasonably close
    pub fn closest_role(&self, role: &str) -> Option<String> {
        let lowered = role.to_lowercase();
        self.roles
            .iter()
            .map(|r| (r, strsim::normalized_levenshtein(&lowered, &r.name.to_lowercase())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .fold(None, |best: Option<(&RoleRequirement, f64)>, (r, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((r, score)),
            })
            .map(|(r, _)| r.name.clone())
    }

    pub fn domain_detector(&self) -> Result<DomainDetector> {
        DomainDetector::new(self.domains.clone())
    }
}
