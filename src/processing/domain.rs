//! Keyword-density domain detection

use crate::error::{Result, SkillBridgeError};
use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A discipline and the lowercase phrases that signal it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Per-domain keyword hit count for a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: String,
    pub hits: usize,
}

/// Detects the dominant domain of free text.
///
/// Domains keep their configured order, which decides ties.
pub struct DomainDetector {
    domains: Vec<DomainKeywords>,
    matcher: Option<AhoCorasick>,
    /// Pattern id -> (domain index, keyword index within the domain)
    pattern_owner: Vec<(usize, usize)>,
}

impl DomainDetector {
    pub fn new(domains: Vec<DomainKeywords>) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut pattern_owner = Vec::new();

        for (domain_idx, domain) in domains.iter().enumerate() {
            for (keyword_idx, keyword) in domain.keywords.iter().enumerate() {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    continue;
                }
                patterns.push(keyword);
                pattern_owner.push((domain_idx, keyword_idx));
            }
        }

        let matcher = if patterns.is_empty() {
            None
        } else {
            // Standard semantics so overlapping phrases ("docker" in "dockerfile") all report
            let matcher = AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .match_kind(MatchKind::Standard)
                .build(&patterns)
                .map_err(|e| SkillBridgeError::Configuration(format!("Failed to build domain matcher: {}", e)))?;
            Some(matcher)
        };

        Ok(Self {
            domains,
            matcher,
            pattern_owner,
        })
    }

    /// Number of distinct keyword phrases of each domain contained in `text`
    pub fn score(&self, text: &str) -> Vec<DomainScore> {
        let mut hits = vec![0usize; self.domains.len()];

        if let Some(matcher) = &self.matcher {
            let lowered = text.to_lowercase();
            let mut seen: HashSet<(usize, usize)> = HashSet::new();
            for mat in matcher.find_overlapping_iter(&lowered) {
                let owner = self.pattern_owner[mat.pattern().as_usize()];
                if seen.insert(owner) {
                    hits[owner.0] += 1;
                }
            }
        }

        self.domains
            .iter()
            .zip(hits)
            .map(|(domain, hits)| DomainScore {
                domain: domain.name.clone(),
                hits,
            })
            .collect()
    }

    /// Domain with the strictly highest hit count, first in order on ties.
    /// `None` when no keyword of any domain occurs.
    pub fn detect(&self, text: &str) -> Option<String> {
        let mut best: Option<DomainScore> = None;
        for score in self.score(text) {
            let better = match &best {
                Some(current) => score.hits > current.hits,
                None => true,
            };
            if better {
                best = Some(score);
            }
        }

        best.filter(|score| score.hits > 0).map(|score| score.domain)
    }
}
