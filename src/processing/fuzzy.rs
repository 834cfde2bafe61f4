//! Threshold-based fuzzy skill matching

use crate::processing::normalizer::normalize_skill;
use serde::{Deserialize, Serialize};

/// Score for a substring relation between two normalized skills
pub const SUBSTRING_SCORE: f64 = 0.9;

/// A candidate-side skill accepted for a required skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMatch {
    pub candidate: String,
    pub score: f64,
}

/// Similarity between two skill tokens in [0, 1].
///
/// Exact normalized equality scores 1.0, containment 0.9, otherwise the
/// Ratcliff/Obershelp ratio, reported as 0.0 when it falls below `threshold`.
pub fn similarity(a: &str, b: &str, threshold: f64) -> f64 {
    let a = normalize_skill(a);
    let b = normalize_skill(b);

    if a == b {
        return 1.0;
    }

    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        return SUBSTRING_SCORE;
    }

    let ratio = sequence_ratio(&a, &b);
    if ratio >= threshold {
        ratio
    } else {
        0.0
    }
}

/// Best scoring candidate at or above `threshold`; the first of equal scores wins.
pub fn find_best_match<S: AsRef<str>>(skill: &str, candidates: &[S], threshold: f64) -> Option<BestMatch> {
    let mut best: Option<BestMatch> = None;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let score = similarity(skill, candidate, threshold);
        if score < threshold {
            continue;
        }
        let better = match &best {
            Some(current) => score > current.score,
            None => true,
        };
        if better {
            best = Some(BestMatch {
                candidate: candidate.to_string(),
                score,
            });
        }
    }

    best
}

/// Split required skills into (matched candidate tokens, missing required tokens).
///
/// Both outputs follow the order of `required_skills`.
pub fn match_skills<C: AsRef<str>, R: AsRef<str>>(
    candidate_skills: &[C],
    required_skills: &[R],
    threshold: f64,
) -> (Vec<String>, Vec<String>) {
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for required in required_skills {
        let required = required.as_ref();
        match find_best_match(required, candidate_skills, threshold) {
            Some(best) => matched.push(best.candidate),
            None => missing.push(required.to_string()),
        }
    }

    (matched, missing)
}

/// Ratcliff/Obershelp similarity `2 * M / (|a| + |b|)` over chars.
///
/// M sums the longest common blocks found recursively on both sides of each
/// block. Among equally long blocks the one starting earliest in `a`, then in
/// `b`, is taken.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches = matching_characters(&a, &b);
    2.0 * matches as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matches = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matches += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matches
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as (i, j, size)
fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    // run[k + 1] is the length of the common run ending at a[i - 1], b[blo + k]
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in alo..ahi {
        for k in 0..width {
            let j = blo + k;
            current[k + 1] = if a[i] == b[j] { previous[k] + 1 } else { 0 };
            let size = current[k + 1];
            if size > best.2 {
                best = (i + 1 - size, j + 1 - size, size);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}
