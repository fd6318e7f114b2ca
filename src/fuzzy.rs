//! Ranked fuzzy filtering of the inventory.
//!
//! A candidate matches when every query character appears in it, in order,
//! ignoring case. Matches are ordered by how many characters the candidate
//! has beyond the query (for a subsequence match this is exactly the edit
//! distance between the two), then by the skim score, then by inventory order.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use std::cmp::Ordering;

/// One inventory entry that matched a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    /// Position of the entry in the inventory that was ranked.
    pub index: usize,
    /// Characters that would have to be deleted from the entry to get the query.
    pub distance: usize,
    /// Skim match quality, higher is better.
    pub score: i64,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.score.cmp(&self.score))
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable ranker; building the matcher once avoids reallocating per keystroke.
pub struct FuzzyFilter {
    matcher: SkimMatcherV2,
}

impl Default for FuzzyFilter {
    fn default() -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }
}

impl FuzzyFilter {
    /// Rank `inventory` against `query`, best match first.
    ///
    /// An empty query matches nothing here; "show everything" is the caller's
    /// browse view, not a ranking.
    pub fn rank<S: AsRef<str>>(&self, query: &str, inventory: &[S]) -> Vec<Ranked> {
        if query.is_empty() {
            return Vec::new();
        }
        let query_len = query.chars().count();
        let mut ranked: Vec<Ranked> = inventory
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let candidate = candidate.as_ref();
                let score = self.matcher.fuzzy_match(candidate, query)?;
                Some(Ranked {
                    index,
                    distance: candidate.chars().count().saturating_sub(query_len),
                    score,
                })
            })
            .collect();
        ranked.sort_unstable();
        ranked
    }
}

/// Convenience wrapper returning the matching paths themselves.
pub fn rank(query: &str, inventory: &[String]) -> Vec<String> {
    FuzzyFilter::default()
        .rank(query, inventory)
        .into_iter()
        .map(|r| inventory[r.index].clone())
        .collect()
}
