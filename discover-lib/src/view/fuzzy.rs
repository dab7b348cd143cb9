//! Fuzzy global search using nucleo-matcher.
//!
//! Matches are ranked in tiers first (exact cell, cell prefix, word prefix,
//! contiguous substring, scattered fuzzy match) and by nucleo's fuzzy score
//! within a tier.

use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use nucleo_matcher::pattern::Atom;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;

/// How closely a cell matches the query, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    /// Query characters appear in order but not contiguously.
    Fuzzy,
    /// Query appears somewhere inside the cell.
    Contains,
    /// Query starts one of the cell's words.
    WordStart,
    /// Cell starts with the query.
    StartsWith,
    /// Cell equals the query.
    Equal,
}

/// Rank of a match. Orders by tier, then by fuzzy score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchRank {
    pub tier: MatchTier,
    pub score: u32,
}

/// Ranks cell text against a global search query.
///
/// Holds the compiled atoms and a reusable matcher so a whole row set can
/// be ranked without reallocating per cell.
pub struct FuzzyRanker {
    matcher: Matcher,
    fuzzy: Pattern,
    exact: Atom,
    prefix: Atom,
    substring: Atom,
    buf: Vec<char>,
}

impl FuzzyRanker {
    /// Compiles a query. Returns `None` for a blank query (nothing to rank).
    pub fn new(query: &str) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let atom = |kind| {
            Atom::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                kind,
                false,
            )
        };
        Some(Self {
            matcher: Matcher::new(Config::DEFAULT),
            fuzzy: Pattern::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
            ),
            exact: atom(AtomKind::Exact),
            prefix: atom(AtomKind::Prefix),
            substring: atom(AtomKind::Substring),
            buf: Vec::new(),
        })
    }

    /// Ranks one piece of text; `None` means no match.
    pub fn score(&mut self, text: &str) -> Option<MatchRank> {
        let haystack = Utf32Str::new(text, &mut self.buf);
        let fuzzy = self.fuzzy.score(haystack, &mut self.matcher);
        match (self.tier(text), fuzzy) {
            (None, None) => None,
            (tier, score) => Some(MatchRank {
                tier: tier.unwrap_or(MatchTier::Fuzzy),
                score: score.unwrap_or_default(),
            }),
        }
    }

    /// Best rank across several cells (a row passes if any cell matches).
    pub fn best_score<'a>(
        &mut self,
        cells: impl IntoIterator<Item = &'a str>,
    ) -> Option<MatchRank> {
        cells.into_iter().filter_map(|cell| self.score(cell)).max()
    }

    /// Contiguous tier of `text`, or `None` when the query only matches fuzzily.
    fn tier(&mut self, text: &str) -> Option<MatchTier> {
        if self.matches(&AtomKind::Exact, text) {
            return Some(MatchTier::Equal);
        }
        if self.matches(&AtomKind::Prefix, text) {
            return Some(MatchTier::StartsWith);
        }
        if !self.matches(&AtomKind::Substring, text) {
            return None;
        }
        for start in word_starts(text) {
            if self.matches(&AtomKind::Prefix, &text[start..]) {
                return Some(MatchTier::WordStart);
            }
        }
        Some(MatchTier::Contains)
    }

    fn matches(&mut self, kind: &AtomKind, text: &str) -> bool {
        let atom = match kind {
            AtomKind::Exact => &self.exact,
            AtomKind::Prefix => &self.prefix,
            _ => &self.substring,
        };
        let haystack = Utf32Str::new(text, &mut self.buf);
        atom.score(haystack, &mut self.matcher).is_some()
    }
}

/// Byte offsets of every word after the first.
fn word_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices()
        .zip(text.chars().skip(1))
        .filter(|((_, prev), next)| !prev.is_alphanumeric() && next.is_alphanumeric())
        .map(|((index, prev), _)| index + prev.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_has_no_ranker() {
        assert!(FuzzyRanker::new("").is_none());
        assert!(FuzzyRanker::new("   ").is_none());
    }

    #[test]
    fn test_subsequence_match() {
        let mut ranker = FuzzyRanker::new("lvl").unwrap();
        assert_eq!(
            ranker.score("Lovelace").map(|rank| rank.tier),
            Some(MatchTier::Fuzzy)
        );
        assert!(ranker.score("Hopper").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let mut ranker = FuzzyRanker::new("ohio").unwrap();
        assert_eq!(
            ranker.score("OHIO").map(|rank| rank.tier),
            Some(MatchTier::Equal)
        );
    }

    #[test]
    fn test_tiers() {
        let mut ranker = FuzzyRanker::new("ann").unwrap();
        let tier = |ranker: &mut FuzzyRanker, text| ranker.score(text).map(|rank| rank.tier);
        assert_eq!(tier(&mut ranker, "Ann"), Some(MatchTier::Equal));
        assert_eq!(tier(&mut ranker, "Annette"), Some(MatchTier::StartsWith));
        assert_eq!(tier(&mut ranker, "Mary Anne"), Some(MatchTier::WordStart));
        assert_eq!(tier(&mut ranker, "Joanna"), Some(MatchTier::Contains));
        assert_eq!(
            tier(&mut ranker, "Arlington Avenue North"),
            Some(MatchTier::Fuzzy)
        );
    }

    #[test]
    fn test_substring_outranks_scattered_match() {
        let mut ranker = FuzzyRanker::new("ann").unwrap();
        let substring = ranker.score("Joanna").unwrap();
        let scattered = ranker.score("Arlington Avenue North").unwrap();
        assert!(substring > scattered);
    }

    #[test]
    fn test_word_starts() {
        let starts: Vec<usize> = word_starts("12 Elm-St.").collect();
        assert_eq!(starts, vec![3, 7]);
    }

    #[test]
    fn test_best_score_over_cells() {
        let mut ranker = FuzzyRanker::new("tex").unwrap();
        assert_eq!(
            ranker.best_score(["Ada", "Texas"]).map(|rank| rank.tier),
            Some(MatchTier::StartsWith)
        );
        assert!(ranker.best_score(["Ada", "Ohio"]).is_none());
    }
}
