//! Fuzzy subsequence ranking.
//!
//! A query matches a candidate when its characters appear in the candidate's
//! search text in order, ignoring case and, for plain queries, accents.
//! `nucleo-matcher` decides the match and places the query in the text; the
//! placement is then graded by contiguous runs, skipped characters inside the
//! match, start offset and search text length, in that order. The sort is
//! stable, so equal scores keep corpus order.
//!
//! Scores are only comparable within one query. A match always scores above
//! [`NEUTRAL_SCORE`], which is what every candidate gets for an empty query.

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config as NucleoConfig, Utf32Str};
use serde::Serialize;
use tracing::trace;

use crate::index::SearchableRecord;

/// Score given to every candidate when the query is empty.
pub const NEUTRAL_SCORE: i64 = 0;

/// Best possible score; penalties are subtracted from it.
const PERFECT_SCORE: i64 = 1 << 60;

// Each penalty component is saturated to its field width before packing so
// a larger component can never spill into the one above it.
const BREAKS_MAX: usize = 0xFFF;
const FIELD_MAX: usize = 0xFFFF;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Position of the candidate in the index it was ranked from.
    pub candidate: usize,
    pub score: i64,
    /// Matched character offsets (in `char`s) within the search text.
    pub positions: Vec<usize>,
}

/// Outcome of matching one query against one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub score: i64,
    pub positions: Vec<usize>,
    pub quality: MatchQuality,
}

/// Breakdown of a match, worst component first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchQuality {
    /// Contiguous runs the query was split into (1 = one unbroken run).
    pub runs: usize,
    /// Unmatched characters between the first and last matched character.
    pub gaps: usize,
    /// Offset of the first matched character.
    pub first: usize,
    /// Length of the search text in characters.
    pub text_len: usize,
}

impl MatchQuality {
    /// Grade sorted match positions in a text of `text_len` chars.
    pub fn from_positions(positions: &[usize], text_len: usize) -> Option<Self> {
        let (&first, &last) = (positions.first()?, positions.last()?);
        Some(Self {
            runs: 1 + positions.windows(2).filter(|w| w[1] != w[0] + 1).count(),
            gaps: last + 1 - first - positions.len(),
            first,
            text_len,
        })
    }

    pub fn score(&self) -> i64 {
        let breaks = self.runs.saturating_sub(1).min(BREAKS_MAX) as i64;
        let gaps = self.gaps.min(FIELD_MAX) as i64;
        let first = self.first.min(FIELD_MAX) as i64;
        let len = self.text_len.min(FIELD_MAX) as i64;
        PERFECT_SCORE - ((breaks << 48) | (gaps << 32) | (first << 16) | len)
    }
}

/// Folding a plain (ASCII) query sees on both sides of a match: accents
/// stripped, then lowercased.
pub fn fold_char(c: char) -> char {
    nucleo_matcher::chars::to_lower_case(nucleo_matcher::chars::normalize(c))
}

/// A query prepared for matching against many texts.
///
/// The query is one literal fuzzy atom, so spaces and `^` are matched as
/// ordinary characters rather than parsed as pattern syntax.
pub struct Matcher {
    atom: Option<Atom>,
    matcher: nucleo_matcher::Matcher,
    haystack: Vec<char>,
    indices: Vec<u32>,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher").field("atom", &self.atom).finish_non_exhaustive()
    }
}

impl Matcher {
    pub fn new(query: &str) -> Self {
        let atom = (!query.is_empty()).then(|| {
            Atom::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
                false,
            )
        });
        Self {
            atom,
            matcher: nucleo_matcher::Matcher::new(NucleoConfig::DEFAULT),
            haystack: Vec::with_capacity(64),
            indices: Vec::new(),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.atom.is_none()
    }

    /// Match against `text`, or `None` when the query is not a subsequence.
    pub fn matches(&mut self, text: &str) -> Option<FuzzyMatch> {
        let Some(atom) = &self.atom else {
            return Some(FuzzyMatch {
                score: NEUTRAL_SCORE,
                positions: Vec::new(),
                quality: MatchQuality {
                    runs: 0,
                    gaps: 0,
                    first: 0,
                    text_len: text.chars().count(),
                },
            });
        };

        self.haystack.clear();
        self.indices.clear();
        let haystack = Utf32Str::new(text, &mut self.haystack);
        let text_len = haystack.len();
        atom.indices(haystack, &mut self.matcher, &mut self.indices)?;

        self.indices.sort_unstable();
        self.indices.dedup();
        let positions: Vec<usize> = self.indices.iter().map(|&i| i as usize).collect();
        let quality = MatchQuality::from_positions(&positions, text_len)?;
        Some(FuzzyMatch {
            score: quality.score(),
            positions,
            quality,
        })
    }
}

/// Convenience wrapper around [`Matcher`] for a single text.
pub fn fuzzy_match(query: &str, text: &str) -> Option<FuzzyMatch> {
    Matcher::new(query).matches(text)
}

/// Rank `candidates` against `query`, best first, at most `limit` results.
///
/// An empty query returns the first `limit` candidates in corpus order with
/// [`NEUTRAL_SCORE`].
pub fn rank(query: &str, candidates: &[SearchableRecord], limit: usize) -> Vec<MatchResult> {
    let mut matcher = Matcher::new(query);
    if matcher.is_empty() {
        return (0..candidates.len().min(limit))
            .map(|candidate| MatchResult {
                candidate,
                score: NEUTRAL_SCORE,
                positions: Vec::new(),
            })
            .collect();
    }

    let mut results: Vec<MatchResult> = candidates
        .iter()
        .enumerate()
        .filter_map(|(candidate, record)| {
            matcher.matches(&record.search_text).map(|m| MatchResult {
                candidate,
                score: m.score,
                positions: m.positions,
            })
        })
        .collect();
    let matched = results.len();

    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);

    trace!(target: "rank", query, candidates = candidates.len(), matched, shown = results.len());
    results
}
