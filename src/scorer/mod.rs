//! VSCode-style fuzzy relevance scoring for a single (query, path) pair.
//!
//! Matching runs in two stages: a linear ordered-subsequence pre-filter that
//! rejects non-candidates cheaply, then a bounded dynamic program over a
//! `MATRIX_LIMIT`-square score matrix with a parallel predecessor matrix for
//! back-tracing match positions.
//!
//! The scorer matches inside a *window* of the path: the full path for
//! queries containing a separator, the basename suffix otherwise. Position
//! bonuses consult the byte preceding the window (so the first basename
//! character still earns its after-separator bonus) and emitted positions
//! are absolute path offsets.

mod constants;
mod matrix;
mod prefilter;

pub use constants::MATRIX_LIMIT;
pub use prefilter::is_subsequence;

use constants::*;
use matrix::ScoreMatrix;

pub type Score = i32;

/// A successful match: relevance score plus one byte offset per (truncated)
/// query byte, strictly ascending. Positions borrow a buffer inside the
/// scorer and are only valid until the next scoring call.
pub struct ScoredMatch<'s> {
    pub score: Score,
    pub positions: &'s [u32],
}

/// Reusable scoring state. Both matrices are allocated once here; scoring a
/// pair never allocates.
pub struct Scorer {
    matrix: ScoreMatrix,
    positions: Vec<u32>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer {
    pub fn new() -> Self {
        Self {
            matrix: ScoreMatrix::new(),
            positions: Vec::with_capacity(MATRIX_LIMIT),
        }
    }

    /// Score `pattern` against the window of `text` starting at
    /// `window_start` (0 for the whole path). Callers supply both original
    /// and lowercase forms to avoid recomputing the fold per pair.
    ///
    /// Empty patterns and patterns longer than the window never match.
    pub fn score(
        &mut self,
        pattern: &str,
        pattern_lower: &str,
        text: &str,
        text_lower: &str,
        window_start: usize,
    ) -> Option<ScoredMatch<'_>> {
        self.score_impl(pattern, pattern_lower, text, text_lower, window_start, None)
    }

    /// Like [`Scorer::score`] but allowed to give up early once `threshold`
    /// is provably out of reach. Results at or above the threshold are
    /// identical to the unthresholded scorer's.
    pub fn score_with_threshold(
        &mut self,
        pattern: &str,
        pattern_lower: &str,
        text: &str,
        text_lower: &str,
        window_start: usize,
        threshold: Score,
    ) -> Option<ScoredMatch<'_>> {
        self.score_impl(
            pattern,
            pattern_lower,
            text,
            text_lower,
            window_start,
            Some(threshold),
        )
    }

    fn score_impl(
        &mut self,
        pattern: &str,
        pattern_lower: &str,
        text: &str,
        text_lower: &str,
        window_start: usize,
        threshold: Option<Score>,
    ) -> Option<ScoredMatch<'_>> {
        debug_assert_eq!(pattern.len(), pattern_lower.len());
        debug_assert_eq!(text.len(), text_lower.len());

        let text_bytes = text.as_bytes();
        let lower_bytes = text_lower.as_bytes();
        let window_start = window_start.min(text_bytes.len());
        let window_end = text_bytes.len().min(window_start + MATRIX_LIMIT);
        let cols = window_end - window_start;

        let n = pattern.len().min(MATRIX_LIMIT);
        if n == 0 || n > cols {
            return None;
        }
        let pat = &pattern.as_bytes()[..n];
        let pat_lower = &pattern_lower.as_bytes()[..n];

        if !is_subsequence(pat_lower, &lower_bytes[window_start..window_end]) {
            return None;
        }
        if let Some(threshold) = threshold
            && (n as Score) * MAX_CHAR_SCORE < threshold
        {
            return None;
        }

        // Row 0: every window column where the first query byte matches.
        self.matrix.clear_row(0, cols);
        let mut row_best = UNREACHABLE;
        for jm in 0..cols {
            let j = window_start + jm;
            if pat_lower[0] != lower_bytes[j] {
                continue;
            }
            let score = MATCH_BASE + exact_case(pat[0], text_bytes[j]) + position_bonus(text_bytes, j);
            self.matrix.set(0, jm, score, 0);
            row_best = row_best.max(score);
        }
        if row_best == UNREACHABLE || !clears_row_gate(row_best, n, 0, threshold) {
            return None;
        }

        for i in 1..n {
            self.matrix.clear_row(i, cols);
            row_best = UNREACHABLE;
            // Running maximum of the previous row over columns `..jm`; the
            // adjacent predecessor is special-cased for its consecutive bonus.
            let mut best_prev = UNREACHABLE;
            let mut best_prev_k = 0usize;
            for jm in i..cols {
                let k = jm - 1;
                let adjacent = self.matrix.score(i - 1, k);
                if adjacent > best_prev {
                    best_prev = adjacent;
                    best_prev_k = k;
                }

                let j = window_start + jm;
                if pat_lower[i] != lower_bytes[j] {
                    continue;
                }

                let mut predecessor =
                    (best_prev > UNREACHABLE).then_some((best_prev, best_prev_k));
                if adjacent > UNREACHABLE {
                    let run = self.matrix.run_length(i - 1, k) + 1;
                    let bonus = if run <= 3 {
                        CONSECUTIVE_BONUS
                    } else {
                        CONSECUTIVE_TAIL_BONUS
                    };
                    let chained = adjacent + bonus;
                    if predecessor.is_none_or(|(score, _)| chained > score) {
                        predecessor = Some((chained, k));
                    }
                }
                let Some((reached, pred)) = predecessor else {
                    continue;
                };

                let score =
                    reached + MATCH_BASE + exact_case(pat[i], text_bytes[j]) + position_bonus(text_bytes, j);
                self.matrix.set(i, jm, score, pred);
                row_best = row_best.max(score);
            }
            if row_best == UNREACHABLE || !clears_row_gate(row_best, n, i, threshold) {
                return None;
            }
        }

        // Argmax over the final row, then trace the alignment back.
        let mut best = UNREACHABLE;
        let mut best_jm = 0usize;
        for jm in (n - 1)..cols {
            let score = self.matrix.score(n - 1, jm);
            if score > best {
                best = score;
                best_jm = jm;
            }
        }
        debug_assert!(best > UNREACHABLE);

        self.positions.clear();
        let mut i = n - 1;
        let mut jm = best_jm;
        loop {
            self.positions.push((window_start + jm) as u32);
            if i == 0 {
                break;
            }
            jm = self.matrix.pred(i, jm);
            i -= 1;
        }
        self.positions.reverse();

        Some(ScoredMatch {
            score: best,
            positions: &self.positions,
        })
    }
}

#[inline]
fn exact_case(query: u8, text: u8) -> Score {
    if query == text { EXACT_CASE_BONUS } else { 0 }
}

/// Bonus for matching at text position `j`. The cases are mutually exclusive
/// in precedence order: start of string, separator, dot, camel boundary.
#[inline]
fn position_bonus(text: &[u8], j: usize) -> Score {
    if j == 0 {
        return START_OF_STRING_BONUS;
    }
    let prev = text[j - 1];
    match prev {
        b'/' | b'\\' | b'-' | b'_' => AFTER_SEPARATOR_BONUS,
        b'.' => AFTER_DOT_BONUS,
        _ if prev.is_ascii_lowercase() && text[j].is_ascii_uppercase() => CAMEL_BONUS,
        _ => 0,
    }
}

/// Row-wise early-exit gate: once even a perfect remainder cannot reach the
/// threshold, the pair is dead.
#[inline]
fn clears_row_gate(row_best: Score, n: usize, i: usize, threshold: Option<Score>) -> bool {
    let Some(threshold) = threshold else {
        return true;
    };
    let remaining = (n - 1 - i) as Score * MAX_CHAR_SCORE;
    row_best + remaining >= threshold
}
