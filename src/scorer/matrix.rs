//! Flat score and traceback matrices, allocated once and reused.

use super::Score;
use super::constants::{MATRIX_LIMIT, UNREACHABLE};

/// Score matrix plus a parallel predecessor matrix for back-tracing.
///
/// Both are fixed `MATRIX_LIMIT × MATRIX_LIMIT` flat buffers; rows are
/// cleared lazily, one row ahead of the fill, so a call only touches the
/// cells its inputs can reach.
pub(super) struct ScoreMatrix {
    scores: Vec<Score>,
    preds: Vec<u8>,
}

impl ScoreMatrix {
    pub fn new() -> Self {
        Self {
            scores: vec![UNREACHABLE; MATRIX_LIMIT * MATRIX_LIMIT],
            preds: vec![0; MATRIX_LIMIT * MATRIX_LIMIT],
        }
    }

    #[inline]
    pub fn score(&self, i: usize, j: usize) -> Score {
        self.scores[i * MATRIX_LIMIT + j]
    }

    /// Column at which the preceding query byte was matched.
    #[inline]
    pub fn pred(&self, i: usize, j: usize) -> usize {
        self.preds[i * MATRIX_LIMIT + j] as usize
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, score: Score, pred: usize) {
        self.scores[i * MATRIX_LIMIT + j] = score;
        self.preds[i * MATRIX_LIMIT + j] = pred as u8;
    }

    /// Reset columns `0..cols` of row `i` to unreachable.
    pub fn clear_row(&mut self, i: usize, cols: usize) {
        let base = i * MATRIX_LIMIT;
        self.scores[base..base + cols].fill(UNREACHABLE);
    }

    /// Length of the contiguous match run ending at cell `(i, j)`, found by
    /// following the predecessor chain while each step is adjacent.
    pub fn run_length(&self, mut i: usize, mut j: usize) -> u32 {
        let mut len = 1;
        while i > 0 {
            let k = self.pred(i, j);
            if k + 1 != j {
                break;
            }
            len += 1;
            i -= 1;
            j = k;
        }
        len
    }
}
