// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------
use super::Score;

/// Points awarded for every matched byte.
pub(super) const MATCH_BASE: Score = 1;

/// Extra point when the query byte equals the path byte without folding.
pub(super) const EXACT_CASE_BONUS: Score = 1;

/// Match at the very start of the path.
pub(super) const START_OF_STRING_BONUS: Score = 8;

/// Match right after `/`, `\`, `-` or `_`.
pub(super) const AFTER_SEPARATOR_BONUS: Score = 5;

/// Match right after `.` (extensions, dotted names).
pub(super) const AFTER_DOT_BONUS: Score = 4;

/// Lowercase-to-uppercase transition in the path.
pub(super) const CAMEL_BONUS: Score = 2;

/// Consecutive match while the run is at most three long.
pub(super) const CONSECUTIVE_BONUS: Score = 6;

/// Consecutive match once the run is four or longer.
pub(super) const CONSECUTIVE_TAIL_BONUS: Score = 3;

/// Upper bound on both matrix dimensions. Longer inputs are truncated to
/// their first `MATRIX_LIMIT` bytes for scoring purposes.
pub const MATRIX_LIMIT: usize = 128;

/// Upper bound on what a single matched byte can contribute; the thresholded
/// scorer's early-exit gates rely on this staying a true upper bound for the
/// whole table above.
pub(super) const MAX_CHAR_SCORE: Score =
    MATCH_BASE + EXACT_CASE_BONUS + START_OF_STRING_BONUS + CONSECUTIVE_BONUS;

/// Sentinel for matrix cells no alignment reaches.
pub(super) const UNREACHABLE: Score = i32::MIN / 2;
