//! Similarity scoring between filename stems and record titles.
//!
//! The score is a Ratcliff/Obershelp ratio: the longest common block is
//! matched first, then the same search recurses on the unmatched text to its
//! left and right. With `M` matched characters and `T` total characters the
//! score is `2*M / T`.
//!
//! Both inputs are lower-cased before comparison and nothing else is
//! normalized, so whitespace and punctuation count as characters. No junk
//! heuristic is applied; for long strings with very frequent characters the
//! result can differ slightly from Python's `difflib`, but ranking stays
//! deterministic.

// ============================================================================
// Score Constants
// ============================================================================

/// Score reported for exact title matches.
pub const EXACT_SCORE: f64 = 1.0;

// ============================================================================
// Ratcliff/Obershelp
// ============================================================================

/// Case-insensitive similarity in `[0.0, 1.0]`.
///
/// Two empty strings are a trivial perfect match (1.0); one empty string
/// against a non-empty one scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return EXACT_SCORE;
    }

    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(&a[alo..ahi], &b[blo..bhi]);
        if k == 0 {
            continue;
        }
        total += k;

        let (i, j) = (alo + i, blo + j);
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common contiguous block as `(start_a, start_b, len)`.
///
/// Among equally long blocks the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            let k = if ca == cb { prev[j] + 1 } else { 0 };
            curr[j + 1] = k;
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

// ============================================================================
// TESTS
// ============================================================================
