use similar::{Algorithm, DiffOp, TextDiff};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Ratio of matching characters between `a` and `b`, in `[0, 1]`.
///
/// Computed as `2 * M / (len(a) + len(b))` where `M` counts the characters in
/// the matching blocks of a character-level diff. Two empty strings are
/// identical and score `1.0`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_chars(a, b);
    let matched: usize = diff
        .ops()
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum();

    2.0 * matched as f64 / total as f64
}

pub fn are_strs_similar(a: &str, b: &str, threshold: f64) -> bool {
    similarity_ratio(a, b) >= threshold
}

pub fn are_strs_similar_default(a: &str, b: &str) -> bool {
    are_strs_similar(a, b, DEFAULT_SIMILARITY_THRESHOLD)
}
