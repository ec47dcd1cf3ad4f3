//! Fast token similarity calculation
//!
//! Edit distance and the normalized similarity derived from it, used by the
//! pattern scorer to compare single words.

/// Minimum number of single-character insertions, deletions and substitutions
/// turning `a` into `b`.
///
/// Classic dynamic-programming table, kept to two rows of the shorter string.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // Rows run over the shorter string
    let (long, short) = if a_chars.len() >= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    let n = short.len();
    if n == 0 {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=long.len() {
        curr[0] = i;
        for j in 1..=n {
            let substitution = prev[j - 1] + usize::from(long[i - 1] != short[j - 1]);
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            curr[j] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity between two tokens (0.0-1.0)
///
/// `1 - distance / max(len)`; two empty strings are identical, one empty
/// string is nothing alike.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 && b_len == 0 {
        return 1.0;
    }
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }

    let longest = a_len.max(b_len);
    1.0 - edit_distance(a, b) as f64 / longest as f64
}
