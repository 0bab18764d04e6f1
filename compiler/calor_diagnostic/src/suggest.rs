//! "Did you mean?" suggestions.
//!
//! Fuzzy matching for identifier and tag-name suggestions using Levenshtein
//! edit distance. The matching algorithm is heuristic and not part of the
//! external contract; only the fact that a suggestion is offered is.

/// Levenshtein edit distance between two strings.
///
/// The minimum number of single-character insertions, deletions, or
/// substitutions required to change one string into the other.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Two-row optimization instead of the full matrix.
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.chars().enumerate() {
            let cost = usize::from(a_char != b_char);

            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Threshold scaled to the input length, so short names don't attract
/// unrelated suggestions.
fn default_threshold(name_len: usize) -> usize {
    match name_len {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        _ => 3,
    }
}

/// Find the candidate closest to `name` within the length-scaled threshold.
///
/// Ties are broken by candidate order, so callers with a stable candidate
/// list get deterministic suggestions.
pub fn suggest_similar<'a>(
    name: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<&'a str> {
    let threshold = default_threshold(name.chars().count());
    if threshold == 0 {
        return None;
    }

    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        if candidate == name {
            continue;
        }
        let distance = edit_distance(name, candidate);
        if distance <= threshold && best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("abc", ""), 3);
    }

    #[test]
    fn suggests_the_closest_candidate() {
        let candidates = ["length", "height", "width"];
        assert_eq!(
            suggest_similar("lenght", candidates.iter().copied()),
            Some("length")
        );
    }

    #[test]
    fn short_names_stay_strict() {
        let candidates = ["FOR", "FE", "F"];
        assert_eq!(suggest_similar("FO", candidates.iter().copied()), Some("FOR"));
        // Distance 1 from a 1-char name still suggests; unrelated names don't.
        assert_eq!(suggest_similar("zz", candidates.iter().copied()), None);
    }
}
