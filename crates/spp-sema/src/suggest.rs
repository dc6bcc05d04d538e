//! "Did you mean" suggestions for failed lookups

/// Ratcliff/Obershelp similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Characters covered by the longest common block, recursively on both sides.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_characters(&a[..start_a], &b[..start_b])
        + matching_characters(&a[start_a + len..], &b[start_b + len..])
}

/// Leftmost longest common substring as `(start_a, start_b, len)`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut row = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                row[j + 1] = prev[j] + 1;
                if row[j + 1] > best.2 {
                    best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
                }
            }
        }
        prev = row;
    }
    best
}

/// Best candidate for `query`, or `None` when nothing is similar enough.
///
/// The score is the larger of the two argument orders. Ties prefer the
/// candidate closest in length to the query, then lexical order. Names
/// starting with `__` are never suggested.
pub fn closest(query: &str, candidates: &[String]) -> Option<String> {
    const THRESHOLD: f64 = 0.6;

    let query_len = query.chars().count() as i64;
    let mut best: Option<(f64, i64, &String)> = None;

    for candidate in candidates {
        if candidate.starts_with("__") || candidate == query {
            continue;
        }
        let score = similarity(query, candidate).max(similarity(candidate, query));
        if score < THRESHOLD {
            continue;
        }
        let distance = (candidate.chars().count() as i64 - query_len).abs();
        let better = match &best {
            None => true,
            Some((s, d, name)) => {
                score > *s || (score == *s && (distance < *d || (distance == *d && candidate < *name)))
            }
        };
        if better {
            best = Some((score, distance, candidate));
        }
    }

    best.map(|(_, _, name)| name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        let s = similarity("counter", "countr");
        assert!(s > 0.9 && s < 1.0);
    }

    #[test]
    fn test_closest_prefers_most_similar() {
        let pool = names(&["length", "lent", "width"]);
        assert_eq!(closest("lenght", &pool).as_deref(), Some("length"));
    }

    #[test]
    fn test_closest_skips_dunder_names() {
        let pool = names(&["__set__", "set"]);
        assert_eq!(closest("__sett__", &pool), None);
        assert_eq!(closest("sett", &pool).as_deref(), Some("set"));
    }

    #[test]
    fn test_equal_scores_break_on_name() {
        let pool = names(&["xb", "xa"]);
        assert_eq!(closest("x", &pool).as_deref(), Some("xa"));
    }

    #[test]
    fn test_nothing_similar() {
        assert_eq!(closest("zzz", &names(&["alpha", "beta"])), None);
    }
}
