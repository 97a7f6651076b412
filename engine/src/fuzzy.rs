//! Fuzzy scoring for history and directory search.
//!
//! A case-insensitive substring hit always scores above 100; an in-order
//! subsequence scores up to 50 plus 5 per adjacent pair of matches, capped
//! below 100 so long queries never outrank a substring hit. A score of 0
//! means the candidate is rejected.

const SUBSEQUENCE_CAP: f64 = 99.0;

/// Scores `candidate` against `query`.
///
/// # Examples
///
/// ```
/// use shellsense_engine::fuzzy::score;
///
/// assert!(score("readme.md", "rm") > 0.0);
/// assert_eq!(score("readme.md", "xyz"), 0.0);
/// assert!(score("cargo build", "build") > score("cargo build", "cgbd"));
/// ```
pub fn score(candidate: &str, query: &str) -> f64 {
    let candidate: Vec<char> = candidate.to_lowercase().chars().collect();
    let query: Vec<char> = query.to_lowercase().chars().collect();
    if candidate.is_empty() {
        return 0.0;
    }
    let candidate_len = candidate.len() as f64;

    if contains(&candidate, &query) {
        return 100.0 + (query.len() as f64 / candidate_len) * 50.0;
    }

    let mut next = 0;
    let mut previous: Option<usize> = None;
    let mut consecutive = 0usize;
    for (index, ch) in candidate.iter().enumerate() {
        if next == query.len() {
            break;
        }
        if *ch == query[next] {
            if previous.is_some_and(|p| p + 1 == index) {
                consecutive += 1;
            }
            previous = Some(index);
            next += 1;
        }
    }

    if next < query.len() {
        return 0.0;
    }
    ((next as f64 / candidate_len) * 50.0 + consecutive as f64 * 5.0).min(SUBSEQUENCE_CAP)
}


fn contains(haystack: &[char], needle: &[char]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Scores every item, drops rejections and returns the best `limit` in
/// descending score order. Equal scores keep their input order.
pub fn rank<T>(
    items: impl IntoIterator<Item = T>,
    query: &str,
    text: impl Fn(&T) -> &str,
    limit: usize,
) -> Vec<T> {
    let mut scored: Vec<(f64, T)> = items
        .into_iter()
        .filter_map(|item| {
            let s = score(text(&item), query);
            (s > 0.0).then_some((s, item))
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_score() {
        let s = score("readme.md", "read");
        assert!((s - (100.0 + 4.0 / 9.0 * 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_subsequence_score() {
        // r(0) e(1) a(2) d(3) m(4) e(5) . m d: "rm" matches r@0, m@4.
        let s = score("readme.md", "rm");
        assert!((s - 2.0 / 9.0 * 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_consecutive_bonus() {
        // r@0 e@1 d@3 m@4: two adjacent pairs.
        let run = score("readme.md", "redm");
        let base = 4.0 / 9.0 * 50.0;
        assert!((run - (base + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rejection() {
        assert_eq!(score("readme.md", "xyz"), 0.0);
        assert_eq!(score("abc", "abcd"), 0.0);
        assert_eq!(score("", "a"), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert!(score("Cargo.toml", "cargo") > 100.0);
    }

    #[test]
    fn test_substring_beats_subsequence() {
        assert!(score("long string with git inside", "git") > 100.0);
        assert!(score("g-i-t", "git") < 100.0);
    }

    #[test]
    fn test_long_subsequence_stays_below_substring() {
        let query = "abcdefghijklmnopqrstuvwxy";
        let gapped = score("abcdefghijkl_mnopqrstuvwxy", query);
        let substring = score("xx abcdefghijklmnopqrstuvwxy", query);
        assert!(gapped > 0.0);
        assert!(gapped < 100.0);
        assert!(substring > gapped);

        let ranked = rank(
            vec!["abcdefghijkl_mnopqrstuvwxy", "xx abcdefghijklmnopqrstuvwxy"],
            query,
            |s| *s,
            2,
        );
        assert_eq!(ranked[0], "xx abcdefghijklmnopqrstuvwxy");
    }

    #[test]
    fn test_rank_is_stable_and_limited() {
        let items = vec!["git pull", "git push", "cargo build", "git pull"];
        let ranked = rank(items, "git p", |s| *s, 2);
        assert_eq!(ranked, vec!["git pull", "git push"]);
    }

    #[test]
    fn test_rank_drops_rejections() {
        let ranked = rank(vec!["ls", "cd /tmp"], "zz", |s| *s, 10);
        assert!(ranked.is_empty());
    }
}
