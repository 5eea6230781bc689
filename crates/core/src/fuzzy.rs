//! Name similarity scores on a 0-100 scale.

use std::collections::BTreeSet;

/// A candidate matches on substring similarity at or above this score.
pub const PARTIAL_THRESHOLD: f64 = 95.0;
/// A candidate matches on token-set similarity at or above this score.
pub const TOKEN_SET_THRESHOLD: f64 = 90.0;

/// Length of the longest common subsequence, over chars.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb { diagonal + 1 } else { above.max(row[j]) };
            diagonal = above;
        }
    }
    row[b.len()]
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

/// Whole-string Indel similarity: `2 * LCS / (|a| + |b|)`, scaled to 100.
/// Insertions and deletions cost one each; a substitution costs two.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

/// Best similarity of the shorter string against any equally long window of
/// the longer one. "imperfecto" scores 100 against "imperfecto: the chef's table".
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    if long.contains(short) {
        return 100.0;
    }

    let short_chars: Vec<char> = short.chars().collect();
    let long_chars: Vec<char> = long.chars().collect();

    long_chars
        .windows(short_chars.len())
        .map(|window| indel_ratio(&short_chars, window))
        .fold(0.0, f64::max)
}

/// Similarity after splitting into word sets, so reordering and extra words
/// weigh less. "sushi nakazawa" scores 100 against "sushi nakazawa washington dc".
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return if tokens_a.is_empty() && tokens_b.is_empty() { 100.0 } else { 0.0 };
    }

    let join = |set: Vec<&&str>| set.into_iter().copied().collect::<Vec<_>>().join(" ");
    let sect = join(tokens_a.intersection(&tokens_b).collect());
    let diff_ab = join(tokens_a.difference(&tokens_b).collect());
    let diff_ba = join(tokens_b.difference(&tokens_a).collect());

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let combine = |diff: &str| if sect.is_empty() { diff.to_string() } else { format!("{sect} {diff}") };
    let comb_ab = combine(&diff_ab);
    let comb_ba = combine(&diff_ba);

    let mut best = ratio(&comb_ab, &comb_ba);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &comb_ab)).max(ratio(&sect, &comb_ba));
    }
    best
}

/// Whether two already-normalized names refer to the same restaurant.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || partial_ratio(a, b) >= PARTIAL_THRESHOLD || token_set_ratio(a, b) >= TOKEN_SET_THRESHOLD
}

/// Find the existing key `name` duplicates: exact normalized match first,
/// then the first fuzzy match in iteration order.
pub fn find_match<'a, I>(name: &str, keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let needle = crate::restaurant::normalize_name(name);

    if let Some(exact) = keys.clone().into_iter().find(|k| *k == needle) {
        return Some(exact);
    }

    keys.into_iter().find(|k| names_match(&needle, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ratio_substring() {
        assert_eq!(partial_ratio("imperfecto", "imperfecto: the chef's table"), 100.0);
        assert_eq!(partial_ratio("imperfecto: the chef's table", "imperfecto"), 100.0);
        assert_eq!(partial_ratio("", ""), 100.0);
        assert_eq!(partial_ratio("", "abc"), 0.0);
    }

    #[test]
    fn test_partial_ratio_near_substring() {
        let score = partial_ratio("rose's luxury", "roses luxury : dc");
        assert!(score > 80.0 && score < 100.0, "score {score}");
    }

    #[test]
    fn test_token_set_ratio() {
        assert_eq!(token_set_ratio("sushi nakazawa", "sushi nakazawa washington dc"), 100.0);
        assert_eq!(token_set_ratio("nakazawa sushi", "sushi nakazawa"), 100.0);
        assert!(token_set_ratio("le diplomate", "sushi nakazawa") < 50.0);
    }

    #[test]
    fn test_find_match() {
        let keys = ["imperfecto: the chef's table", "albi"];
        assert_eq!(find_match("Imperfecto", keys.iter().copied()), Some("imperfecto: the chef's table"));
        assert_eq!(find_match("  ALBI ", keys.iter().copied()), Some("albi"));
        assert_eq!(find_match("Totally Unrelated Name", keys.iter().copied()), None);
    }

    #[test]
    fn test_ratio_uses_indel_scale() {
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
        // LCS 24 over 24 + 28 chars.
        let score = ratio("at inn little washington", "at inn little washington the");
        assert!((score - 92.307).abs() < 0.01, "score {score}");
    }

    #[test]
    fn test_token_set_ratio_with_extra_words_on_both_sides() {
        let score = token_set_ratio("the inn at little washington", "inn at little washington va");
        assert!(score >= TOKEN_SET_THRESHOLD, "score {score}");
        assert!(names_match("the inn at little washington", "inn at little washington va"));
    }

    #[test]
    fn test_end_to_end_names_match() {
        assert!(names_match("rose's luxury", "rose's luxury : dc"));
        assert!(!names_match("minibar", "bar pilar"));
    }
}
