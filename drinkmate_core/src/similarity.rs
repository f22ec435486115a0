//! Fuzzy text matching for drink lookup.
//!
//! Case-insensitive Levenshtein distance, a normalised similarity score,
//! and a ranking helper that prefers substring hits over fuzzy ones.

/// Minimum score an item needs to survive [`rank`] by default
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.4;

/// Lowercased chars of `s`, produced lazily
fn folded(s: &str) -> impl Iterator<Item = char> + Clone + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// Case-insensitive edit distance between two strings
///
/// Counts single-char inserts, deletes and substitutions at unit cost.
/// Runs in O(len(a)·len(b)) time with a single rolling row sized by the
/// shorter input.
pub fn distance(a: &str, b: &str) -> usize {
    let (a_len, b_len) = (folded(a).count(), folded(b).count());
    let (long, short, short_len) = if a_len >= b_len {
        (folded(a), folded(b), b_len)
    } else {
        (folded(b), folded(a), a_len)
    };

    let mut row: Vec<usize> = (0..=short_len).collect();

    for (i, lc) in long.enumerate() {
        // `diag` holds the previous row's value at column j
        let mut diag = row[0];
        row[0] = i + 1;

        for (j, sc) in short.clone().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diag
            } else {
                diag.min(above).min(row[j]) + 1
            };
            diag = above;
        }
    }

    row[short_len]
}

/// Similarity score in `[0.0, 1.0]`, higher is closer
///
/// Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = folded(a).count().max(folded(b).count());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - distance(a, b) as f64 / max_len as f64
}

/// Rank `items` against a search query
///
/// An empty query returns every item in its original order. Otherwise a
/// case-insensitive substring hit scores 1.0 and anything else scores its
/// [`similarity`]; items under `threshold` are dropped and the rest are
/// sorted by score, ties keeping their input order.
pub fn rank<'a, T, F>(query: &str, items: &'a [T], name_of: F, threshold: f64) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    if query.is_empty() {
        return items.iter().collect();
    }

    let needle = query.to_lowercase();

    let mut scored: Vec<(&T, f64)> = items
        .iter()
        .map(|item| {
            let name = name_of(item);
            let score = if name.to_lowercase().contains(&needle) {
                1.0
            } else {
                similarity(query, name)
            };
            (item, score)
        })
        .filter(|(_, score)| *score >= threshold)
        .collect();

    // Vec::sort_by is stable, so equal scores keep input order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    tracing::debug!(
        "Ranked {} of {} items for query '{}'",
        scored.len(),
        items.len(),
        query
    );

    scored.into_iter().map(|(item, _)| item).collect()
}
