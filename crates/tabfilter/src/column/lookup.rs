//! Column lookup helpers with "did you mean" suggestions.

use strsim::levenshtein;

/// Maximum Levenshtein distance to consider a column id as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Formats the "not found" error message, optionally including a suggestion.
pub(crate) fn format_not_found_error(column: &str, suggestion: Option<&str>) -> String {
    let base = format!("column '{column}' not found among the configured columns.");
    match suggestion {
        Some(s) => format!("{base} Did you mean '{s}'?"),
        None => base,
    }
}

/// Finds the closest column id among `candidates` using Levenshtein distance.
///
/// Distances are measured case-insensitively, so a column that differs only
/// in case is always suggested. Returns `None` when the best candidate is the
/// query itself or too far away.
pub(crate) fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| {
            let distance = levenshtein(&query_lower, &name.to_lowercase());
            (name, distance)
        })
        .min_by_key(|(_, d)| *d)?;

    if best_match != query && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_similar_name_exact_match_returns_none() {
        let candidates = ["age", "name", "city"];
        assert!(find_similar_name("age", candidates.iter().copied()).is_none());
    }

    #[test]
    fn test_find_similar_name_case_only_difference() {
        let candidates = ["Age", "Name"];
        assert_eq!(
            find_similar_name("age", candidates.iter().copied()),
            Some("Age".to_string())
        );
    }

    #[test]
    fn test_find_similar_name_single_typo() {
        let candidates = ["created_at", "updated_at", "name"];
        assert_eq!(
            find_similar_name("craeted_at", candidates.iter().copied()),
            Some("created_at".to_string())
        );
    }

    #[test]
    fn test_find_similar_name_too_different() {
        let candidates = ["age", "name", "city"];
        assert!(find_similar_name("Completely Different", candidates.iter().copied()).is_none());
    }

    #[test]
    fn test_find_similar_name_empty_candidates() {
        let candidates: Vec<&str> = vec![];
        assert!(find_similar_name("age", candidates.iter().copied()).is_none());
    }

    #[test]
    fn test_format_not_found_error() {
        assert_eq!(
            format_not_found_error("agee", Some("age")),
            "column 'agee' not found among the configured columns. Did you mean 'age'?"
        );
        assert_eq!(
            format_not_found_error("zzz", None),
            "column 'zzz' not found among the configured columns."
        );
    }
}
