/// Loose team-name comparison: case-insensitive substring containment in
/// either direction. "Man United" matches "Manchester United" only if one
/// contains the other, and "Inter" will also match "Inter Miami".
///
/// Callers that need stricter matching should swap this out for a
/// normalized-name lookup table; nothing else depends on the heuristic.
pub fn teams_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teams_match_both_directions() {
        assert!(teams_match("Arsenal", "Arsenal FC"));
        assert!(teams_match("Arsenal FC", "arsenal"));
        assert!(teams_match("  Chelsea ", "CHELSEA"));
        assert!(!teams_match("Arsenal", "Chelsea"));
    }

    #[test]
    fn test_empty_names_never_match() {
        assert!(!teams_match("", "Arsenal"));
        assert!(!teams_match("Arsenal", "   "));
    }

    #[test]
    fn test_known_false_positive() {
        // Documented weakness of substring matching
        assert!(teams_match("Inter", "Inter Miami"));
    }
}
