//! Filter-and-rank over the roster
//!
//! No scoring: suggestions are the first `MAX_SUGGESTIONS` records, in roster
//! order, whose stringified id or lowercased name contains the query. The
//! exact match is the first suggestion whose id equals the query, or whose
//! name equals it once all whitespace is stripped from both sides. Ids are
//! never whitespace-collapsed; the asymmetry is part of the matching contract.

use crate::candidate::RosterEntry;
use crate::models::StudentRecord;
use crate::roster::Roster;

/// Maximum number of suggestions shown under the input.
pub const MAX_SUGGESTIONS: usize = 5;

/// Result of one evaluation, applied to the engine state as a whole
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub suggestions: Vec<StudentRecord>,
    pub selection: Option<StudentRecord>,
}

/// Trim and lowercase raw input into the form `evaluate` compares against
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Remove every run of whitespace
pub fn collapse_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Substring predicate. Records without a name can only match by id.
pub(crate) fn is_suggestion(entry: &RosterEntry, query: &str) -> bool {
    entry.id_text().contains(query) || entry.name_lower().map_or(false, |name| name.contains(query))
}

/// Exact predicate. `query_key` is `query` with whitespace collapsed.
pub(crate) fn is_exact_match(entry: &RosterEntry, query: &str, query_key: &str) -> bool {
    entry.id_text() == query || entry.name_key().map_or(false, |key| key == query_key)
}

/// Evaluate a normalized query against the roster.
///
/// `query` must already be trimmed and lowercased (see `normalize_query`).
pub fn evaluate(roster: &Roster, query: &str) -> Evaluation {
    if query.is_empty() {
        return Evaluation::default();
    }

    let matched: Vec<&RosterEntry> = roster
        .entries()
        .iter()
        .filter(|entry| is_suggestion(entry, query))
        .take(MAX_SUGGESTIONS)
        .collect();

    let query_key = collapse_whitespace(query);
    let selection = matched
        .iter()
        .find(|entry| is_exact_match(entry, query, &query_key))
        .map(|entry| entry.record().clone());

    Evaluation {
        suggestions: matched.into_iter().map(|entry| entry.record().clone()).collect(),
        selection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn roster(records: Vec<StudentRecord>) -> Roster {
        Roster::from_records(records)
    }

    fn ayesha() -> StudentRecord {
        StudentRecord::new(1001, "Ayesha Khan", 1)
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Ayesha KHAN \t"), "ayesha khan");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("ayesha  \t khan\n"), "ayeshakhan");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let r = roster(vec![ayesha()]);
        assert_eq!(evaluate(&r, ""), Evaluation::default());
    }

    #[test]
    fn test_exact_id_selects() {
        let r = roster(vec![ayesha()]);
        let eval = evaluate(&r, "1001");
        assert_eq!(eval.suggestions, vec![ayesha()]);
        assert_eq!(eval.selection, Some(ayesha()));
    }

    #[test]
    fn test_partial_name_suggests_without_selecting() {
        let r = roster(vec![ayesha()]);
        let eval = evaluate(&r, "khan");
        assert_eq!(eval.suggestions, vec![ayesha()]);
        assert_eq!(eval.selection, None);
    }

    #[test]
    fn test_full_name_selects_case_insensitively() {
        let r = roster(vec![ayesha()]);
        assert_eq!(evaluate(&r, "ayesha khan").selection, Some(ayesha()));
        // Neither is a substring of "ayesha khan", so nothing is suggested
        assert_eq!(evaluate(&r, "ayesha   khan"), Evaluation::default());
        assert_eq!(evaluate(&r, "ayeshakhan"), Evaluation::default());
    }

    #[test]
    fn test_exact_name_ignores_irregular_roster_spacing() {
        let spaced = StudentRecord::new(7, "Ayesha  Khan", 7);
        let r = roster(vec![spaced.clone()]);
        assert_eq!(evaluate(&r, "ayesha  khan").selection, Some(spaced));
        assert_eq!(evaluate(&r, "ayesha khan").selection, None);
    }

    #[test]
    fn test_collapsed_name_query_needs_substring_hit_first() {
        // "ayeshakhan" is not a substring of "ayesha khan", so there is nothing
        // for the exact rule to pick from.
        let r = roster(vec![ayesha()]);
        let eval = evaluate(&r, "ayeshakhan");
        assert!(eval.suggestions.is_empty());
        assert_eq!(eval.selection, None);
    }

    #[test]
    fn test_partial_id_suggests_without_selecting() {
        let r = roster(vec![ayesha(), StudentRecord::new(10012, "Zara Ali", 2)]);
        let eval = evaluate(&r, "100");
        assert_eq!(eval.suggestions.len(), 2);
        assert_eq!(eval.selection, None);

        let eval = evaluate(&r, "1001");
        assert_eq!(eval.suggestions.len(), 2);
        assert_eq!(eval.selection, Some(ayesha()));
    }

    #[test]
    fn test_truncates_to_first_five_in_roster_order() {
        let records: Vec<StudentRecord> = (1..=6)
            .map(|i| StudentRecord::new(format!("2-{}", i).as_str(), format!("Student {}", i), i))
            .collect();
        let r = roster(records.clone());
        let eval = evaluate(&r, "2");
        assert_eq!(eval.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(eval.suggestions, records[..5].to_vec());
    }

    #[test]
    fn test_missing_name_never_matches_by_name() {
        let r = roster(vec![StudentRecord::id_only(555), ayesha()]);
        let eval = evaluate(&r, "a");
        assert_eq!(eval.suggestions, vec![ayesha()]);

        let eval = evaluate(&r, "555");
        assert_eq!(eval.selection, Some(StudentRecord::id_only(555)));
    }

    #[test]
    fn test_text_ids_compare_as_stringified() {
        let upper = StudentRecord::new("BQ-77", "Hamza", 3);
        let lower = StudentRecord::new("bq-78", "Hina", 4);
        let r = roster(vec![upper, lower.clone()]);

        // The query is lowercased but ids are not, so upper-case ids never match
        let eval = evaluate(&r, "bq-7");
        assert_eq!(eval.suggestions, vec![lower.clone()]);
        assert_eq!(evaluate(&r, "bq-78").selection, Some(lower));
    }

    #[test]
    fn test_float_ids_match_like_integers() {
        let record = StudentRecord::new(CellValue::Float(3003.0), "Iqra", 9);
        let r = roster(vec![record.clone()]);
        assert_eq!(evaluate(&r, "3003").selection, Some(record));
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let first = StudentRecord::new(1, "Ali Raza", 1);
        let second = StudentRecord::new(2, "Ali Raza", 2);
        let r = roster(vec![first.clone(), second]);
        let eval = evaluate(&r, "ali raza");
        assert_eq!(eval.suggestions.len(), 2);
        assert_eq!(eval.selection, Some(first));
    }

    #[test]
    fn test_exact_match_only_from_within_suggestions() {
        // Six partial hits push the exact record out of the top five
        let mut records: Vec<StudentRecord> = (0..5)
            .map(|i| StudentRecord::new(format!("90{}", i).as_str(), "Sana Mir", i))
            .collect();
        records.push(StudentRecord::new("9", "Other", 99));
        let r = roster(records);

        let eval = evaluate(&r, "9");
        assert_eq!(eval.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(eval.selection, None);
    }
}
