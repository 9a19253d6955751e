use std::collections::BTreeSet;

/// Outcome of scoring one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredAnswer {
    pub(crate) selected_option: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) partial_score: Option<f64>,
    /// Contribution to the aggregate score: 1/0 for single-select, the
    /// clamped partial value for multi-select.
    pub(crate) earned: f64,
}

/// Scores one answer against its key.
///
/// Single-select is exact match on the normalized letter. Multi-select
/// awards +1/k per correct letter and -1/k per incorrect letter, clamped
/// to [0, 1]; the clamp means a wild guess can zero the question but never
/// drag the total down.
pub(crate) fn score_selection(
    correct_option: &str,
    allows_multiple: bool,
    selections: &[String],
) -> ScoredAnswer {
    let selected = normalize_letters(selections);
    let multi = allows_multiple && correct_option.contains(',');

    if multi {
        score_multi(correct_option, &selected)
    } else {
        score_single(correct_option, &selected)
    }
}

pub(crate) fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn score_single(correct_option: &str, selected: &BTreeSet<String>) -> ScoredAnswer {
    let correct = correct_option.trim().to_uppercase();
    let is_correct =
        selected.len() == 1 && !correct.is_empty() && selected.iter().next() == Some(&correct);

    ScoredAnswer {
        selected_option: join_letters(selected),
        is_correct,
        partial_score: None,
        earned: if is_correct { 1.0 } else { 0.0 },
    }
}

fn score_multi(correct_option: &str, selected: &BTreeSet<String>) -> ScoredAnswer {
    let correct: BTreeSet<String> = correct_option
        .split(',')
        .map(|letter| letter.trim().to_uppercase())
        .filter(|letter| !letter.is_empty())
        .collect();
    let k = correct.len();

    if k == 0 {
        return ScoredAnswer {
            selected_option: join_letters(selected),
            is_correct: false,
            partial_score: Some(0.0),
            earned: 0.0,
        };
    }

    let hits = selected.intersection(&correct).count();
    let misses = selected.len() - hits;
    let raw = (hits as f64 - misses as f64) / k as f64;
    let clamped = raw.clamp(0.0, 1.0);
    let is_correct = hits == k && misses == 0;

    ScoredAnswer {
        selected_option: join_letters(selected),
        is_correct,
        partial_score: Some(round_two(clamped)),
        earned: clamped,
    }
}

fn normalize_letters(selections: &[String]) -> BTreeSet<String> {
    selections
        .iter()
        .flat_map(|value| value.split(','))
        .map(|letter| letter.trim().to_uppercase())
        .filter(|letter| !letter.is_empty())
        .collect()
}

fn join_letters(selected: &BTreeSet<String>) -> Option<String> {
    if selected.is_empty() {
        None
    } else {
        Some(selected.iter().cloned().collect::<Vec<_>>().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn single_select_exact_match() {
        let scored = score_selection("B", false, &letters(&["b"]));
        assert!(scored.is_correct);
        assert_eq!(scored.earned, 1.0);
        assert_eq!(scored.partial_score, None);
        assert_eq!(scored.selected_option.as_deref(), Some("B"));
    }

    #[test]
    fn single_select_wrong_letter() {
        let scored = score_selection("B", false, &letters(&["C"]));
        assert!(!scored.is_correct);
        assert_eq!(scored.earned, 0.0);
    }

    #[test]
    fn single_select_multiple_letters_is_wrong() {
        let scored = score_selection("B", false, &letters(&["B", "C"]));
        assert!(!scored.is_correct);
        assert_eq!(scored.earned, 0.0);
        assert_eq!(scored.selected_option.as_deref(), Some("B,C"));
    }

    #[test]
    fn single_select_empty_selection() {
        let scored = score_selection("A", false, &[]);
        assert!(!scored.is_correct);
        assert_eq!(scored.selected_option, None);
    }

    #[test]
    fn multi_select_full_credit_regardless_of_order() {
        let scored = score_selection("A,C", true, &letters(&["C", "A"]));
        assert!(scored.is_correct);
        assert_eq!(scored.partial_score, Some(1.0));
        assert_eq!(scored.earned, 1.0);
        assert_eq!(scored.selected_option.as_deref(), Some("A,C"));
    }

    #[test]
    fn multi_select_penalty_cancels_credit() {
        // +0.5 for A, -0.5 for B.
        let scored = score_selection("A,C", true, &letters(&["A", "B"]));
        assert!(!scored.is_correct);
        assert_eq!(scored.partial_score, Some(0.0));
        assert_eq!(scored.earned, 0.0);
    }

    #[test]
    fn multi_select_clamps_at_zero() {
        let scored = score_selection("A,C", true, &letters(&["B", "D"]));
        assert_eq!(scored.partial_score, Some(0.0));
        assert_eq!(scored.earned, 0.0);
    }

    #[test]
    fn multi_select_partial_credit() {
        let scored = score_selection("A,B,C", true, &letters(&["A", "B"]));
        assert!(!scored.is_correct);
        assert_eq!(scored.partial_score, Some(0.67));
        assert!((scored.earned - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn multi_select_extra_letter_blocks_full_credit() {
        let scored = score_selection("A,C", true, &letters(&["A", "C", "D"]));
        assert!(!scored.is_correct);
        assert_eq!(scored.partial_score, Some(0.5));
    }

    #[test]
    fn multi_select_stays_within_bounds() {
        let options = ["A", "B", "C", "D"];
        for mask in 0..16u8 {
            let selection: Vec<String> = options
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, letter)| letter.to_string())
                .collect();
            let scored = score_selection("B,D", true, &selection);
            let partial = scored.partial_score.unwrap_or(0.0);
            assert!((0.0..=1.0).contains(&partial), "mask {mask}: {partial}");
        }
    }

    #[test]
    fn comma_joined_input_is_split() {
        let scored = score_selection("A,C", true, &letters(&["c,a"]));
        assert!(scored.is_correct);
    }

    #[test]
    fn duplicate_letters_count_once() {
        let scored = score_selection("A,C", true, &letters(&["A", "A", "C"]));
        assert!(scored.is_correct);
        assert_eq!(scored.partial_score, Some(1.0));
    }

    #[test]
    fn single_select_when_flag_set_but_key_has_no_separator() {
        // allows_multiple with a single-letter key still scores exact-match.
        let scored = score_selection("A", true, &letters(&["A"]));
        assert!(scored.is_correct);
        assert_eq!(scored.partial_score, None);
    }

    #[test]
    fn round_two_behaves() {
        assert_eq!(round_two(0.666_666), 0.67);
        assert_eq!(round_two(12.0), 12.0);
        assert_eq!(round_two(0.005), 0.01);
    }
}
