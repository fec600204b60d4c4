use super::schema::{Orientation, Question};

/// Reverse a raw value against the scale: `(scale_max + 1) - raw`. Works for
/// both the 5- and 10-point banks; never hard-code `6 -` or `11 -`.
pub(crate) fn reverse(raw: u32, scale_max: u8) -> u32 {
    u32::from(scale_max) + 1 - raw
}

/// Normalize one Likert answer, or `None` when the answer must be skipped.
///
/// Questions with a pre-scored option table resolve the selected option and
/// take its `score` at face value; reversed items in those tables were
/// already reversed by the bank author, so no orientation is applied. Plain
/// questions parse the raw value, require `1..=scale_max`, and reverse `N`
/// items. Anything else (unknown option, non-numeric, out of range) is
/// dropped so it never dilutes a dimension's `count`.
pub(crate) fn normalize_likert(question: &Question, raw: &str, scale_max: u8) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if question.options.iter().any(|option| option.score.is_some()) {
        return question.option(raw).and_then(|option| option.score);
    }

    let value: u32 = raw.parse().ok()?;
    if value < 1 || value > u32::from(scale_max) {
        return None;
    }

    let normalized = match question.orientation? {
        Orientation::P => value,
        Orientation::N => reverse(value, scale_max),
    };

    Some(f64::from(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::schema::AnswerOption;

    fn plain_question(orientation: Orientation) -> Question {
        Question {
            id: "1".to_string(),
            text: String::new(),
            dimension: Some("Emotional Commitment".to_string()),
            dimension_id: None,
            sub_dimension: None,
            sub_dimension_id: None,
            orientation: Some(orientation),
            options: Vec::new(),
        }
    }

    #[test]
    fn positive_items_pass_through() {
        let question = plain_question(Orientation::P);
        assert_eq!(normalize_likert(&question, "7", 10), Some(7.0));
    }

    #[test]
    fn negative_items_reverse_against_the_scale() {
        let question = plain_question(Orientation::N);
        assert_eq!(normalize_likert(&question, "3", 10), Some(8.0));
        assert_eq!(normalize_likert(&question, "2", 5), Some(4.0));
    }

    #[test]
    fn double_reversal_is_identity() {
        for scale_max in [5u8, 10] {
            for raw in 1..=u32::from(scale_max) {
                assert_eq!(reverse(reverse(raw, scale_max), scale_max), raw);
            }
        }
    }

    #[test]
    fn out_of_range_and_garbage_are_skipped() {
        let question = plain_question(Orientation::P);
        assert_eq!(normalize_likert(&question, "11", 10), None);
        assert_eq!(normalize_likert(&question, "0", 10), None);
        assert_eq!(normalize_likert(&question, "often", 10), None);
        assert_eq!(normalize_likert(&question, "  ", 10), None);
    }

    #[test]
    fn pre_scored_options_are_taken_at_face_value() {
        let mut question = plain_question(Orientation::N);
        question.options = vec![
            AnswerOption {
                id: "a".to_string(),
                text: String::new(),
                score: Some(5.0),
                weights: Default::default(),
            },
            AnswerOption {
                id: "e".to_string(),
                text: String::new(),
                score: Some(1.0),
                weights: Default::default(),
            },
        ];

        // The bank author already reversed this item; contribute 1, not 5.
        assert_eq!(normalize_likert(&question, "e", 5), Some(1.0));
        assert_eq!(normalize_likert(&question, "z", 5), None);
    }
}
