use super::report::{AnswerMap, WeightedReport};
use super::schema::AssessmentSchema;
use std::collections::BTreeMap;

/// Per-question ceiling assumed by the legacy percentage formula. The banks
/// also expose computed per-competency maxima (`max_competency_scores`);
/// `score_percentage` deliberately keeps using this constant instead so the
/// figure matches what the platform has always reported. Product has been
/// asked to confirm which ceiling is intended.
pub const ASSUMED_MAX_PER_QUESTION: f64 = 20.0;

/// Score the weighted scenario bank: sum the selected option's competency
/// weight vector per answer, and compute the answer-independent maximum
/// attainable score per competency across the whole bank.
pub(crate) fn score_weighted(schema: &AssessmentSchema, answers: &AnswerMap) -> WeightedReport {
    let mut competency_scores: BTreeMap<String, i64> = schema
        .competencies
        .iter()
        .map(|competency| (competency.code.clone(), 0))
        .collect();
    let mut max_competency_scores = competency_scores.clone();

    let mut overall_score = 0i64;
    let mut answered = 0u32;

    for question in &schema.questions {
        for (code, max) in max_competency_scores.iter_mut() {
            let best = question
                .options
                .iter()
                .filter_map(|option| option.weights.get(code))
                .max()
                .copied()
                .unwrap_or(0);
            *max += best;
        }

        let Some(selected) = answers.get(&question.id) else {
            continue;
        };
        let Some(option) = question.option(selected.trim()) else {
            continue;
        };

        for (code, weight) in &option.weights {
            if let Some(score) = competency_scores.get_mut(code) {
                *score += weight;
            }
            overall_score += weight;
        }
        answered += 1;
    }

    let score_percentage = if answered == 0 {
        0
    } else {
        let per_question = overall_score as f64 / f64::from(answered);
        let ratio = per_question / ASSUMED_MAX_PER_QUESTION;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    };

    WeightedReport {
        competency_scores,
        max_competency_scores,
        overall_score,
        total_questions: answered,
        score_percentage,
    }
}
