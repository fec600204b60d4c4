use assessly::scoring::{AnswerMap, AssessmentType, ScoreReport, SchemaProvider, ScoringEngine};
use std::sync::Arc;

fn engine() -> ScoringEngine {
    let provider = SchemaProvider::embedded().expect("embedded banks are valid");
    ScoringEngine::new(Arc::new(provider))
}

fn score_likert(assessment: AssessmentType, answers: AnswerMap) -> assessly::scoring::LikertReport {
    match engine().score(assessment, &answers).expect("bank registered") {
        ScoreReport::Likert(report) => report,
        ScoreReport::Weighted(_) => panic!("{assessment} must produce a Likert report"),
    }
}

fn answers(pairs: &[(&str, &str)]) -> AnswerMap {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), value.to_string()))
        .collect()
}

#[test]
fn positive_engagement_answer_passes_through() {
    let report = score_likert(AssessmentType::Engagement, answers(&[("1", "7")]));

    let dimension = &report.competency_scores["emotional_commitment"];
    assert_eq!(dimension.score, 7.0);
    assert_eq!(dimension.percentage, 70);
    assert_eq!(dimension.count, 1);

    let sub = &dimension.subdimensions["pride_in_organization"];
    assert_eq!(sub.score, 7.0);
    assert_eq!(sub.count, 1);

    assert_eq!(report.overall.score, 7.0);
    assert_eq!(report.overall.percentage, 70);
    assert_eq!(report.total_questions, 1);
    assert_eq!(report.score_percentage, 70);
}

#[test]
fn negative_engagement_answer_reverses_on_ten_point_scale() {
    let report = score_likert(AssessmentType::Engagement, answers(&[("2", "3")]));

    let dimension = &report.competency_scores["emotional_commitment"];
    assert_eq!(dimension.score, 8.0);
    assert_eq!(dimension.percentage, 80);
}

#[test]
fn negative_manager_answer_reverses_on_five_point_scale() {
    let report = score_likert(AssessmentType::Manager, answers(&[("9", "2")]));

    let dimension = &report.competency_scores["recognition"];
    assert_eq!(dimension.score, 4.0);
    assert_eq!(dimension.percentage, 80);
    assert_eq!(report.overall.score, 4.0);
}

#[test]
fn pre_scored_team_options_are_not_re_reversed() {
    // Question 2 is a reversed item whose option table was authored already
    // reversed; "strongly agree" (option e) must contribute 1, not 5.
    let report = score_likert(AssessmentType::Team, answers(&[("2", "e")]));

    let dimension = &report.competency_scores["trust"];
    assert_eq!(dimension.total, 1.0);
    assert_eq!(dimension.score, 1.0);
    assert_eq!(dimension.percentage, 20);
}

#[test]
fn every_schema_dimension_appears_even_with_no_answers() {
    let report = score_likert(AssessmentType::Engagement, AnswerMap::new());

    assert_eq!(report.competency_scores.len(), 4);
    for dimension in report.competency_scores.values() {
        assert_eq!(dimension.score, 0.0);
        assert_eq!(dimension.percentage, 0);
        assert_eq!(dimension.count, 0);
        assert!(!dimension.subdimensions.is_empty());
        for sub in dimension.subdimensions.values() {
            assert_eq!(sub.count, 0);
            assert_eq!(sub.score, 0.0);
        }
    }

    assert_eq!(report.total_questions, 0);
    assert_eq!(report.overall.score, 0.0);
    assert_eq!(report.score_percentage, 0);
}

#[test]
fn out_of_range_and_unknown_answers_are_skipped_not_zeroed() {
    let report = score_likert(
        AssessmentType::Engagement,
        answers(&[("1", "11"), ("3", "0"), ("4", "maybe"), ("999", "5")]),
    );

    assert_eq!(report.total_questions, 0);
    for dimension in report.competency_scores.values() {
        assert_eq!(dimension.count, 0);
        assert_eq!(dimension.total, 0.0);
    }
}

#[test]
fn overall_score_is_question_weighted() {
    // Emotional commitment gets two answers, rational commitment one. The
    // question-weighted mean is (10 + 10 + 4) / 3 = 8.0; a dimension-weighted
    // mean would be 7.0. This pins the question-weighted contract.
    let report = score_likert(
        AssessmentType::Engagement,
        answers(&[("1", "10"), ("3", "10"), ("5", "4")]),
    );

    assert_eq!(report.total_questions, 3);
    assert_eq!(report.overall.score, 8.0);
    assert_eq!(report.overall.percentage, 80);
}

#[test]
fn scores_and_percentages_stay_in_range_at_the_extremes() {
    for value in ["1", "10"] {
        let all_answers: AnswerMap = (1..=12).map(|id| (id.to_string(), value.to_string())).collect();
        let report = score_likert(AssessmentType::Engagement, all_answers);

        for dimension in report.competency_scores.values() {
            assert!(dimension.score >= 0.0 && dimension.score <= 10.0);
            assert!(dimension.percentage <= 100);
            for sub in dimension.subdimensions.values() {
                assert!(sub.score >= 0.0 && sub.score <= 10.0);
                assert!(sub.percentage <= 100);
            }
        }
        assert!(report.overall.score >= 0.0 && report.overall.score <= 10.0);
        assert!(report.score_percentage <= 100);
    }
}

#[test]
fn identical_inputs_serialize_byte_identically() {
    let submitted = answers(&[("1", "7"), ("2", "3"), ("5", "9"), ("8", "6")]);
    let engine = engine();

    let first = engine
        .score(AssessmentType::Engagement, &submitted)
        .expect("bank registered");
    let second = engine
        .score(AssessmentType::Engagement, &submitted)
        .expect("bank registered");

    assert_eq!(first, second);
    let first_json = serde_json::to_string(&first).expect("report serializes");
    let second_json = serde_json::to_string(&second).expect("report serializes");
    assert_eq!(first_json, second_json);
}

#[test]
fn partial_completion_is_reflected_in_counts() {
    let report = score_likert(
        AssessmentType::Team,
        answers(&[("1", "d"), ("3", "c"), ("7", "e")]),
    );

    assert_eq!(report.total_questions, 3);
    assert_eq!(report.competency_scores["trust"].count, 1);
    assert_eq!(report.competency_scores["communication"].count, 1);
    assert_eq!(report.competency_scores["alignment"].count, 1);
    assert_eq!(report.competency_scores["accountability"].count, 0);
}
