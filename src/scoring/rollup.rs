use super::normalize::normalize_likert;
use super::report::{
    percentage, round2, AnswerMap, DimensionScore, LikertReport, OverallScore, SubdimensionScore,
};
use super::schema::AssessmentSchema;
use std::collections::BTreeMap;

/// Call-local running totals for one dimension. Created at the start of a
/// scoring call, consumed when the report is built, never shared.
#[derive(Debug, Default)]
struct DimensionAccumulator {
    total: f64,
    count: u32,
    subdimensions: BTreeMap<String, SubAccumulator>,
}

#[derive(Debug, Default)]
struct SubAccumulator {
    total: f64,
    count: u32,
}

/// Score a Likert bank: normalize each answered question, roll the values up
/// into dimension and sub-dimension accumulators, and derive means and
/// percentages.
///
/// Overall score policy: question-weighted — the mean over all individually
/// normalized answers. Dimensions with more questions therefore move the
/// overall figure more than sparse ones.
pub(crate) fn score_likert(
    schema: &AssessmentSchema,
    scale_max: u8,
    answers: &AnswerMap,
) -> LikertReport {
    let mut accumulators: BTreeMap<String, DimensionAccumulator> = BTreeMap::new();

    // Seed every dimension and sub-dimension defined by the bank so the
    // output shape is schema-complete even for empty submissions.
    for question in &schema.questions {
        let (Some(dimension_key), Some(sub_key)) =
            (question.dimension_key(), question.sub_dimension_key())
        else {
            continue;
        };
        accumulators
            .entry(dimension_key)
            .or_default()
            .subdimensions
            .entry(sub_key)
            .or_default();
    }

    let mut total_score = 0.0;
    let mut answered = 0u32;

    for question in &schema.questions {
        let Some(raw) = answers.get(&question.id) else {
            continue;
        };
        let Some(value) = normalize_likert(question, raw, scale_max) else {
            continue;
        };
        let (Some(dimension_key), Some(sub_key)) =
            (question.dimension_key(), question.sub_dimension_key())
        else {
            continue;
        };

        let accumulator = accumulators.entry(dimension_key).or_default();
        accumulator.total += value;
        accumulator.count += 1;

        let sub = accumulator.subdimensions.entry(sub_key).or_default();
        sub.total += value;
        sub.count += 1;

        total_score += value;
        answered += 1;
    }

    let competency_scores = accumulators
        .into_iter()
        .map(|(key, accumulator)| {
            let average = mean(accumulator.total, accumulator.count);
            let subdimensions = accumulator
                .subdimensions
                .into_iter()
                .map(|(sub_key, sub)| {
                    let sub_average = mean(sub.total, sub.count);
                    (
                        sub_key,
                        SubdimensionScore {
                            score: round2(sub_average),
                            percentage: percentage(sub_average / f64::from(scale_max)),
                            total: sub.total,
                            count: sub.count,
                        },
                    )
                })
                .collect();

            (
                key,
                DimensionScore {
                    score: round2(average),
                    percentage: percentage(average / f64::from(scale_max)),
                    total: accumulator.total,
                    count: accumulator.count,
                    subdimensions,
                },
            )
        })
        .collect();

    let overall_average = mean(total_score, answered);
    let overall_percentage = percentage(overall_average / f64::from(scale_max));

    LikertReport {
        competency_scores,
        overall: OverallScore {
            score: round2(overall_average),
            percentage: overall_percentage,
        },
        total_questions: answered,
        score_percentage: overall_percentage,
    }
}

fn mean(total: f64, count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total / f64::from(count)
}
