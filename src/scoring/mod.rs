pub mod intake;
mod normalize;
mod report;
mod rollup;
mod schema;
mod weighted;

pub use report::{
    AnswerMap, DimensionScore, LikertReport, OverallScore, ScoreReport, SubdimensionScore,
    WeightedReport,
};
pub use schema::{
    slugify, AnswerOption, AssessmentSchema, AssessmentType, Competency, Orientation, Question,
    SchemaError, SchemaProvider, ScoringKind,
};
pub use weighted::ASSUMED_MAX_PER_QUESTION;

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("no question bank registered for assessment '{assessment}'")]
    UnknownSchema { assessment: AssessmentType },
}

/// Stateless scoring engine over an injected, immutable schema catalog.
///
/// Each call is a pure function of `(schema, answers)`: only call-local
/// accumulators are allocated, so concurrent handler invocations need no
/// coordination. Skipped answers are never an error; only a missing bank is.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    provider: Arc<SchemaProvider>,
}

impl ScoringEngine {
    pub fn new(provider: Arc<SchemaProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &SchemaProvider {
        &self.provider
    }

    pub fn score(
        &self,
        assessment: AssessmentType,
        answers: &AnswerMap,
    ) -> Result<ScoreReport, ScoringError> {
        let schema = self
            .provider
            .schema(assessment)
            .ok_or(ScoringError::UnknownSchema { assessment })?;

        Ok(match schema.kind {
            ScoringKind::Likert { scale_max } => {
                ScoreReport::Likert(rollup::score_likert(&schema, scale_max, answers))
            }
            ScoringKind::Weighted => {
                ScoreReport::Weighted(weighted::score_weighted(&schema, answers))
            }
        })
    }
}
