use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw answers keyed by question id. Values are either a raw scale value
/// ("1".."10") or a selected option id, depending on the question.
pub type AnswerMap = BTreeMap<String, String>;

/// Rolled-up figures for one sub-dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdimensionScore {
    pub score: f64,
    pub percentage: u8,
    pub total: f64,
    pub count: u32,
}

/// Rolled-up figures for one dimension, sub-dimension breakdown included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    pub score: f64,
    pub percentage: u8,
    pub total: f64,
    pub count: u32,
    pub subdimensions: BTreeMap<String, SubdimensionScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallScore {
    pub score: f64,
    pub percentage: u8,
}

/// Result shape for the orientation-reversal banks (engagement, team,
/// manager). Keys are stable dimension ids; `BTreeMap` ordering keeps the
/// serialized form byte-identical across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikertReport {
    pub competency_scores: BTreeMap<String, DimensionScore>,
    pub overall: OverallScore,
    pub total_questions: u32,
    pub score_percentage: u8,
}

/// Result shape for the weighted scenario bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedReport {
    pub competency_scores: BTreeMap<String, i64>,
    pub max_competency_scores: BTreeMap<String, i64>,
    pub overall_score: i64,
    pub total_questions: u32,
    pub score_percentage: u8,
}

/// Final engine output; serializes as the bare report for either family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScoreReport {
    Likert(LikertReport),
    Weighted(WeightedReport),
}

impl ScoreReport {
    pub fn score_percentage(&self) -> u8 {
        match self {
            ScoreReport::Likert(report) => report.score_percentage,
            ScoreReport::Weighted(report) => report.score_percentage,
        }
    }

    pub fn total_questions(&self) -> u32 {
        match self {
            ScoreReport::Likert(report) => report.total_questions,
            ScoreReport::Weighted(report) => report.total_questions,
        }
    }
}

/// Round a mean to two decimals for display-stable scores.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Integer percentage of `fraction`, clamped to `[0, 100]`.
pub(crate) fn percentage(fraction: f64) -> u8 {
    let scaled = (fraction * 100.0).round();
    scaled.clamp(0.0, 100.0) as u8
}
