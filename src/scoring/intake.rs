use super::report::AnswerMap;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read responses export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid responses CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid answers JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a `Question ID,Answer` responses export into an `AnswerMap`.
///
/// Blank answers are dropped rather than recorded as empty strings, so a
/// partially completed export aggregates exactly like a partial submission.
/// A question id appearing twice keeps the last answer, matching how the
/// survey tool overwrites re-submitted responses.
pub fn answers_from_csv_reader<R: Read>(reader: R) -> Result<AnswerMap, IntakeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut answers = AnswerMap::new();
    for record in csv_reader.deserialize::<ResponseRow>() {
        let row = record?;
        let Some(answer) = row.answer else {
            continue;
        };
        answers.insert(row.question_id, answer);
    }

    Ok(answers)
}

pub fn answers_from_csv_path(path: &Path) -> Result<AnswerMap, IntakeError> {
    let file = File::open(path)?;
    answers_from_csv_reader(file)
}

/// Parse a JSON object of question id to answer, the same shape the HTTP
/// endpoint accepts in its `answers` field.
pub fn answers_from_json_path(path: &Path) -> Result<AnswerMap, IntakeError> {
    let raw = std::fs::read_to_string(path)?;
    let answers = serde_json::from_str::<AnswerMap>(&raw)?;
    Ok(answers)
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    #[serde(rename = "Question ID")]
    question_id: String,
    #[serde(rename = "Answer", default, deserialize_with = "empty_string_as_none")]
    answer: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
