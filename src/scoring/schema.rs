use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The four assessment variants the platform ships question banks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Engagement,
    Team,
    Manager,
    Scenario,
}

impl AssessmentType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Engagement, Self::Team, Self::Manager, Self::Scenario]
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Engagement => "engagement",
            Self::Team => "team",
            Self::Manager => "manager",
            Self::Scenario => "scenario",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Engagement => "Employee Engagement",
            Self::Team => "Team Effectiveness",
            Self::Manager => "Manager Effectiveness",
            Self::Scenario => "Scenario Competency",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "engagement" => Some(Self::Engagement),
            "team" => Some(Self::Team),
            "manager" => Some(Self::Manager),
            "scenario" => Some(Self::Scenario),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Whether higher raw values indicate more (`P`) or less (`N`) of the trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    P,
    N,
}

/// Scoring family for a question bank. Likert banks reverse `N` items against
/// the scale; weighted banks sum per-option competency weight vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringKind {
    Likert { scale_max: u8 },
    Weighted,
}

/// A selectable answer. Likert option tables carry a pre-computed `score`
/// taken at face value; weighted options carry a competency weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weights: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    /// Stable aggregation key; the slugified label is only the fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_dimension_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn dimension_key(&self) -> Option<String> {
        match (&self.dimension_id, &self.dimension) {
            (Some(id), _) => Some(id.clone()),
            (None, Some(label)) => Some(slugify(label)),
            (None, None) => None,
        }
    }

    /// Sub-dimension key; falls back to the parent dimension when the bank
    /// does not break the dimension down further.
    pub fn sub_dimension_key(&self) -> Option<String> {
        match (&self.sub_dimension_id, &self.sub_dimension) {
            (Some(id), _) => Some(id.clone()),
            (None, Some(label)) => Some(slugify(label)),
            (None, None) => self.dimension_key(),
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == option_id)
    }
}

/// Competency declared by a weighted bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competency {
    pub code: String,
    pub label: String,
}

/// One assessment's question bank, loaded from JSON and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSchema {
    pub assessment: AssessmentType,
    #[serde(flatten)]
    pub kind: ScoringKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub competencies: Vec<Competency>,
    pub questions: Vec<Question>,
}

/// Lower-case a display label, collapse whitespace to underscores, and strip
/// anything outside `[a-z0-9_]`.
pub fn slugify(label: &str) -> String {
    label
        .split_whitespace()
        .filter_map(|word| {
            let cleaned: String = word
                .chars()
                .map(|ch| ch.to_ascii_lowercase())
                .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
                .collect();
            (!cleaned.is_empty()).then_some(cleaned)
        })
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid question bank JSON in {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bank file {path} declares '{found}' but was registered for '{expected}'")]
    AssessmentMismatch {
        path: String,
        expected: AssessmentType,
        found: AssessmentType,
    },
    #[error("duplicate question id '{id}' in {assessment} bank")]
    DuplicateQuestion { assessment: AssessmentType, id: String },
    #[error("question '{id}' in {assessment} bank has neither an orientation nor a scored option table")]
    UnscorableQuestion { assessment: AssessmentType, id: String },
    #[error("question '{id}' in {assessment} bank has no dimension label")]
    MissingDimension { assessment: AssessmentType, id: String },
    #[error(
        "labels '{first}' and '{second}' in {assessment} bank collapse to the same key '{key}'"
    )]
    KeyCollision {
        assessment: AssessmentType,
        key: String,
        first: String,
        second: String,
    },
    #[error("question '{id}' in {assessment} bank weights undeclared competency '{code}'")]
    UnknownCompetency {
        assessment: AssessmentType,
        id: String,
        code: String,
    },
    #[error("weighted bank {assessment} declares no competencies")]
    NoCompetencies { assessment: AssessmentType },
}

const ENGAGEMENT_BANK: &str = include_str!("banks/engagement.json");
const TEAM_BANK: &str = include_str!("banks/team.json");
const MANAGER_BANK: &str = include_str!("banks/manager.json");
const SCENARIO_BANK: &str = include_str!("banks/scenario.json");

/// Injectable catalog of validated question banks. Built once; read-only for
/// the process lifetime. Replacing banks means constructing a new provider.
#[derive(Debug, Clone)]
pub struct SchemaProvider {
    schemas: BTreeMap<AssessmentType, Arc<AssessmentSchema>>,
}

impl SchemaProvider {
    /// Provider backed by the question banks compiled into the binary.
    pub fn embedded() -> Result<Self, SchemaError> {
        let banks = [
            ("engagement.json", ENGAGEMENT_BANK),
            ("team.json", TEAM_BANK),
            ("manager.json", MANAGER_BANK),
            ("scenario.json", SCENARIO_BANK),
        ];

        let mut schemas = BTreeMap::new();
        for (name, raw) in banks {
            let schema = parse_bank(name, raw)?;
            schemas.insert(schema.assessment, Arc::new(schema));
        }

        Ok(Self { schemas })
    }

    /// Provider loading `engagement.json`, `team.json`, `manager.json` and
    /// `scenario.json` from a directory of re-authored banks. Missing files
    /// inside the directory are a deliberate partial catalog; scoring an
    /// absent assessment then fails with `UnknownSchema`. A missing or
    /// unreadable directory is a configuration error and fails here, before
    /// the service reports ready.
    pub fn from_dir(dir: &Path) -> Result<Self, SchemaError> {
        if !dir.is_dir() {
            return Err(SchemaError::Io {
                path: dir.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "question bank directory not found",
                ),
            });
        }

        let mut schemas = BTreeMap::new();
        for assessment in AssessmentType::ordered() {
            let path: PathBuf = dir.join(format!("{}.json", assessment.slug()));
            if !path.is_file() {
                continue;
            }

            let raw = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let schema = parse_bank(&path.display().to_string(), &raw)?;
            if schema.assessment != assessment {
                return Err(SchemaError::AssessmentMismatch {
                    path: path.display().to_string(),
                    expected: assessment,
                    found: schema.assessment,
                });
            }
            schemas.insert(assessment, Arc::new(schema));
        }

        Ok(Self { schemas })
    }

    pub fn schema(&self, assessment: AssessmentType) -> Option<Arc<AssessmentSchema>> {
        self.schemas.get(&assessment).cloned()
    }

    pub fn assessments(&self) -> Vec<AssessmentType> {
        self.schemas.keys().copied().collect()
    }
}

fn parse_bank(name: &str, raw: &str) -> Result<AssessmentSchema, SchemaError> {
    let schema: AssessmentSchema =
        serde_json::from_str(raw).map_err(|source| SchemaError::Parse {
            name: name.to_string(),
            source,
        })?;
    validate(&schema)?;
    Ok(schema)
}

fn validate(schema: &AssessmentSchema) -> Result<(), SchemaError> {
    let assessment = schema.assessment;

    let mut seen_ids = BTreeSet::new();
    for question in &schema.questions {
        if !seen_ids.insert(question.id.as_str()) {
            return Err(SchemaError::DuplicateQuestion {
                assessment,
                id: question.id.clone(),
            });
        }
    }

    match schema.kind {
        ScoringKind::Likert { .. } => validate_likert(schema),
        ScoringKind::Weighted => validate_weighted(schema),
    }
}

fn validate_likert(schema: &AssessmentSchema) -> Result<(), SchemaError> {
    let assessment = schema.assessment;

    // One bank must never aggregate two distinct labels under the same key.
    // Sub-dimension keys are nested per dimension, so their collision scope
    // is the parent dimension, not the whole bank.
    let mut dimension_labels: BTreeMap<String, String> = BTreeMap::new();
    let mut sub_labels: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    for question in &schema.questions {
        let Some(dimension) = question.dimension.as_deref() else {
            return Err(SchemaError::MissingDimension {
                assessment,
                id: question.id.clone(),
            });
        };

        let scorable_options = question.options.iter().any(|option| option.score.is_some());
        if question.orientation.is_none() && !scorable_options {
            return Err(SchemaError::UnscorableQuestion {
                assessment,
                id: question.id.clone(),
            });
        }

        let dimension_key = question
            .dimension_key()
            .unwrap_or_else(|| slugify(dimension));
        check_collision(
            assessment,
            &mut dimension_labels,
            dimension_key.clone(),
            dimension.to_string(),
        )?;

        if let (Some(sub_key), Some(sub_label)) =
            (question.sub_dimension_key(), question.sub_dimension.as_ref())
        {
            let scoped = sub_labels.entry(dimension_key).or_default();
            check_collision(assessment, scoped, sub_key, sub_label.clone())?;
        }
    }

    Ok(())
}

fn validate_weighted(schema: &AssessmentSchema) -> Result<(), SchemaError> {
    let assessment = schema.assessment;

    if schema.competencies.is_empty() {
        return Err(SchemaError::NoCompetencies { assessment });
    }

    let declared: BTreeSet<&str> = schema
        .competencies
        .iter()
        .map(|competency| competency.code.as_str())
        .collect();

    for question in &schema.questions {
        for option in &question.options {
            for code in option.weights.keys() {
                if !declared.contains(code.as_str()) {
                    return Err(SchemaError::UnknownCompetency {
                        assessment,
                        id: question.id.clone(),
                        code: code.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

fn check_collision(
    assessment: AssessmentType,
    seen: &mut BTreeMap<String, String>,
    key: String,
    label: String,
) -> Result<(), SchemaError> {
    match seen.get(&key) {
        Some(existing) if existing != &label => Err(SchemaError::KeyCollision {
            assessment,
            key,
            first: existing.clone(),
            second: label,
        }),
        Some(_) => Ok(()),
        None => {
            seen.insert(key, label);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Emotional Commitment"), "emotional_commitment");
        assert_eq!(slugify("  Trust   in Leadership "), "trust_in_leadership");
        assert_eq!(slugify("Compensation & Benefits"), "compensation_benefits");
    }

    #[test]
    fn slugify_strips_non_word_characters() {
        assert_eq!(slugify("Career-Development!"), "careerdevelopment");
    }

    #[test]
    fn embedded_banks_parse_and_validate() {
        let provider = SchemaProvider::embedded().expect("embedded banks are valid");
        for assessment in AssessmentType::ordered() {
            let schema = provider.schema(assessment).expect("bank registered");
            assert!(!schema.questions.is_empty());
        }
    }

    #[test]
    fn colliding_labels_are_rejected() {
        let raw = r#"{
            "assessment": "team",
            "kind": "likert",
            "scale_max": 5,
            "questions": [
                {"id": "1", "dimension": "Trust & Respect", "orientation": "P"},
                {"id": "2", "dimension": "Trust Respect", "orientation": "P"}
            ]
        }"#;
        let err = parse_bank("inline", raw).expect_err("collision must be rejected");
        assert!(matches!(err, SchemaError::KeyCollision { .. }));
    }

    #[test]
    fn colliding_sub_labels_within_one_dimension_are_rejected() {
        let raw = r#"{
            "assessment": "team",
            "kind": "likert",
            "scale_max": 5,
            "questions": [
                {"id": "1", "dimension": "Trust", "sub_dimension": "Follow & Up", "orientation": "P"},
                {"id": "2", "dimension": "Trust", "sub_dimension": "Follow Up", "orientation": "P"}
            ]
        }"#;
        let err = parse_bank("inline", raw).expect_err("collision must be rejected");
        assert!(matches!(err, SchemaError::KeyCollision { .. }));
    }

    #[test]
    fn same_sub_slug_under_different_dimensions_is_allowed() {
        // "Follow & Up" and "Follow Up" share a slug but never aggregate
        // together; their accumulators live under different dimensions.
        let raw = r#"{
            "assessment": "team",
            "kind": "likert",
            "scale_max": 5,
            "questions": [
                {"id": "1", "dimension": "Trust", "sub_dimension": "Follow & Up", "orientation": "P"},
                {"id": "2", "dimension": "Communication", "sub_dimension": "Follow Up", "orientation": "P"}
            ]
        }"#;
        let schema = parse_bank("inline", raw).expect("cross-dimension slugs are fine");
        assert_eq!(schema.questions.len(), 2);
    }

    #[test]
    fn missing_bank_directory_is_rejected() {
        let path = std::env::temp_dir().join("assessly-no-such-bank-dir");
        let err = SchemaProvider::from_dir(&path).expect_err("absent dir must fail");
        assert!(matches!(err, SchemaError::Io { .. }));
    }

    #[test]
    fn explicit_ids_bypass_slug_collision() {
        let raw = r#"{
            "assessment": "team",
            "kind": "likert",
            "scale_max": 5,
            "questions": [
                {"id": "1", "dimension": "Trust & Respect", "dimension_id": "trust_a", "orientation": "P"},
                {"id": "2", "dimension": "Trust Respect", "dimension_id": "trust_b", "orientation": "P"}
            ]
        }"#;
        let schema = parse_bank("inline", raw).expect("distinct ids are fine");
        assert_eq!(schema.questions[0].dimension_key().as_deref(), Some("trust_a"));
    }

    #[test]
    fn weighted_bank_rejects_undeclared_competency() {
        let raw = r#"{
            "assessment": "scenario",
            "kind": "weighted",
            "competencies": [{"code": "DM", "label": "Decision Making"}],
            "questions": [
                {"id": "1", "options": [{"id": "a", "weights": {"XX": 3}}]}
            ]
        }"#;
        let err = parse_bank("inline", raw).expect_err("undeclared code must be rejected");
        assert!(matches!(err, SchemaError::UnknownCompetency { .. }));
    }

    #[test]
    fn sub_dimension_key_falls_back_to_dimension() {
        let question = Question {
            id: "1".to_string(),
            text: String::new(),
            dimension: Some("Recognition".to_string()),
            dimension_id: None,
            sub_dimension: None,
            sub_dimension_id: None,
            orientation: Some(Orientation::P),
            options: Vec::new(),
        };
        assert_eq!(question.sub_dimension_key().as_deref(), Some("recognition"));
    }
}
