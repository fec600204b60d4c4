use assessly::config::AppConfig;
use assessly::error::AppError;
use assessly::scoring::{
    intake, AnswerMap, AssessmentType, ScoreReport, SchemaProvider, ScoringEngine, ScoringKind,
};
use assessly::telemetry;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    engine: ScoringEngine,
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Assessly",
    about = "Score candidate assessments from the command line or serve the scoring API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one candidate's responses and print the report
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Assessment to score: engagement, team, manager or scenario
    #[arg(long, value_parser = parse_assessment)]
    assessment: AssessmentType,
    /// JSON file mapping question id to the selected answer
    #[arg(long, conflicts_with = "responses_csv")]
    answers_json: Option<PathBuf>,
    /// Survey-tool CSV export ("Question ID,Answer" columns)
    #[arg(long)]
    responses_csv: Option<PathBuf>,
    /// Print the raw report JSON instead of the readable summary
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRequest {
    assessment_type: AssessmentType,
    #[serde(default)]
    answers: AnswerMap,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreResponse {
    assessment_type: AssessmentType,
    scored_at: DateTime<Utc>,
    #[serde(flatten)]
    report: ScoreReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentListEntry {
    assessment_type: AssessmentType,
    label: &'static str,
    question_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale_max: Option<u8>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Score(args) => run_score(args),
    }
}

fn parse_assessment(raw: &str) -> Result<AssessmentType, String> {
    AssessmentType::from_slug(raw)
        .ok_or_else(|| format!("unknown assessment '{raw}' (expected engagement, team, manager or scenario)"))
}

fn build_engine(config: &AppConfig) -> Result<ScoringEngine, AppError> {
    let provider = match &config.schema_dir {
        Some(dir) => SchemaProvider::from_dir(dir)?,
        None => SchemaProvider::embedded()?,
    };
    Ok(ScoringEngine::new(Arc::new(provider)))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = build_engine(&config)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        engine,
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = build_router(state, prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "assessment scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState, prometheus_layer: PrometheusMetricLayer<'static>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/assessments", get(list_assessments_endpoint))
        .route("/api/v1/assessments/score", post(score_endpoint))
        .layer(prometheus_layer)
        .with_state(state)
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        assessment,
        answers_json,
        responses_csv,
        json: raw_json,
    } = args;

    let config = AppConfig::load()?;
    let engine = build_engine(&config)?;

    let answers = match (answers_json, responses_csv) {
        (Some(path), _) => intake::answers_from_json_path(&path)?,
        (None, Some(path)) => intake::answers_from_csv_path(&path)?,
        (None, None) => {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "provide --answers-json or --responses-csv",
            )))
        }
    };

    let report = engine.score(assessment, &answers)?;

    if raw_json {
        let rendered = serde_json::to_string_pretty(&report).map_err(|err| {
            AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
        })?;
        println!("{rendered}");
    } else {
        render_report(&engine, assessment, &report);
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn list_assessments_endpoint(State(state): State<AppState>) -> Json<Vec<AssessmentListEntry>> {
    let entries = state
        .engine
        .provider()
        .assessments()
        .into_iter()
        .filter_map(|assessment| {
            state.engine.provider().schema(assessment).map(|schema| {
                let scale_max = match schema.kind {
                    ScoringKind::Likert { scale_max } => Some(scale_max),
                    ScoringKind::Weighted => None,
                };
                AssessmentListEntry {
                    assessment_type: assessment,
                    label: assessment.label(),
                    question_count: schema.questions.len(),
                    scale_max,
                }
            })
        })
        .collect();

    Json(entries)
}

async fn score_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let ScoreRequest {
        assessment_type,
        answers,
    } = payload;

    let report = state.engine.score(assessment_type, &answers)?;

    Ok(Json(ScoreResponse {
        assessment_type,
        scored_at: Utc::now(),
        report,
    }))
}

fn render_report(engine: &ScoringEngine, assessment: AssessmentType, report: &ScoreReport) {
    println!("{} report", assessment.label());

    match report {
        ScoreReport::Likert(report) => {
            println!(
                "Overall: {:.2} ({}%), {} answered question(s)",
                report.overall.score, report.overall.percentage, report.total_questions
            );

            println!("\nDimensions");
            for (key, dimension) in &report.competency_scores {
                println!(
                    "- {}: {:.2} ({}%), {} answer(s)",
                    key, dimension.score, dimension.percentage, dimension.count
                );
                for (sub_key, sub) in &dimension.subdimensions {
                    if sub_key == key {
                        continue;
                    }
                    println!(
                        "    {}: {:.2} ({}%), {} answer(s)",
                        sub_key, sub.score, sub.percentage, sub.count
                    );
                }
            }
        }
        ScoreReport::Weighted(report) => {
            println!(
                "Overall: {} points ({}%), {} answered question(s)",
                report.overall_score, report.score_percentage, report.total_questions
            );

            let schema = engine.provider().schema(assessment);
            let labels: std::collections::BTreeMap<&str, &str> = schema
                .as_deref()
                .map(|schema| {
                    schema
                        .competencies
                        .iter()
                        .map(|competency| (competency.code.as_str(), competency.label.as_str()))
                        .collect()
                })
                .unwrap_or_default();

            println!("\nCompetencies");
            for (code, score) in &report.competency_scores {
                let max = report.max_competency_scores.get(code).copied().unwrap_or(0);
                let label = labels.get(code.as_str()).copied().unwrap_or(code.as_str());
                println!("- {label} ({code}): {score} out of {max}");
            }
        }
    }
}
