use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Args;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::core::{
    Achievement, CancelToken, DEFAULT_TRIALS, EngineError, FireSummary, GenerationGate,
    MonteCarloConfig, MonteCarloPoint, Profile, ProjectionMemo, Scenario, analyze_scenarios,
    evaluate, project, run_monte_carlo,
};

const MAX_SESSIONS: usize = 1_024;
const DEFAULT_SESSION: &str = "default";

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 75_000.0, help = "Annual income")]
    pub current_income: f64,
    #[arg(long, default_value_t = 50_000.0)]
    pub current_savings: f64,
    #[arg(long, default_value_t = 4_000.0)]
    pub monthly_expenses: f64,
    #[arg(long, default_value_t = 2_500.0)]
    pub monthly_savings: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Nominal annual investment return in percent"
    )]
    pub investment_return: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual inflation in percent")]
    pub inflation_rate: f64,
    #[arg(long, default_value_t = 50)]
    pub target_retirement_age: u32,
    #[arg(long, default_value_t = 4.0, help = "Safe withdrawal rate in percent")]
    pub safe_withdrawal_rate: f64,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
    #[arg(long, help = "Include Monte Carlo percentile bands")]
    pub monte_carlo: bool,
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    pub trials: u32,
    #[arg(long, help = "Defaults to min(years to FIRE + 5, 30)")]
    pub years_to_show: Option<u32>,
    #[arg(long, help = "Seed for reproducible Monte Carlo output")]
    pub seed: Option<u64>,
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EnginePayload {
    current_age: Option<u32>,
    current_income: Option<f64>,
    current_savings: Option<f64>,
    monthly_expenses: Option<f64>,
    monthly_savings: Option<f64>,
    investment_return: Option<f64>,
    inflation_rate: Option<f64>,
    target_retirement_age: Option<u32>,
    safe_withdrawal_rate: Option<f64>,

    trials: Option<u32>,
    years_to_show: Option<u32>,
    seed: Option<u64>,
    session: Option<String>,
}

#[derive(Debug)]
struct ApiRequest {
    profile: Profile,
    monte_carlo: MonteCarloConfig,
    session: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: FireSummary,
    pub achievements: [Achievement; 5],
    pub scenarios: [Scenario; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<Vec<MonteCarloPoint>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonteCarloResponse {
    generation: u64,
    trials: u32,
    points: Vec<MonteCarloPoint>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("simulation superseded by newer input")]
    Superseded,

    #[error("mutex lock error")]
    Lock,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl<T> From<PoisonError<T>> for ApiError {
    fn from(_: PoisonError<T>) -> Self {
        ApiError::Lock
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Engine(EngineError::Cancelled) | ApiError::Superseded => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ApiError::Engine(_) => {
                warn!(error = %self, "rejected request");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Lock | ApiError::Internal(_) | ApiError::Serialization(_) => {
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        json_response(status, ErrorResponse { error: message })
    }
}

#[derive(Debug, Default)]
struct AppState {
    memo: Mutex<ProjectionMemo>,
    sessions: Mutex<HashMap<String, GenerationGate>>,
    generations: Arc<AtomicU64>,
}

type SharedState = Arc<AppState>;

pub fn build_profile(args: &ProfileArgs) -> Result<Profile, ApiError> {
    let profile = Profile {
        current_age: args.current_age,
        current_income: args.current_income,
        current_savings: args.current_savings,
        monthly_expenses: args.monthly_expenses,
        monthly_savings: args.monthly_savings,
        investment_return: args.investment_return,
        inflation_rate: args.inflation_rate,
        target_retirement_age: args.target_retirement_age,
        safe_withdrawal_rate: args.safe_withdrawal_rate,
    };
    profile.validate()?;
    Ok(profile)
}

fn build_monte_carlo_config(
    trials: u32,
    years_to_show: Option<u32>,
    seed: Option<u64>,
) -> Result<MonteCarloConfig, ApiError> {
    let config = MonteCarloConfig {
        trials,
        years_to_show,
        seed,
    };
    config.validate()?;
    Ok(config)
}

pub fn build_report(
    profile: &Profile,
    summary: &FireSummary,
    monte_carlo: Option<Vec<MonteCarloPoint>>,
) -> Report {
    Report {
        summary: summary.clone(),
        achievements: evaluate(summary),
        scenarios: analyze_scenarios(profile, summary),
        monte_carlo,
    }
}

pub fn run_project_command(args: &ProjectArgs) -> Result<String, ApiError> {
    let profile = build_profile(&args.profile)?;
    let summary = project(&profile)?;
    let monte_carlo = if args.monte_carlo {
        let config = build_monte_carlo_config(args.trials, args.years_to_show, args.seed)?;
        Some(run_monte_carlo(
            &profile,
            &summary,
            &config,
            &CancelToken::detached(),
        )?)
    } else {
        None
    };

    let report = build_report(&profile, &summary, monte_carlo);
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(AppState::default()));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FIRE projection API listening");
    info!("local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/monte-carlo",
            get(monte_carlo_get_handler).post(monte_carlo_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: "Not found".to_string(),
        },
    )
}

async fn project_get_handler(
    State(state): State<SharedState>,
    Query(payload): Query<EnginePayload>,
) -> Response {
    project_handler_impl(&state, payload)
}

async fn project_post_handler(
    State(state): State<SharedState>,
    Json(payload): Json<EnginePayload>,
) -> Response {
    project_handler_impl(&state, payload)
}

async fn monte_carlo_get_handler(
    State(state): State<SharedState>,
    Query(payload): Query<EnginePayload>,
) -> Response {
    monte_carlo_handler_impl(state, payload).await
}

async fn monte_carlo_post_handler(
    State(state): State<SharedState>,
    Json(payload): Json<EnginePayload>,
) -> Response {
    monte_carlo_handler_impl(state, payload).await
}

fn project_handler_impl(state: &AppState, payload: EnginePayload) -> Response {
    let result = api_request_from_payload(payload).and_then(|request| {
        let summary = project_cached(state, &request.profile)?;
        Ok(build_report(&request.profile, &summary, None))
    });
    match result {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => err.into_response(),
    }
}

async fn monte_carlo_handler_impl(state: SharedState, payload: EnginePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    match run_monte_carlo_request(state, request).await {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => err.into_response(),
    }
}

async fn run_monte_carlo_request(
    state: SharedState,
    request: ApiRequest,
) -> Result<MonteCarloResponse, ApiError> {
    let summary = project_cached(&state, &request.profile)?;
    let token = advance_session(&state, &request.session)?;

    let profile = request.profile;
    let config = request.monte_carlo;
    let task_token = token.clone();
    let points = tokio::task::spawn_blocking(move || {
        run_monte_carlo(&profile, &summary, &config, &task_token)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let points = publish_if_current(&token, points)?;
    Ok(MonteCarloResponse {
        generation: token.generation(),
        trials: config.trials,
        points,
    })
}

fn publish_if_current<T>(token: &CancelToken, value: T) -> Result<T, ApiError> {
    if token.is_cancelled() {
        info!(
            generation = token.generation(),
            "discarding superseded simulation"
        );
        return Err(ApiError::Superseded);
    }
    Ok(value)
}

fn project_cached(state: &AppState, profile: &Profile) -> Result<Arc<FireSummary>, ApiError> {
    let mut memo = state.memo.lock()?;
    Ok(memo.project(profile)?)
}

fn advance_session(state: &AppState, session: &str) -> Result<CancelToken, ApiError> {
    let mut sessions = state.sessions.lock()?;
    if sessions.len() >= MAX_SESSIONS && !sessions.contains_key(session) {
        let before = sessions.len();
        sessions.retain(|_, gate| !gate.is_idle());
        warn!(
            evicted = before - sessions.len(),
            "session table full; evicted idle sessions"
        );
    }
    let gate = sessions
        .entry(session.to_string())
        .or_insert_with(|| GenerationGate::with_counter(Arc::clone(&state.generations)));
    Ok(gate.advance())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn api_request_from_payload(payload: EnginePayload) -> Result<ApiRequest, ApiError> {
    let mut args = default_profile_args();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.current_income {
        args.current_income = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.monthly_expenses {
        args.monthly_expenses = v;
    }
    if let Some(v) = payload.monthly_savings {
        args.monthly_savings = v;
    }
    if let Some(v) = payload.investment_return {
        args.investment_return = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.target_retirement_age {
        args.target_retirement_age = v;
    }
    if let Some(v) = payload.safe_withdrawal_rate {
        args.safe_withdrawal_rate = v;
    }

    let profile = build_profile(&args)?;
    let monte_carlo = build_monte_carlo_config(
        payload.trials.unwrap_or(DEFAULT_TRIALS),
        payload.years_to_show,
        payload.seed,
    )?;
    let session = payload
        .session
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    Ok(ApiRequest {
        profile,
        monte_carlo,
        session,
    })
}

fn default_profile_args() -> ProfileArgs {
    ProfileArgs {
        current_age: 30,
        current_income: 75_000.0,
        current_savings: 50_000.0,
        monthly_expenses: 4_000.0,
        monthly_savings: 2_500.0,
        investment_return: 7.0,
        inflation_rate: 3.0,
        target_retirement_age: 50,
        safe_withdrawal_rate: 4.0,
    }
}
