use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, Method},
    middleware,
    routing::{get, post},
    Json, Router,
};
use reflectly_shared::{FeedbackId, ProjectId, VoterRecord, VoterToken};
use reflectly_store::{
    FeedbackItem, FeedbackStore, Project, ProjectSummary, UpvoteCoordinator, UpvoteOutcome,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub store: FeedbackStore,
    pub upvotes: UpvoteCoordinator,
    pub rate_limiter: RateLimiter,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: FeedbackStore, config: ServerConfig) -> Self {
        Self {
            upvotes: UpvoteCoordinator::new(store.clone()),
            rate_limiter: RateLimiter::new(config.rate_limit_per_sec, config.rate_limit_burst),
            store,
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // The widget loads the feedback page from arbitrary customer origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .route("/api/feedback/:slug", get(list_feedback).post(submit_feedback))
        .route("/api/feedback/:slug/upvote", post(upvote_feedback))
        .route("/api/feedback/:slug/votes", get(voter_record))
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/:id", get(project_detail))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Payloads ───

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ServerInfoResponse {
    name: String,
    version: &'static str,
}

/// The public slice of a project shown on its feedback page.
#[derive(Serialize)]
struct ProjectView {
    id: ProjectId,
    name: String,
    color: String,
}

impl From<Project> for ProjectView {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            color: p.color,
        }
    }
}

#[derive(Serialize)]
struct FeedbackPage {
    project: ProjectView,
    feedbacks: Vec<FeedbackItem>,
}

#[derive(Serialize)]
struct ProjectDetail {
    project: Project,
    feedbacks: Vec<FeedbackItem>,
}

#[derive(Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpvoteRequest {
    #[serde(default)]
    feedback_id: String,
    #[serde(default)]
    voter_token: String,
}

#[derive(Deserialize)]
struct VotesQuery {
    #[serde(default)]
    voter: String,
}

#[derive(Deserialize)]
struct CreateProjectRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    color: Option<String>,
}

// ─── Public handlers ───

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_feedback(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<FeedbackPage>, ServerError> {
    let project = state.store.project_by_slug(&slug).await?;
    let feedbacks = state.store.list_ranked(project.id).await?;

    Ok(Json(FeedbackPage {
        project: project.into(),
        feedbacks,
    }))
}

async fn submit_feedback(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<FeedbackItem>, ServerError> {
    let project = state.store.project_by_slug(&slug).await?;
    let item = state.store.submit(project.id, &req.content).await?;

    info!(slug = %slug, id = %item.id, "Feedback submitted");
    Ok(Json(item))
}

async fn upvote_feedback(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpvoteRequest>,
) -> Result<Json<UpvoteOutcome>, ServerError> {
    if req.feedback_id.trim().is_empty() {
        return Err(ServerError::Validation("Feedback ID is required".into()));
    }

    let project = state.store.project_by_slug(&slug).await?;

    // An id that does not parse cannot name an existing item.
    let id: FeedbackId = req
        .feedback_id
        .parse()
        .map_err(|_| ServerError::NotFound("Feedback".into()))?;

    let item = state.store.get(id).await?;
    if item.project_id != project.id {
        return Err(ServerError::NotFound("Feedback".into()));
    }

    let outcome = state.upvotes.upvote(&req.voter_token, id).await?;
    Ok(Json(outcome))
}

async fn voter_record(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<VotesQuery>,
) -> Result<Json<VoterRecord>, ServerError> {
    let voter = VoterToken::parse(&query.voter)
        .map_err(|e| ServerError::Validation(e.to_string()))?;
    let project = state.store.project_by_slug(&slug).await?;

    let record = state.store.voted_items(project.id, voter).await?;
    Ok(Json(record))
}

// ─── Admin handlers ───

fn verify_admin_token(headers: &HeaderMap, config: &ServerConfig) -> Result<(), ServerError> {
    let Some(ref expected) = config.admin_token else {
        return Err(ServerError::Forbidden(
            "Admin API is disabled (no ADMIN_TOKEN configured)".into(),
        ));
    };

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

    use subtle::ConstantTimeEq;
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ServerError::Forbidden("Invalid admin token".into()));
    }

    Ok(())
}

async fn create_project(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<Project>, ServerError> {
    verify_admin_token(&headers, &state.config)?;

    let project = state
        .store
        .create_project(req.name, req.slug, req.color)
        .await?;
    Ok(Json(project))
}

async fn list_projects(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, ServerError> {
    verify_admin_token(&headers, &state.config)?;
    Ok(Json(state.store.list_projects().await?))
}

async fn project_detail(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetail>, ServerError> {
    verify_admin_token(&headers, &state.config)?;

    let id: ProjectId = id
        .parse()
        .map_err(|_| ServerError::NotFound("Project".into()))?;
    let project = state.store.project(id).await?;
    let feedbacks = state.store.list_ranked(project.id).await?;

    Ok(Json(ProjectDetail { project, feedbacks }))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
