use crate::error::TopicServiceError;
use crate::metrics;
use crate::routes::extract::{TopicJson, TopicPath, TopicQuery};
use crate::routes::requests::{TopicRequest, TopicSearch, TopicUpdateRequest};
use crate::routes::responses::{
    BannerResponse, HealthResponse, InitFailure, SuccessResponse, TopicError,
};
use crate::service::TopicService;
use crate::state::TopicAppState;
use axum::middleware;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response, Result},
    routing::{delete, get, post, put},
};
use engine::error::EndpointError;
use engine::stream::StreamingResponse;
use topics_core::TopicEngine;
use topics_core::model::{CategoryCount, Topic, TopicId, TopicUpdate};
use tracing::{error, info, instrument};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub mod extract;
pub mod requests;
pub mod responses;

const API_ROOT_PATH: &str = "/api";

const BANNER_PATH: &str = "/";
const HEALTH_PATH: &str = "/health";
const INIT_PATH: &str = "/init";
const TOPIC_LIST_PATH: &str = "/topics";
const TOPIC_CREATE_PATH: &str = "/topics";
const TOPIC_GET_PATH: &str = "/topics/{topic_id}";
const TOPIC_UPDATE_PATH: &str = "/topics/{topic_id}";
const TOPIC_DELETE_PATH: &str = "/topics/{topic_id}";
const CATEGORY_STATS_PATH: &str = "/stats/categories";
const METRICS_PATH: &str = "/metrics";

const ENDPOINTS: &[&str] = &[
    "GET /api/health",
    "POST /api/init",
    "GET /api/topics?search=&category=&limit=",
    "GET /api/topics/:id",
    "POST /api/topics",
    "PUT /api/topics/:id",
    "DELETE /api/topics/:id",
    "GET /api/stats/categories",
];

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = API_ROOT_PATH, api = TopicDocs),
    )
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(
    health,
    init_schema,
    list_topics,
    get_topic,
    create_topic,
    update_topic,
    delete_topic,
    category_stats,
))]
struct TopicDocs;

pub fn build<T: TopicEngine>(app_state: TopicAppState<T>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes(app_state))
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/api-docs/openapi.json", api))
        .fallback(unknown_route)
}

async fn unknown_route() -> TopicError {
    TopicError::new(StatusCode::NOT_FOUND, "Route not found")
}

fn routes<S, T: TopicEngine>(app_state: TopicAppState<T>) -> OpenApiRouter<S> {
    let api_router = OpenApiRouter::new()
        .route(HEALTH_PATH, get(health))
        .route(INIT_PATH, post(init_schema::<T>))
        .route(TOPIC_LIST_PATH, get(list_topics::<T>))
        .route(TOPIC_CREATE_PATH, post(create_topic::<T>))
        .route(TOPIC_GET_PATH, get(get_topic::<T>))
        .route(TOPIC_UPDATE_PATH, put(update_topic::<T>))
        .route(TOPIC_DELETE_PATH, delete(delete_topic::<T>))
        .route(CATEGORY_STATS_PATH, get(category_stats::<T>));

    let api_router = match app_state.metrics.clone() {
        Some(metrics_recorder) => {
            info!("metrics enabled, setting up metrics handler");
            api_router
                .route(
                    METRICS_PATH,
                    get(|| async move { metrics_recorder.render() }),
                )
                .route_layer(middleware::from_fn(metrics::track_http))
        }
        None => {
            info!("metrics not enabled, setting up service unavailable metrics handler");
            api_router.route(
                METRICS_PATH,
                get(|| async {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
                    )
                }),
            )
        }
    };

    OpenApiRouter::new()
        .route(BANNER_PATH, get(banner))
        .nest(API_ROOT_PATH, api_router)
        .with_state(app_state)
}

async fn banner() -> BannerResponse {
    BannerResponse::new(ENDPOINTS.to_vec())
}

/// Liveness check. Never touches storage.
#[utoipa::path(
    get,
    path = HEALTH_PATH,
    responses(
        (status = OK, description = "The service is up", body = HealthResponse),
    )
)]
async fn health() -> HealthResponse {
    HealthResponse::now()
}

/// Create the topics table if it does not exist yet.
#[utoipa::path(
    post,
    path = INIT_PATH,
    responses(
        (status = OK, description = "The schema exists", body = SuccessResponse),
        (status = INTERNAL_SERVER_ERROR, description = "No database is configured, or storage failed", body = InitFailure),
    )
)]
#[instrument(skip_all)]
async fn init_schema<T>(State(service): State<TopicService<T>>) -> Response
where
    T: TopicEngine,
{
    match service.init_schema().await {
        Ok(()) => SuccessResponse::with_message("Database initialized").into_response(),
        Err(report) => {
            error!("schema initialization failed: {report:?}");
            InitFailure::from(&report).into_response()
        }
    }
}

/// List topics, newest first.
#[utoipa::path(
    get,
    path = TOPIC_LIST_PATH,
    responses(
        (status = OK, description = "The matching topics, possibly none", body = Vec<Topic>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage rejected the query, e.g. a limit that is not a non-negative integer", body = TopicError),
    ),
    params(TopicSearch)
)]
#[instrument(skip(service), err(Debug))]
async fn list_topics<T>(
    State(service): State<TopicService<T>>,
    TopicQuery(search): TopicQuery<TopicSearch>,
) -> Result<Response, EndpointError<TopicServiceError>>
where
    T: TopicEngine,
{
    let topics = service.list(search.into()).await?;
    metrics::record_retrieved(topics.len());

    Ok(StreamingResponse::ok(topics).into_response())
}

/// Get the topic associated with the given id.
#[utoipa::path(
    get,
    path = TOPIC_GET_PATH,
    responses(
        (status = OK, description = "A topic was found that matched the given id", body = Topic),
        (status = NOT_FOUND, description = "No topic has the given id, or no database is configured", body = TopicError),
        (status = BAD_REQUEST, description = "The id is not a 32-bit integer", body = TopicError),
    ),
    params(
        ("topic_id" = TopicId, Path, description = "The id of the topic to find"),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn get_topic<T>(
    State(service): State<TopicService<T>>,
    TopicPath(topic_id): TopicPath<TopicId>,
) -> Result<Response, EndpointError<TopicServiceError>>
where
    T: TopicEngine,
{
    let topic = service.get(topic_id).await?;

    Ok(topic
        .map(|t| {
            metrics::record_retrieved(1);
            Json(t).into_response()
        })
        .unwrap_or_else(|| TopicError::not_found().into_response()))
}

/// Create a new topic and return its id.
#[utoipa::path(
    post,
    path = TOPIC_CREATE_PATH,
    responses(
        (status = CREATED, description = "The topic was created", body = SuccessResponse),
        (status = BAD_REQUEST, description = "The body is not valid JSON", body = TopicError),
        (status = SERVICE_UNAVAILABLE, description = "No database is configured", body = TopicError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage rejected the topic", body = TopicError),
    ),
    request_body = TopicRequest
)]
#[instrument(skip_all, err(Debug), fields(req.title = topic.title, req.category = topic.category))]
async fn create_topic<T>(
    State(service): State<TopicService<T>>,
    TopicJson(topic): TopicJson<TopicRequest>,
) -> Result<SuccessResponse, EndpointError<TopicServiceError>>
where
    T: TopicEngine,
{
    let id = service.create(topic.into()).await?;
    metrics::record_created();
    Ok(SuccessResponse::created(id))
}

/// Record a view, mark the topic helpful, or replace all of its fields.
/// Succeeds even when no topic has the given id.
#[utoipa::path(
    put,
    path = TOPIC_UPDATE_PATH,
    responses(
        (status = OK, description = "The update was applied", body = SuccessResponse),
        (status = BAD_REQUEST, description = "The id or the body is malformed", body = TopicError),
        (status = SERVICE_UNAVAILABLE, description = "No database is configured", body = TopicError),
        (status = INTERNAL_SERVER_ERROR, description = "Storage rejected the update", body = TopicError),
    ),
    params(
        ("topic_id" = TopicId, Path, description = "The id of the topic to update")
    ),
    request_body = TopicUpdateRequest,
)]
#[instrument(skip(service, update), err(Debug), fields(
    req.increment_view = update.increment_view,
    req.increment_helpful = update.increment_helpful,
))]
async fn update_topic<T>(
    State(service): State<TopicService<T>>,
    TopicPath(topic_id): TopicPath<TopicId>,
    TopicJson(update): TopicJson<TopicUpdateRequest>,
) -> Result<SuccessResponse, EndpointError<TopicServiceError>>
where
    T: TopicEngine,
{
    let update = TopicUpdate::from(update);
    let mode = metrics::update_mode(&update);
    let touched = service.update(topic_id, update).await?;
    metrics::record_update(mode, touched);
    Ok(SuccessResponse::ok())
}

/// Delete the topic associated with the given id. Succeeds even when it never existed.
#[utoipa::path(
    delete,
    path = TOPIC_DELETE_PATH,
    responses(
        (status = OK, description = "The topic was deleted, or never existed", body = SuccessResponse),
        (status = SERVICE_UNAVAILABLE, description = "No database is configured", body = TopicError),
    ),
    params(
        ("topic_id" = TopicId, Path, description = "The id of the topic to delete")
    )
)]
#[instrument(skip(service), err(Debug))]
async fn delete_topic<T>(
    State(service): State<TopicService<T>>,
    TopicPath(topic_id): TopicPath<TopicId>,
) -> Result<SuccessResponse, EndpointError<TopicServiceError>>
where
    T: TopicEngine,
{
    let removed = service.delete(topic_id).await?;
    metrics::record_delete(removed);
    Ok(SuccessResponse::ok())
}

/// Number of topics per category, largest first. Ties are ordered by category name.
#[utoipa::path(
    get,
    path = CATEGORY_STATS_PATH,
    responses(
        (status = OK, description = "Topic counts per category, possibly none", body = Vec<CategoryCount>),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn category_stats<T>(
    State(service): State<TopicService<T>>,
) -> Result<Response, EndpointError<TopicServiceError>>
where
    T: TopicEngine,
{
    let counts = service.category_counts().await?;
    Ok(StreamingResponse::ok(counts).into_response())
}
