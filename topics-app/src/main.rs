use crate::config::AppConfig;
use axum::Router;
use dotenv::dotenv;
use engine::app::{self, AppError, AppProperties, AppResult};
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use repositories::postgres::initializer::RepoCreator;
use repositories::postgres::topics::TopicRepo;
use topics_routes::service::TopicService;
use topics_routes::state::TopicAppState;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("topic service shutting down"),
        Err(e) => {
            error!("topic service exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("TOPICS_LOG"))
        .init();
}

async fn try_main() -> AppResult<()> {
    init_logging();

    if let Err(e) = dotenv() {
        warn!("failed to load .env file: {e}");
    }

    let config = AppConfig::from_env().change_context(AppError)?;
    info!(
        port = config.port,
        pool_size = config.pool.max_size,
        cors = ?config.cors,
        metrics = config.metrics_enabled,
        "configuration loaded"
    );

    let engine = TopicEngine::new(build_repo(&config)?);
    let (routes, service) = build_routes(engine, config.metrics_enabled)?;

    let result = app::run(
        routes,
        AppProperties {
            port: config.port,
            cors: config.cors,
        },
    )
    .await;

    service.close();
    result
}

fn build_routes(
    engine: TopicEngine,
    metrics_enabled: bool,
) -> AppResult<(Router, TopicService<TopicEngine>)> {
    debug!("building routes..");
    let app_state = if metrics_enabled {
        TopicAppState::new_with_metrics(engine).change_context(AppError)?
    } else {
        TopicAppState::new_without_metrics(engine)
    };
    let service = app_state.service.clone();

    Ok((topics_routes::routes::build(app_state), service)).inspect(|_| debug!("routes built"))
}

#[instrument(skip_all)]
fn build_repo(config: &AppConfig) -> AppResult<Option<TopicRepo>> {
    let Some(connection_details) = config.database.clone() else {
        warn!("no database configured, reads answer empty and writes are unavailable");
        return Ok(None);
    };

    debug!("initializing repository");
    RepoCreator::default()
        .with_pool_settings(config.pool)
        .create(connection_details)
        .map(Some)
        .change_context(AppError)
}

#[derive(Debug, Clone)]
struct TopicEngine {
    repo: Option<TopicRepo>,
}

impl TopicEngine {
    fn new(repo: Option<TopicRepo>) -> Self {
        Self { repo }
    }
}

impl topics_core::TopicEngine for TopicEngine {
    type Repo = TopicRepo;

    fn repo(&self) -> Option<Self::Repo> {
        self.repo.clone()
    }
}
