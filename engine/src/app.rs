use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::response::Response;
use error_stack::{Report, ResultExt};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info, warn};

const WILDCARD_ORIGIN: &str = "*";

pub struct AppProperties {
    pub port: u16,
    pub cors: CorsPolicy,
}

/// Which origins may call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, no credentials. Used outside of production.
    AnyOrigin,
    /// Only the listed deployment origins, with credentialed requests allowed.
    Origins(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
#[error("the app exited with an error")]
pub struct AppError;

pub type AppResult<T> = Result<T, Report<AppError>>;

impl CorsPolicy {
    pub fn layer(&self) -> AppResult<CorsLayer> {
        let layer = match self {
            CorsPolicy::AnyOrigin => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
            CorsPolicy::Origins(origins) => {
                if origins.iter().any(|o| o.trim() == WILDCARD_ORIGIN) {
                    return Err(Report::new(AppError)
                        .attach("a wildcard origin cannot be combined with credentialed requests"));
                }

                let origins = origins
                    .iter()
                    .map(|o| {
                        HeaderValue::from_str(o)
                            .change_context(AppError)
                            .attach_with(|| format!("invalid CORS origin '{o}'"))
                    })
                    .collect::<AppResult<Vec<_>>>()?;

                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                    .allow_credentials(true)
            }
        };
        Ok(layer)
    }
}

pub async fn run(routes: Router, properties: AppProperties) -> AppResult<()> {
    let listener = build_listener(properties.port).await?;

    let routes = routes.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http().on_response(
                |res: &Response, latency: Duration, _span: &Span| {
                    info!("returned {} in {}ms", res.status(), latency.as_millis());
                },
            ))
            .layer(properties.cors.layer()?),
    );

    info!(
        "starting up topic service on port {}",
        listener.local_addr().change_context(AppError)?.port()
    );

    serve_on(listener, routes).await
}

async fn serve_on(listener: TcpListener, routes: Router) -> AppResult<()> {
    axum::serve(listener, routes)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .change_context(AppError)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!("failed to listen for shutdown signal: {e}"),
    }
}

async fn build_listener(port: u16) -> AppResult<TcpListener> {
    TcpListener::bind(std::net::SocketAddr::V4(SocketAddrV4::new(
        Ipv4Addr::UNSPECIFIED,
        port,
    )))
    .await
    .change_context(AppError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request};
    use axum::routing::get;
    use tower::ServiceExt;

    const ALLOWED_ORIGIN: &str = "https://kb.example.com";

    fn restricted() -> CorsPolicy {
        CorsPolicy::Origins(vec![ALLOWED_ORIGIN.into(), "https://admin.example.com".into()])
    }

    async fn headers_for(policy: &CorsPolicy, origin: &str) -> HeaderMap {
        let routes = Router::new()
            .route("/api/health", get(|| async { "ok" }))
            .layer(policy.layer().unwrap());

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();

        routes.oneshot(request).await.unwrap().headers().clone()
    }

    #[test]
    fn restricted_policy_rejects_invalid_origin() {
        let policy = CorsPolicy::Origins(vec![ALLOWED_ORIGIN.into(), "bad\norigin".into()]);

        assert!(policy.layer().is_err());
    }

    #[test]
    fn restricted_policy_rejects_wildcard_origin() {
        let policy = CorsPolicy::Origins(vec![ALLOWED_ORIGIN.into(), "*".into()]);

        assert!(policy.layer().is_err());
    }

    #[tokio::test]
    async fn listed_origin_is_allowed_with_credentials() {
        let headers = headers_for(&restricted(), ALLOWED_ORIGIN).await;

        assert_eq!(
            Some(ALLOWED_ORIGIN),
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok())
        );
        assert_eq!(
            Some("true"),
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok())
        );
    }

    #[tokio::test]
    async fn foreign_origin_is_not_allowed() {
        let headers = headers_for(&restricted(), "https://evil.example.net").await;

        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn any_origin_policy_allows_everyone_without_credentials() {
        let headers = headers_for(&CorsPolicy::AnyOrigin, "https://evil.example.net").await;

        assert_eq!(
            Some("*"),
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok())
        );
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}
