//! Axum server setup
//!
//! Middleware from outermost to innermost: request id assignment, tracing,
//! timeout, request id propagation, CORS.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::HttpConfig;
use crate::store::CommentRepository;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub comments: Arc<dyn CommentRepository>,
}

impl AppState {
    pub fn new(comments: Arc<dyn CommentRepository>) -> Self {
        Self { comments }
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState, config: &HttpConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                is_local_origin(origin)
            }))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id,
            )
        }))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::comments::router())
        .layer(middleware)
        .with_state(Arc::new(state))
}

fn is_local_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    ["http://localhost", "http://127.0.0.1"].iter().any(|prefix| {
        origin
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
    })
}

/// Bind `config.bind_addr` and serve until `shutdown` resolves.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(store.clone());
/// run_server(state, &config.http, shutdown_signal()).await?;
/// store.shutdown().await;
/// ```
pub async fn run_server<F>(state: AppState, config: &HttpConfig, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);
    serve_listener(listener, state, config, shutdown).await
}

/// Serve on an already-bound listener.
///
/// Stops accepting when `shutdown` resolves and returns once in-flight
/// requests have finished.
pub async fn serve_listener<F>(
    listener: TcpListener,
    state: AppState,
    config: &HttpConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C, SIGTERM, SIGHUP or SIGQUIT).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let other = async {
        use tokio::signal::unix::{signal, SignalKind};

        let (Ok(mut term), Ok(mut hup), Ok(mut quit)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
            signal(SignalKind::quit()),
        ) else {
            tracing::error!("failed to install unix signal handlers");
            return std::future::pending::<&'static str>().await;
        };

        tokio::select! {
            _ = term.recv() => "SIGTERM",
            _ = hup.recv() => "SIGHUP",
            _ = quit.recv() => "SIGQUIT",
        }
    };

    #[cfg(not(unix))]
    let other = std::future::pending::<&'static str>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        name = other => {
            tracing::info!("Received {}, starting shutdown", name);
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockComments;
    use axum::http::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(Arc::new(MockComments::new())), &HttpConfig::default())
    }

    #[test]
    fn default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.cors_permissive);
    }

    #[test]
    fn local_origins() {
        let ok = ["http://localhost", "http://localhost:3000", "http://127.0.0.1:8080"];
        for origin in ok {
            assert!(is_local_origin(&HeaderValue::from_static(origin)), "{origin}");
        }
        let bad = ["http://localhost.evil.com", "https://example.com", "http://127.0.0.10"];
        for origin in bad {
            assert!(!is_local_origin(&HeaderValue::from_static(origin)), "{origin}");
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn request_id_is_generated() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get("x-request-id").expect("request id header");
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn request_id_is_propagated() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/comments/1")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_and_stops_on_shutdown() {
        for _ in 0..3 {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (tx, rx) = tokio::sync::oneshot::channel::<()>();

            let state = AppState::new(Arc::new(MockComments::new()));
            let server = tokio::spawn(async move {
                serve_listener(listener, state, &HttpConfig::default(), async {
                    let _ = rx.await;
                })
                .await
            });

            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            assert!(response.starts_with("HTTP/1.1 200"), "{response}");

            tx.send(()).unwrap();
            server.await.unwrap().unwrap();
        }
    }
}
