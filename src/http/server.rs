//! SBI server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with one catch-all dispatch handler
//! - Wire up middleware (tracing, request ID, CORS)
//! - Bind the listener (plaintext or TLS) before serving
//! - Dispatch requests through the route table to the operation handler
//! - Record per-route metrics

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::SbiConfig;
use crate::http::request::{build_envelope, X_REQUEST_ID};
use crate::http::response::ResponseEnvelope;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::routing::{RouteTable, RouteTarget};
use crate::services::OperationHandler;

/// Body of `GET {apiRoot}/`.
pub const INDEX_GREETING: &str = "Hello World!";

/// Fatal SBI listener setup failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid SBI bind address '{0}'")]
    InvalidAddress(String),
    #[error("failed to bind SBI listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("https scheme requires sbi.tls.pem and sbi.tls.key")]
    MissingTls,
    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),
    #[error("SBI server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// State shared by every dispatch call.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub handler: Arc<dyn OperationHandler>,
    pub max_body_size: usize,
}

/// Build the SBI router.
pub fn build_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route("/{*path}", any(dispatch))
        .route("/", any(dispatch))
        .with_state(state)
        .layer(cors_layer())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

/// Any origin, the usual methods, credentials allowed, one-day preflight cache.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::USER_AGENT,
            HeaderName::from_static("x-requested-with"),
            header::IF_MODIFIED_SINCE,
            header::IF_NONE_MATCH,
            header::CACHE_CONTROL,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("token"),
            HeaderName::from_static(X_REQUEST_ID),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
}

/// Catch-all handler: route lookup, envelope build, delegate, serialize.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let Some(found) = state.routes.lookup(&method, &path) else {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request("none", StatusCode::NOT_FOUND.as_u16(), start);
        return StatusCode::NOT_FOUND.into_response();
    };
    let route = found.entry;

    tracing::debug!(request_id = %request_id, route = route.name, path = %path, "Dispatching request");

    let response = match route.target {
        RouteTarget::Index => (StatusCode::OK, INDEX_GREETING).into_response(),
        RouteTarget::Stub => {
            tracing::warn!(route = route.name, "Operation not implemented, replying with empty object");
            ResponseEnvelope::stub().into_response(None)
        }
        RouteTarget::Operation(operation) => {
            match build_envelope(request, route.body, found.params, state.max_body_size).await {
                Ok(envelope) => state.handler.handle(operation, envelope).into_response(route.multipart_status),
                Err(e) => {
                    tracing::info!(request_id = %request_id, route = route.name, error = %e, "Request rejected");
                    ResponseEnvelope::problem(e.into_problem()).into_response(None)
                }
            }
        }
    };

    metrics::record_request(route.name, response.status().as_u16(), start);
    response
}

enum Bound {
    Plain(TcpListener),
    Tls(std::net::TcpListener, RustlsConfig),
}

/// An SBI listener that is bound and ready to serve.
pub struct SbiServer {
    bound: Bound,
    local_addr: SocketAddr,
    router: Router,
}

impl SbiServer {
    /// Bind the listener and load TLS material. Every error here is fatal.
    pub async fn bind(config: &SbiConfig, router: Router) -> Result<Self, ServerError> {
        let ip = config
            .binding_ipv4
            .parse::<std::net::IpAddr>()
            .map_err(|_| ServerError::InvalidAddress(config.binding_ipv4.clone()))?;
        let addr = SocketAddr::new(ip, config.port);

        let (bound, local_addr) = if config.is_tls() {
            let tls = config.tls.as_ref().ok_or(ServerError::MissingTls)?;
            let rustls = load_tls_config(tls.pem.as_ref(), tls.key.as_ref())
                .await
                .map_err(ServerError::Tls)?;
            let listener = std::net::TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
            listener
                .set_nonblocking(true)
                .map_err(|source| ServerError::Bind { addr, source })?;
            let local_addr = listener.local_addr().map_err(|source| ServerError::Bind { addr, source })?;
            (Bound::Tls(listener, rustls), local_addr)
        } else {
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|source| ServerError::Bind { addr, source })?;
            let local_addr = listener.local_addr().map_err(|source| ServerError::Bind { addr, source })?;
            (Bound::Plain(listener), local_addr)
        };

        tracing::info!(address = %local_addr, scheme = %config.scheme, "SBI listener bound");
        Ok(Self {
            bound,
            local_addr,
            router,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the shutdown signal, then finish in-flight requests for
    /// at most `grace`.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>, grace: Duration) -> Result<(), ServerError> {
        let addr = self.local_addr;
        match self.bound {
            Bound::Plain(listener) => {
                let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
                let serve = axum::serve(listener, self.router.into_make_service())
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                        let _ = signalled_tx.send(());
                    })
                    .into_future();
                tokio::pin!(serve);
                tokio::select! {
                    result = &mut serve => result.map_err(ServerError::Serve)?,
                    _ = async {
                        if signalled_rx.await.is_ok() {
                            tokio::time::sleep(grace).await;
                        } else {
                            std::future::pending::<()>().await;
                        }
                    } => {
                        tracing::warn!(address = %addr, "Grace period elapsed, dropping open SBI connections");
                    }
                }
            }
            Bound::Tls(listener, rustls) => {
                let handle = axum_server::Handle::new();
                let signal_handle = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    signal_handle.graceful_shutdown(Some(grace));
                });
                axum_server::from_tcp_rustls(listener, rustls)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await
                    .map_err(ServerError::Serve)?;
            }
        }

        tracing::info!(address = %addr, "SBI server stopped");
        Ok(())
    }
}
