//! Blueprint Service Binary
//!
//! Serves live authoring validation for blueprint editors.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT`: Service port (default: 8002)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//! - `BLUEPRINT_PARSER_MODE`: default | lenient | strict (default: default)
//! - `BLUEPRINT_CACHE_SIZE`: parse cache entries per mode, 0 disables (default: 1000)
//!
//! ## Usage
//!
//! ```bash
//! LOG_FORMAT=pretty cargo run --bin blueprint_service --features service
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use blueprint_kernel::service::{create_router, metrics_middleware, ServiceState};

const REQUEST_ID_HEADER: &str = "x-request-id";
const DEFAULT_PORT: u16 = 8002;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Pretty,
}

/// Process settings read once at startup.
#[derive(Debug, Clone)]
struct Settings {
    host: String,
    port: u16,
    log_format: LogFormat,
}

impl Settings {
    fn from_env() -> Self {
        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            log_format,
        }
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blueprint_service=info,blueprint_kernel=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_span_events(FmtSpan::CLOSE))
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init(),
    }
}

/// Tag each request with a correlation id, echo it back, and log one access line.
///
/// The id is inserted into the request headers so route handlers report the
/// same id in error bodies.
async fn access_log(mut request: Request, next: Next) -> Response {
    let started = Instant::now();

    let request_id = match request.headers().get(REQUEST_ID_HEADER) {
        Some(value) => value.clone(),
        None => {
            let generated = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request.headers_mut().insert(REQUEST_ID_HEADER, generated.clone());
            generated
        }
    };
    let request_id_text = request_id.to_str().unwrap_or("invalid").to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!("request", request_id = %request_id_text, method = %method, path = %path);
    let mut response = next.run(request).instrument(span).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);

    info!(
        target: "blueprint_service::access",
        request_id = %request_id_text,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_us = started.elapsed().as_micros() as u64,
        "request completed"
    );

    response
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!(signal, "Draining connections before shutdown");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env();
    init_tracing(settings.log_format);

    let state = ServiceState::from_env();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        build_sha = option_env!("BUILD_SHA").unwrap_or("dev"),
        default_mode = %state.registry.default_mode(),
        parser_count = state.registry.len(),
        registry_fingerprint = %state.registry.fingerprint(),
        "Starting Blueprint Service"
    );

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(access_log))
            .layer(middleware::from_fn(metrics_middleware)),
    );

    let addr = settings.addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Blueprint Service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Blueprint Service stopped");
    Ok(())
}
