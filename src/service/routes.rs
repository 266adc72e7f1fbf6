//! Axum routes for the blueprint service.

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BlueprintError;
use crate::reader::Syntax;
use crate::types::CanonicalBlueprint;
use crate::validate::SchemaViolation;
use crate::BLUEPRINT_SCHEMA_VERSION;

use super::middleware::{record_cache_lookup, record_parse_metrics};
use super::state::{ParserRef, ServiceState};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to parse a blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequest {
    /// Raw blueprint text.
    pub text: String,
    /// `yaml` (default) or `json`.
    #[serde(default)]
    pub syntax: Option<String>,
    /// Parser mode; the service default when absent.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Successful parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    /// The canonical blueprint.
    pub blueprint: CanonicalBlueprint,
    /// xxh64 content hash of the blueprint.
    pub content_hash: String,
    /// Parser used.
    pub parser_ref: ParserRef,
    /// Whether the result came from the parse cache.
    pub cache_hit: bool,
}

/// Validation result (always returned with 200).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// Whether the blueprint parsed cleanly.
    pub valid: bool,
    /// Number of prompts, when valid.
    pub prompt_count: usize,
    /// Errors, when invalid.
    pub errors: Vec<ErrorResponse>,
    /// Parser used.
    pub parser_ref: ParserRef,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the handler answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Canonical blueprint schema version.
    pub schema_version: String,
    /// Mode used when a request names none.
    pub default_mode: String,
    /// Registered parsers.
    pub parsers: Vec<ParserRef>,
    /// Hash over every registered parser's params hash.
    pub registry_fingerprint: String,
    /// Combined parse cache usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheHealth>,
}

/// Cache usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    /// Entries across all mode caches.
    pub entries: usize,
    /// Combined capacity.
    pub capacity: usize,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Always "alive".
    pub status: String,
}

/// Readiness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service accepts parse traffic.
    pub ready: bool,
    /// Reason when not ready.
    pub details: Option<String>,
}

/// Structured error response with correlation ID for tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Schema violations, for `SCHEMA_VIOLATION` errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<SchemaViolation>,
    /// Correlation ID for request tracing (matches X-Request-Id or generated UUID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            violations: Vec::new(),
            correlation_id: None,
        }
    }

    /// Add a correlation ID to the error.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

impl From<&BlueprintError> for ErrorResponse {
    fn from(error: &BlueprintError) -> Self {
        Self {
            violations: error.violations().to_vec(),
            ..Self::new(error.kind(), error.to_string())
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

struct ParseRun {
    parser_ref: ParserRef,
    result: Result<CanonicalBlueprint, BlueprintError>,
    cache_hit: bool,
}

/// Resolve syntax and mode, then parse through the mode's cache.
fn run_parse(state: &ServiceState, request: &ParseRequest, correlation: &str) -> Result<ParseRun, HandlerError> {
    let bad_request = |code: &str, error: String| {
        tracing::warn!(code, error = %error, correlation_id = correlation, "Rejected parse request");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(code, error).with_correlation_id(correlation)),
        )
    };

    let syntax = match request.syntax.as_deref() {
        None => Syntax::default(),
        Some(tag) => Syntax::from_str(tag)
            .ok_or_else(|| bad_request("INVALID_SYNTAX", format!("Unknown syntax: {}", tag)))?,
    };
    let (parser_ref, cache) = state
        .registry
        .resolve(request.mode.as_deref())
        .ok_or_else(|| {
            bad_request(
                "UNKNOWN_MODE",
                format!("Unknown parser mode: {}", request.mode.as_deref().unwrap_or("")),
            )
        })?;

    let start = Instant::now();
    let outcome = cache.parse(&request.text, syntax);
    record_cache_lookup(outcome.cache_hit);
    record_parse_metrics(
        syntax.as_str(),
        &parser_ref.mode,
        outcome.result.as_ref().map(|b| b.len()).unwrap_or(0),
        outcome.result.as_ref().err().map(|e| e.kind()),
        start.elapsed().as_micros() as u64,
    );

    Ok(ParseRun {
        parser_ref: parser_ref.clone(),
        result: outcome.result,
        cache_hit: outcome.cache_hit,
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Parse a blueprint into canonical form.
///
/// Parse failures return 422 with the error code and any schema violations.
async fn parse_handler(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, HandlerError> {
    let correlation = correlation_id(&headers);
    let run = run_parse(&state, &request, &correlation)?;

    match run.result {
        Ok(blueprint) => Ok(Json(ParseResponse {
            content_hash: blueprint.content_hash(),
            blueprint,
            parser_ref: run.parser_ref,
            cache_hit: run.cache_hit,
        })),
        Err(e) => {
            tracing::warn!(
                code = e.kind(),
                error = %e,
                correlation_id = %correlation,
                "Blueprint rejected"
            );
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::from(&e).with_correlation_id(correlation)),
            ))
        }
    }
}

/// Validate a blueprint for live authoring feedback.
async fn validate_handler(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ValidateResponse>, HandlerError> {
    let correlation = correlation_id(&headers);
    let run = run_parse(&state, &request, &correlation)?;

    Ok(Json(match run.result {
        Ok(blueprint) => ValidateResponse {
            valid: true,
            prompt_count: blueprint.len(),
            errors: Vec::new(),
            parser_ref: run.parser_ref,
        },
        Err(e) => ValidateResponse {
            valid: false,
            prompt_count: 0,
            errors: vec![ErrorResponse::from(&e)],
            parser_ref: run.parser_ref,
        },
    }))
}

/// Health check endpoint (detailed).
async fn health_handler(State(state): State<ServiceState>) -> Json<HealthResponse> {
    let registry = &state.registry;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: BLUEPRINT_SCHEMA_VERSION.to_string(),
        default_mode: registry.default_mode().to_string(),
        parsers: registry.list(),
        registry_fingerprint: registry.fingerprint().to_string(),
        cache: registry.cache_stats().map(|stats| CacheHealth {
            entries: stats.len,
            capacity: stats.cap,
        }),
    })
}

/// Liveness probe endpoint.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// The service has no external dependencies; it is ready once a parser is registered.
async fn readiness_handler(
    State(state): State<ServiceState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    if state.registry.is_empty() {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                details: Some("No parser registered".to_string()),
            }),
        ))
    } else {
        Ok(Json(ReadinessResponse {
            ready: true,
            details: None,
        }))
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the blueprint service.
pub fn create_router(state: ServiceState) -> Router {
    Router::new()
        .route("/api/parse", post(parse_handler))
        .route("/api/validate", post(validate_handler))
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, syntax: Option<&str>, mode: Option<&str>) -> ParseRequest {
        ParseRequest {
            text: text.to_string(),
            syntax: syntax.map(str::to_string),
            mode: mode.map(str::to_string),
        }
    }

    #[test]
    fn test_run_parse_success() {
        let state = ServiceState::default();
        let run = run_parse(&state, &request("- id: p1\n  prompt: Q\n", None, None), "c1")
            .map_err(|(status, _)| status)
            .unwrap();
        assert_eq!(run.parser_ref.mode, "default");
        assert_eq!(run.result.unwrap().prompt_ids(), vec!["p1"]);
    }

    #[test]
    fn test_run_parse_rejects_unknown_syntax_and_mode() {
        let state = ServiceState::default();
        let (status, Json(body)) = run_parse(&state, &request("x", Some("toml"), None), "c1")
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_SYNTAX");
        assert_eq!(body.correlation_id.as_deref(), Some("c1"));

        let (_, Json(body)) = run_parse(&state, &request("x", None, Some("paranoid")), "c2")
            .err()
            .unwrap();
        assert_eq!(body.code, "UNKNOWN_MODE");
    }

    #[test]
    fn test_error_response_carries_violations() {
        let err = crate::parse_and_normalize("- id: p1\n  prompt: A\n- id: p1\n  prompt: B\n", Syntax::Yaml)
            .unwrap_err();
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "SCHEMA_VIOLATION");
        assert_eq!(response.violations.len(), 1);
    }

    #[test]
    fn test_error_response_body_fields() {
        let body = serde_json::to_value(ErrorResponse::new("EMPTY_BLUEPRINT", "Blueprint is empty.")).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Blueprint is empty.", "code": "EMPTY_BLUEPRINT"}));

        let body = serde_json::to_value(ErrorResponse::new("X", "y").with_correlation_id("c9")).unwrap();
        assert_eq!(body["correlation_id"], "c9");
    }

    #[test]
    fn test_correlation_id_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "abc".parse().unwrap());
        assert_eq!(correlation_id(&headers), "abc");
        assert_eq!(correlation_id(&HeaderMap::new()).len(), 36);
    }
}
