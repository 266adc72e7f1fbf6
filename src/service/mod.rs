//! Blueprint REST Service
//!
//! Exposes the parser for authoring UIs that need live validation.
//!
//! ## Endpoints
//!
//! - `POST /api/parse` - Parse a blueprint into canonical form
//! - `POST /api/validate` - Validate a blueprint (always 200, `valid` flag)
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_cache_lookup, record_parse_metrics};
pub use routes::{create_router, ErrorResponse, ParseRequest, ParseResponse, ValidateResponse};
pub use state::{ParserRef, ParserRegistry, ServiceState};
