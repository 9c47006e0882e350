//! HTTP services of the Constitutional AI Router.
//!
//! Three independent axum services, each with its own `router()`:
//!
//! | Service | Default port | Endpoints |
//! |---------|--------------|-----------|
//! | [`judge`] | 8888 | `POST /api/premium`, `POST /api/score` |
//! | [`bridge`] | 8001 | `POST /validate`, `GET /constitution` |
//! | [`enhance`] | 8002 | `POST /api/enhance`, `POST /api/file` |
//!
//! All three also answer `GET /` (identity) and `GET /health`. Outbound calls
//! between services go through [`upstream::UpstreamClient`].

pub mod bridge;
pub mod config;
pub mod enhance;
pub mod error;
pub mod judge;
pub mod serve;
pub mod telemetry;
pub mod upstream;

pub use config::{BridgeConfig, CairConfig, ConfigError, EnhanceConfig, JudgeConfig};
pub use error::{ApiError, ErrorBody};
pub use serve::{bind, serve, ServeError};
pub use telemetry::LogFormat;
pub use upstream::{UpstreamClient, UpstreamError};
