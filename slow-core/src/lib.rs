pub mod config;
pub mod envelope;
pub mod error;
pub mod health;
pub mod layers;
pub mod request_id;
pub mod server;
pub mod types;
pub mod validation;

pub use config::{
    ConfigError, ConfigProperties, ConfigValue, DatabaseConfig, FromConfigValue, LogConfig,
    LogFormat, ServerConfig, SlowConfig,
};
pub use envelope::{Empty, Envelope};
pub use error::{ApiError, AppError, ErrorKind};
pub use health::health_routes;
pub use layers::{catch_panic_layer, init_tracing, trace_layer, with_default_layers};
pub use request_id::RequestId;
pub use server::{serve, serve_with_shutdown, shutdown_signal, ServeError};
pub use types::ApiResult;
pub use validation::{bind_and_validate, ValidQuery, Validate};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::{
        ApiError, ApiResult, AppError, Empty, Envelope, RequestId, SlowConfig, ValidQuery,
        Validate,
    };
}
