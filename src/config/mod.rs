//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (LUNAR_* environment overlay)
//!     → validation.rs (semantic checks, reported not fatal)
//!     → InterceptorConfig (immutable)
//!     → handed to Interceptor::new, which builds every component once
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the traffic lists can only change through
//!   an explicit `Interceptor::reconfigure_traffic`
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::InterceptorConfig;
pub use schema::ProxyConnectionConfig;
pub use schema::TrafficConfig;
pub use schema::FailSafeConfig;
pub use schema::RetryConfig;
pub use schema::ObservabilityConfig;
pub use loader::{load, ConfigError};
pub use validation::{validate_config, ValidationError};
