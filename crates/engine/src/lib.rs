//! Rolecast Engine library.
//!
//! Character creation and directed two-character scenes on top of pluggable
//! text and image generators.
//!
//! ## Structure
//!
//! - `use_cases/` - Scene direction and character workflows
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
pub use infrastructure::config::{ConfigError, EngineConfig};
pub use infrastructure::telemetry::init_tracing;
