//! Sentinel Intelligence Reports
//!
//! Structured-generation client for TEAM 'B' social media monitoring reports:
//! - Prompt + response schema composition from a monitoring configuration
//! - Gemini and OpenAI-compatible providers with schema-constrained output
//! - Post-parse validation with classified, non-fatal errors
//! - In-memory report session with an in-flight guard and cancellation
//! - Analytics, plain-text rendering and a simulated live feed

pub mod analytics;
pub mod config;
pub mod error;
pub mod feed;
pub mod generator;
pub mod prompt;
pub mod provider;
pub mod render;
pub mod report;
pub mod schema;
pub mod session;
pub mod telemetry;
pub mod utils;

// Re-exports for convenience
pub use config::{ConfigError, GeneratorSettings, MonitoringConfiguration, ProviderKind};
pub use error::{FormatProblem, GenerationError};
pub use generator::StructuredReportGenerator;
pub use prompt::GenerationRequest;
pub use provider::{ModelReply, ProviderError, StructuredModelClient};
pub use report::{DevelopmentItem, EngagementMetrics, IntelligenceReport, SentimentBreakdown};
pub use session::{ReportSession, SessionError};
