//! Structured Report Generator
//!
//! One call in, one typed report (or a classified error) out.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::{GeneratorSettings, MonitoringConfiguration};
use crate::error::{FormatProblem, GenerationError};
use crate::prompt::GenerationRequest;
use crate::provider::StructuredModelClient;
use crate::report::{IntelligenceReport, ReportPayload};
use crate::schema::SchemaNode;
use crate::utils::truncate::{approx_token_count, excerpt, truncate_middle};

pub struct StructuredReportGenerator {
    client: Arc<dyn StructuredModelClient>,
    settings: GeneratorSettings,
}

impl StructuredReportGenerator {
    /// The client is created once at startup and shared by reference.
    pub fn new(client: Arc<dyn StructuredModelClient>, settings: GeneratorSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Compose the request that `generate` would send for `config`.
    pub fn request_for(&self, config: &MonitoringConfiguration) -> GenerationRequest {
        GenerationRequest::compose(config, &self.settings)
    }

    /// Request a report for `config` and materialize it.
    ///
    /// Exactly one provider round trip. Values the model produced are kept
    /// as-is; only the identifier is added here.
    pub async fn generate(&self, config: &MonitoringConfiguration) -> Result<IntelligenceReport, GenerationError> {
        let request = self.request_for(config);
        debug!(
            prompt_tokens = approx_token_count(&request.prompt),
            prompt = %truncate_middle(&request.prompt, 400),
            "Composed structured report request"
        );
        info!(
            model = %request.model,
            keywords = config.keywords().len(),
            "Requesting intelligence report"
        );

        let reply = self.client.generate_structured(&request).await.map_err(|e| {
            error!("Model request failed: {}", e);
            GenerationError::from(e)
        })?;

        let text = match reply.text {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                warn!(finish_reason = ?reply.finish_reason, "Model returned an empty response");
                return Err(GenerationError::EmptyResponse { finish_reason: reply.finish_reason });
            }
        };

        let payload = parse_report(&text, &request.schema).inspect_err(|e| {
            error!("Report parse failed: {} | raw: {}", e, excerpt(&text, 100));
        })?;

        let report = IntelligenceReport::from_payload(payload);
        info!(id = %report.id, "Intelligence report generated");
        Ok(report)
    }
}

/// Parse and validate raw model text against `schema`.
///
/// Stages: JSON syntax, structural schema check, typed decode, semantic
/// checks. The first failure becomes a `GenerationError::Format`.
pub fn parse_report(text: &str, schema: &SchemaNode) -> Result<ReportPayload, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| GenerationError::format(FormatProblem::InvalidJson(e.to_string()), text))?;

    schema.validate(&value).map_err(|v| {
        GenerationError::format(
            FormatProblem::SchemaMismatch { path: v.path, message: v.message },
            text,
        )
    })?;

    let payload: ReportPayload = serde_json::from_value(value).map_err(|e| {
        GenerationError::format(
            FormatProblem::SchemaMismatch { path: "$".to_string(), message: e.to_string() },
            text,
        )
    })?;

    payload.check().map_err(|p| GenerationError::format(p, text))?;
    Ok(payload)
}
