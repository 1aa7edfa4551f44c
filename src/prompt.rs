//! Request Composition
//!
//! Turns a monitoring configuration into the instruction text and schema
//! sent to the model. Built fresh for every call and never stored.

use serde::{Deserialize, Serialize};

use crate::config::{GeneratorSettings, MonitoringConfiguration};
use crate::schema::{report_schema, SchemaNode};

pub const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParameters {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub thinking_budget: Option<u32>,
}

impl From<&GeneratorSettings> for SamplingParameters {
    fn from(settings: &GeneratorSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            thinking_budget: settings.thinking_budget,
        }
    }
}

/// Everything a provider needs for one structured call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub schema: SchemaNode,
    pub sampling: SamplingParameters,
}

impl GenerationRequest {
    pub fn compose(config: &MonitoringConfiguration, settings: &GeneratorSettings) -> Self {
        Self {
            model: settings.model.clone(),
            prompt: build_prompt(config),
            schema: report_schema(),
            sampling: SamplingParameters::from(settings),
        }
    }
}

/// Instruction text with the monitoring context embedded verbatim.
///
/// An empty keyword list is allowed; it only makes the request less specific.
pub fn build_prompt(config: &MonitoringConfiguration) -> String {
    format!(
        "SYSTEM: You are a high-performance autonomous social media monitoring AI agent for the Nigeria Police Force (NPF).\n\
         Your mission is to produce a structured \"TEAM 'B' REPORT\" based on simulated analysis of national security topics.\n\
         \n\
         MONITORING CONTEXT:\n\
         - Keywords: {keywords}\n\
         - Scope: {scope}\n\
         - Platforms: {platforms}\n\
         \n\
         INSTRUCTIONS:\n\
         1. Identify exactly TWO major trending stories related to the monitoring scope.\n\
         2. Format as a formal intelligence report following the TEAM 'B' structure.\n\
         3. Be extremely concise to avoid exceeding token limits.\n\
         4. Each trend description should be 2-3 sentences max.\n\
         5. Each executive summary point should be one clear sentence.\n\
         6. Ensure the output is valid, complete JSON.\n\
         \n\
         JSON SCHEMA REQUIREMENTS:\n\
         - report_date: ISO string\n\
         - time: Current time in WAT (e.g., \"14:30 WAT\")\n\
         - executive_summary: Array of 2 clear summary strings\n\
         - general_outlook: String (max 60 words)\n\
         - new_developments: Array of exactly 2 Trend objects\n\
         - assessment: Array of 3 numbered analysis strings\n\
         - recommendations: Array of 2 actionable strings\n\
         - sign_off: Formal closing phrase\n",
        keywords = config.keywords().join(", "),
        scope = config.scope().join(", "),
        platforms = config.platforms().join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_context_verbatim() {
        let config = MonitoringConfiguration::new(["NPF", "Yahoo Boys, Lagos"], ["Cybercrime Trends"], ["Telegram", "TikTok"]);
        let prompt = build_prompt(&config);
        assert!(prompt.contains("- Keywords: NPF, Yahoo Boys, Lagos\n"));
        assert!(prompt.contains("- Scope: Cybercrime Trends\n"));
        assert!(prompt.contains("- Platforms: Telegram, TikTok\n"));
        assert!(prompt.contains("exactly TWO"));
    }

    #[test]
    fn test_empty_keywords_still_compose() {
        let config = MonitoringConfiguration::new(Vec::<String>::new(), ["National Security"], ["Facebook"]);
        let prompt = build_prompt(&config);
        assert!(prompt.contains("- Keywords: \n"));
    }

    #[test]
    fn test_request_carries_settings() {
        let settings = GeneratorSettings {
            model: "gemini-test".into(),
            temperature: 0.2,
            ..GeneratorSettings::default()
        };
        let request = GenerationRequest::compose(&MonitoringConfiguration::default(), &settings);
        assert_eq!(request.model, "gemini-test");
        assert_eq!(request.sampling.max_output_tokens, 3000);
        assert_eq!(request.sampling.thinking_budget, Some(1000));
        assert_eq!(request.schema, report_schema());
    }
}
