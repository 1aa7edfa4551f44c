//! Report Records
//!
//! Typed shape of a TEAM 'B' intelligence report as produced by the model,
//! plus the identified record the rest of the application consumes.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FormatProblem;

/// Number of development items every report carries.
pub const DEVELOPMENTS_PER_REPORT: usize = 2;

/// Sentiment split for a single development.
///
/// The three values are independent non-negative numbers. They are kept
/// exactly as the model produced them and are never rescaled to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentBreakdown {
    pub fn new(positive: f64, neutral: f64, negative: f64) -> Self {
        Self { positive, neutral, negative }
    }

    pub fn total(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngagementMetrics {
    #[serde(deserialize_with = "non_negative_integer")]
    #[schemars(with = "u64")]
    pub volume: u64,
    pub trend_score: f64,
}

/// One trending topic inside a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DevelopmentItem {
    pub title: String,
    pub description: String,
    pub sentiment: SentimentBreakdown,
    pub matched_keywords: Vec<String>,
    pub platforms: Vec<String>,
    pub engagement: EngagementMetrics,
}

/// The report body exactly as the model is asked to emit it (no identifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportPayload {
    pub report_date: String,
    pub time: String,
    pub executive_summary: Vec<String>,
    pub general_outlook: String,
    pub new_developments: Vec<DevelopmentItem>,
    pub assessment: Vec<String>,
    pub recommendations: Vec<String>,
    pub sign_off: String,
}

impl ReportPayload {
    /// Semantic checks that a JSON shape check cannot express on its own.
    pub fn check(&self) -> Result<(), FormatProblem> {
        if self.new_developments.len() != DEVELOPMENTS_PER_REPORT {
            return Err(FormatProblem::InvalidValue {
                path: "$.new_developments".to_string(),
                message: format!(
                    "expected exactly {} items, found {}",
                    DEVELOPMENTS_PER_REPORT,
                    self.new_developments.len()
                ),
            });
        }

        for (idx, item) in self.new_developments.iter().enumerate() {
            let base = format!("$.new_developments[{}]", idx);
            let s = &item.sentiment;
            for (name, value) in [("positive", s.positive), ("neutral", s.neutral), ("negative", s.negative)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(FormatProblem::InvalidValue {
                        path: format!("{}.sentiment.{}", base, name),
                        message: format!("expected a non-negative number, found {}", value),
                    });
                }
            }
            if !item.engagement.trend_score.is_finite() {
                return Err(FormatProblem::InvalidValue {
                    path: format!("{}.engagement.trend_score", base),
                    message: "expected a finite number".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// A generated report with its session identifier attached.
///
/// Created once per successful generation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IntelligenceReport {
    pub id: String,
    pub report_date: String,
    pub time: String,
    pub executive_summary: Vec<String>,
    pub general_outlook: String,
    pub new_developments: Vec<DevelopmentItem>,
    pub assessment: Vec<String>,
    pub recommendations: Vec<String>,
    pub sign_off: String,
}

impl IntelligenceReport {
    /// Attach a fresh v4 identifier to a parsed payload.
    pub fn from_payload(payload: ReportPayload) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), payload)
    }

    pub fn with_id(id: impl Into<String>, payload: ReportPayload) -> Self {
        Self {
            id: id.into(),
            report_date: payload.report_date,
            time: payload.time,
            executive_summary: payload.executive_summary,
            general_outlook: payload.general_outlook,
            new_developments: payload.new_developments,
            assessment: payload.assessment,
            recommendations: payload.recommendations,
            sign_off: payload.sign_off,
        }
    }

    /// First group of the identifier, uppercased (e.g. `3F2A9C1B`).
    pub fn short_id(&self) -> String {
        self.id.split('-').next().unwrap_or(&self.id).to_uppercase()
    }

    /// Title of the lead development, if any.
    pub fn headline(&self) -> Option<&str> {
        self.new_developments.first().map(|d| d.title.as_str())
    }
}

/// Accepts `1200` as well as integral floats like `1200.0`; the model is
/// free to emit either for a NUMBER field.
fn non_negative_integer<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Number::deserialize(deserializer)?;
    if let Some(v) = value.as_u64() {
        return Ok(v);
    }
    match value.as_f64() {
        Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(D::Error::custom(format!(
            "expected a non-negative integer, found {}",
            value
        ))),
    }
}
