//! Response Schema
//!
//! A small typed descriptor for the JSON shape the model must emit. The same
//! descriptor is rendered into the request (so the provider constrains the
//! output) and used afterwards to check the body that actually came back.

use serde_json::{json, Map, Value};
use std::fmt;

use crate::report::{IntelligenceReport, DEVELOPMENTS_PER_REPORT};

/// Node of a structured-output schema. Every object property is required.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Number { minimum: Option<f64> },
    Integer { minimum: Option<i64> },
    Array {
        items: Box<SchemaNode>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object { properties: Vec<(String, SchemaNode)> },
}

/// Provider flavour of the rendered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    /// Gemini `responseSchema` (OpenAPI subset, uppercase type names)
    Gemini,
    /// Standard JSON Schema as used by OpenAI-style `response_format`
    JsonSchema,
}

/// First place a value departs from the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl SchemaNode {
    pub fn number() -> Self {
        SchemaNode::Number { minimum: None }
    }

    pub fn non_negative_number() -> Self {
        SchemaNode::Number { minimum: Some(0.0) }
    }

    pub fn non_negative_integer() -> Self {
        SchemaNode::Integer { minimum: Some(0) }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array { items: Box::new(items), min_items: None, max_items: None }
    }

    pub fn exact_array(items: SchemaNode, len: usize) -> Self {
        SchemaNode::Array { items: Box::new(items), min_items: Some(len), max_items: Some(len) }
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        SchemaNode::Object {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Render for the given provider.
    pub fn render(&self, dialect: SchemaDialect) -> Value {
        let type_name = |gemini: &str, standard: &str| match dialect {
            SchemaDialect::Gemini => gemini.to_string(),
            SchemaDialect::JsonSchema => standard.to_string(),
        };

        match self {
            SchemaNode::String => json!({ "type": type_name("STRING", "string") }),
            SchemaNode::Number { minimum } => {
                let mut node = json!({ "type": type_name("NUMBER", "number") });
                if let Some(min) = minimum {
                    node["minimum"] = json!(min);
                }
                node
            }
            SchemaNode::Integer { minimum } => {
                let mut node = json!({ "type": type_name("INTEGER", "integer") });
                if let Some(min) = minimum {
                    node["minimum"] = json!(min);
                }
                node
            }
            SchemaNode::Array { items, min_items, max_items } => {
                let mut node = json!({
                    "type": type_name("ARRAY", "array"),
                    "items": items.render(dialect),
                });
                if let Some(min) = min_items {
                    node["minItems"] = json!(min);
                }
                if let Some(max) = max_items {
                    node["maxItems"] = json!(max);
                }
                node
            }
            SchemaNode::Object { properties } => {
                let mut props = Map::new();
                for (name, child) in properties {
                    props.insert(name.clone(), child.render(dialect));
                }
                let names: Vec<&str> = properties.iter().map(|(n, _)| n.as_str()).collect();
                let mut node = json!({
                    "type": type_name("OBJECT", "object"),
                    "properties": props,
                    "required": names,
                });
                match dialect {
                    SchemaDialect::Gemini => node["propertyOrdering"] = json!(names),
                    SchemaDialect::JsonSchema => node["additionalProperties"] = json!(false),
                }
                node
            }
        }
    }

    /// Structural check of `value` against this node.
    ///
    /// Extra object properties are tolerated; missing ones, wrong types and
    /// out-of-bounds arrays or numbers are not.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        let violation = |message: String| SchemaViolation { path: path.to_string(), message };

        match self {
            SchemaNode::String => {
                if !value.is_string() {
                    return Err(violation(format!("expected string, found {}", kind_of(value))));
                }
            }
            SchemaNode::Number { minimum } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| violation(format!("expected number, found {}", kind_of(value))))?;
                if let Some(min) = minimum {
                    if n < *min {
                        return Err(violation(format!("{} is below the minimum of {}", n, min)));
                    }
                }
            }
            SchemaNode::Integer { minimum } => {
                let n = integral_value(value)
                    .ok_or_else(|| violation(format!("expected integer, found {}", describe(value))))?;
                if let Some(min) = minimum {
                    if n < *min as f64 {
                        return Err(violation(format!("{} is below the minimum of {}", n, min)));
                    }
                }
            }
            SchemaNode::Array { items, min_items, max_items } => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| violation(format!("expected array, found {}", kind_of(value))))?;
                if let Some(min) = min_items {
                    if arr.len() < *min {
                        return Err(violation(format!("expected at least {} items, found {}", min, arr.len())));
                    }
                }
                if let Some(max) = max_items {
                    if arr.len() > *max {
                        return Err(violation(format!("expected at most {} items, found {}", max, arr.len())));
                    }
                }
                for (idx, item) in arr.iter().enumerate() {
                    items.validate_at(item, &format!("{}[{}]", path, idx))?;
                }
            }
            SchemaNode::Object { properties } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| violation(format!("expected object, found {}", kind_of(value))))?;
                for (name, child) in properties {
                    let child_path = format!("{}.{}", path, name);
                    match obj.get(name) {
                        Some(v) => child.validate_at(v, &child_path)?,
                        None => {
                            return Err(SchemaViolation {
                                path: child_path,
                                message: "missing required field".to_string(),
                            })
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn integral_value(value: &Value) -> Option<f64> {
    if let Some(i) = value.as_i64() {
        return Some(i as f64);
    }
    if let Some(u) = value.as_u64() {
        return Some(u as f64);
    }
    value.as_f64().filter(|f| f.fract() == 0.0)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => kind_of(other).to_string(),
    }
}

/// Shape of the report body requested from the model.
pub fn report_schema() -> SchemaNode {
    let sentiment = SchemaNode::object([
        ("positive", SchemaNode::non_negative_number()),
        ("neutral", SchemaNode::non_negative_number()),
        ("negative", SchemaNode::non_negative_number()),
    ]);

    let engagement = SchemaNode::object([
        ("volume", SchemaNode::non_negative_integer()),
        ("trend_score", SchemaNode::number()),
    ]);

    let development = SchemaNode::object([
        ("title", SchemaNode::String),
        ("description", SchemaNode::String),
        ("sentiment", sentiment),
        ("matched_keywords", SchemaNode::array(SchemaNode::String)),
        ("platforms", SchemaNode::array(SchemaNode::String)),
        ("engagement", engagement),
    ]);

    SchemaNode::object([
        ("report_date", SchemaNode::String),
        ("time", SchemaNode::String),
        ("executive_summary", SchemaNode::array(SchemaNode::String)),
        ("general_outlook", SchemaNode::String),
        ("new_developments", SchemaNode::exact_array(development, DEVELOPMENTS_PER_REPORT)),
        ("assessment", SchemaNode::array(SchemaNode::String)),
        ("recommendations", SchemaNode::array(SchemaNode::String)),
        ("sign_off", SchemaNode::String),
    ])
}

/// JSON Schema of the stored record (identifier included), for export.
pub fn report_json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(IntelligenceReport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_payload;

    #[test]
    fn test_sample_payload_conforms() {
        assert_eq!(report_schema().validate(&sample_payload()), Ok(()));
    }

    #[test]
    fn test_missing_field_reports_path() {
        let mut raw = sample_payload();
        raw["new_developments"][1]["engagement"]
            .as_object_mut()
            .unwrap()
            .remove("trend_score");
        let err = report_schema().validate(&raw).unwrap_err();
        assert_eq!(err.path, "$.new_developments[1].engagement.trend_score");
        assert_eq!(err.message, "missing required field");
    }

    #[test]
    fn test_development_count_enforced() {
        let mut raw = sample_payload();
        let extra = raw["new_developments"][0].clone();
        raw["new_developments"].as_array_mut().unwrap().push(extra);
        let err = report_schema().validate(&raw).unwrap_err();
        assert_eq!(err.path, "$.new_developments");
        assert!(err.message.contains("at most 2"));
    }

    #[test]
    fn test_wrong_type_and_negative_values() {
        let mut raw = sample_payload();
        raw["time"] = json!(1030);
        assert_eq!(report_schema().validate(&raw).unwrap_err().path, "$.time");

        let mut raw = sample_payload();
        raw["new_developments"][0]["sentiment"]["neutral"] = json!(-3);
        let err = report_schema().validate(&raw).unwrap_err();
        assert_eq!(err.path, "$.new_developments[0].sentiment.neutral");

        let mut raw = sample_payload();
        raw["new_developments"][0]["engagement"]["volume"] = json!(12.5);
        let err = report_schema().validate(&raw).unwrap_err();
        assert!(err.message.contains("expected integer"));
    }

    #[test]
    fn test_extra_properties_tolerated() {
        let mut raw = sample_payload();
        raw["classification"] = json!("RESTRICTED");
        assert!(report_schema().validate(&raw).is_ok());
    }

    #[test]
    fn test_gemini_rendering() {
        let rendered = report_schema().render(SchemaDialect::Gemini);
        assert_eq!(rendered["type"], "OBJECT");
        assert_eq!(rendered["required"].as_array().unwrap().len(), 8);
        let devs = &rendered["properties"]["new_developments"];
        assert_eq!(devs["type"], "ARRAY");
        assert_eq!(devs["minItems"], 2);
        assert_eq!(devs["maxItems"], 2);
        assert_eq!(devs["items"]["properties"]["engagement"]["properties"]["volume"]["type"], "INTEGER");
        assert_eq!(rendered["propertyOrdering"][0], "report_date");
    }

    #[test]
    fn test_json_schema_rendering_is_strict() {
        let rendered = report_schema().render(SchemaDialect::JsonSchema);
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["additionalProperties"], false);
        assert_eq!(
            rendered["properties"]["new_developments"]["items"]["properties"]["sentiment"]["additionalProperties"],
            false
        );
        assert!(rendered.get("propertyOrdering").is_none());
    }

    #[test]
    fn test_export_schema_includes_id() {
        let schema = serde_json::to_value(report_json_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|r| r == "id"));
    }
}
