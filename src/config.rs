//! Configuration
//!
//! Monitoring targets (what the report is about) and generator settings
//! (which model is asked, and how).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported configuration format for {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("unknown model provider '{0}' (expected 'gemini' or 'openai')")]
    UnknownProvider(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("no API credential configured for {0}")]
    MissingCredential(&'static str),
}

// ──────────────────────────────────────────────────────────────────────────────
// MONITORING TARGETS
// ──────────────────────────────────────────────────────────────────────────────

/// Keywords, scope labels and platforms embedded into every request.
///
/// Keywords behave like an ordered set: insertion order is kept and exact
/// (case-sensitive) duplicates are rejected. Scope and platforms are fixed
/// once the configuration is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfiguration {
    keywords: Vec<String>,
    scope: Vec<String>,
    platforms: Vec<String>,
}

impl MonitoringConfiguration {
    pub fn new<K, S, P>(keywords: K, scope: S, platforms: P) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let mut config = Self {
            keywords: Vec::new(),
            scope: scope.into_iter().map(Into::into).collect(),
            platforms: platforms.into_iter().map(Into::into).collect(),
        };
        for kw in keywords {
            config.add_keyword(kw);
        }
        config
    }

    /// Load from a YAML or JSON file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
            Some("json") => serde_json::from_str(&contents)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        // Re-run insertion so a hand-edited file cannot smuggle in duplicates.
        Ok(Self::new(raw.keywords, raw.scope, raw.platforms))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    /// Append a keyword. Returns whether the list changed.
    pub fn add_keyword(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        let keyword = keyword.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k == keyword) {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    /// Remove an exact match. Returns whether the list changed.
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k != keyword);
        self.keywords.len() != before
    }
}

impl Default for MonitoringConfiguration {
    fn default() -> Self {
        Self::new(
            [
                "Nigeria Police Force",
                "NPF",
                "Inspector-General of Police",
                "IGP Kayode Egbetokun",
                "Cybercrime Nigeria",
                "NPF-NCCC",
                "Director NPF-NCCC",
                "Cybersecurity Nigeria",
                "Yahoo Boys Nigeria",
                "Police brutality Nigeria",
                "EndSARS",
                "SecureNigeria",
            ],
            [
                "National Security",
                "Public Trust in Policing",
                "Cybercrime Trends",
                "Institutional Integrity",
                "Internal Security Operations",
            ],
            ["Twitter/X", "Facebook", "Instagram", "TikTok", "WhatsApp Channels", "Telegram"],
        )
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// GENERATOR SETTINGS
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-3-pro-preview",
            ProviderKind::OpenAi => "gpt-4o-mini",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" | "openai_compatible" => Ok(ProviderKind::OpenAi),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Which model is called and with what sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub provider: ProviderKind,
    pub model: String,
    /// Injected into the client constructor; never read from a global.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Override of the provider endpoint (proxies, vLLM, tests)
    pub base_url: Option<String>,
    /// Low by default for structural consistency
    pub temperature: f32,
    /// Large enough that a full report is not cut mid-object
    pub max_output_tokens: u32,
    /// Reasoning tokens reserved on models that think before answering
    pub thinking_budget: Option<u32>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: ProviderKind::Gemini.default_model().to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.1,
            max_output_tokens: 3000,
            thinking_budget: Some(1000),
        }
    }
}

impl GeneratorSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider: ProviderKind = match get("SENTINEL_PROVIDER") {
            Some(p) => p.parse()?,
            None => ProviderKind::Gemini,
        };

        let api_key = match provider {
            ProviderKind::Gemini => get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            ProviderKind::OpenAi => get("OPENAI_API_KEY").or_else(|| get("API_KEY")),
        };

        let mut settings = Self {
            provider,
            model: get("SENTINEL_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            api_key,
            base_url: get("SENTINEL_BASE_URL"),
            ..Self::default()
        };

        if let Some(raw) = get("SENTINEL_TEMPERATURE") {
            settings.temperature = raw
                .parse()
                .ok()
                .filter(|t: &f32| (0.0..=2.0).contains(t))
                .ok_or(ConfigError::InvalidValue { key: "SENTINEL_TEMPERATURE", value: raw })?;
        }

        if let Some(raw) = get("SENTINEL_MAX_OUTPUT_TOKENS") {
            settings.max_output_tokens = raw
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or(ConfigError::InvalidValue { key: "SENTINEL_MAX_OUTPUT_TOKENS", value: raw })?;
        }

        if let Some(raw) = get("SENTINEL_THINKING_BUDGET") {
            let budget: u32 = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "SENTINEL_THINKING_BUDGET", value: raw })?;
            settings.thinking_budget = (budget > 0).then_some(budget);
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_add_duplicate_keyword_is_noop() {
        let mut config = MonitoringConfiguration::default();
        let before = config.keywords().to_vec();
        assert!(!config.add_keyword("EndSARS"));
        assert!(!config.add_keyword("  EndSARS  "));
        assert_eq!(config.keywords(), before.as_slice());
    }

    #[test]
    fn test_keyword_compare_is_case_sensitive() {
        let mut config = MonitoringConfiguration::default();
        assert!(config.add_keyword("endsars"));
        assert_eq!(config.keywords().last().map(String::as_str), Some("endsars"));
    }

    #[test]
    fn test_remove_missing_keyword_is_noop() {
        let mut config = MonitoringConfiguration::default();
        let before = config.keywords().to_vec();
        assert!(!config.remove_keyword("Not Tracked"));
        assert_eq!(config.keywords(), before.as_slice());
        assert!(config.remove_keyword("NPF"));
        assert_eq!(config.keywords().len(), before.len() - 1);
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let mut config = MonitoringConfiguration::new(Vec::<String>::new(), ["Scope"], ["X"]);
        assert!(!config.add_keyword("   "));
        assert!(config.keywords().is_empty());
    }

    #[test]
    fn test_defaults_match_seed() {
        let config = MonitoringConfiguration::default();
        assert_eq!(config.keywords().len(), 12);
        assert_eq!(config.scope().len(), 5);
        assert_eq!(config.platforms().len(), 6);
    }

    #[test]
    fn test_load_yaml_dedupes() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "keywords: [NPF, NPF, EndSARS]\nscope: [National Security]\nplatforms: [Telegram]"
        )
        .unwrap();

        let config = MonitoringConfiguration::load(file.path()).unwrap();
        assert_eq!(config.keywords(), &["NPF".to_string(), "EndSARS".to_string()]);
        assert_eq!(config.platforms(), &["Telegram".to_string()]);
    }

    #[test]
    fn test_load_json_and_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("targets.json");
        std::fs::write(&json_path, r#"{"keywords":["A"],"scope":["S"],"platforms":["P"]}"#).unwrap();
        assert_eq!(MonitoringConfiguration::load(&json_path).unwrap().keywords(), &["A".to_string()]);

        let toml_path = dir.path().join("targets.toml");
        std::fs::write(&toml_path, "keywords = []").unwrap();
        assert!(matches!(
            MonitoringConfiguration::load(&toml_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = GeneratorSettings::from_lookup(lookup(&[("API_KEY", "k")])).unwrap();
        assert_eq!(settings.provider, ProviderKind::Gemini);
        assert_eq!(settings.model, "gemini-3-pro-preview");
        assert_eq!(settings.api_key.as_deref(), Some("k"));
        assert_eq!(settings.max_output_tokens, 3000);
        assert_eq!(settings.thinking_budget, Some(1000));
        assert!((settings.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_settings_openai_overrides() {
        let settings = GeneratorSettings::from_lookup(lookup(&[
            ("SENTINEL_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SENTINEL_BASE_URL", "http://localhost:8000/v1"),
            ("SENTINEL_THINKING_BUDGET", "0"),
        ]))
        .unwrap();
        assert_eq!(settings.provider, ProviderKind::OpenAi);
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.thinking_budget, None);
    }

    #[test]
    fn test_settings_rejects_bad_values() {
        assert!(matches!(
            GeneratorSettings::from_lookup(lookup(&[("SENTINEL_PROVIDER", "bard")])),
            Err(ConfigError::UnknownProvider(_))
        ));
        assert!(matches!(
            GeneratorSettings::from_lookup(lookup(&[("SENTINEL_TEMPERATURE", "hot")])),
            Err(ConfigError::InvalidValue { key: "SENTINEL_TEMPERATURE", .. })
        ));
    }
}
