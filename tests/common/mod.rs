#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use sentinel_intel::prompt::GenerationRequest;
use sentinel_intel::provider::{ModelReply, ProviderError, StructuredModelClient};
use sentinel_intel::{GeneratorSettings, StructuredReportGenerator};

pub enum Scripted {
    Reply(ModelReply),
    Status(u16, &'static str),
}

/// Replays queued replies in order and records every prompt it saw.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Scripted>>,
    pub prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Scripted>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Scripted::Reply(ModelReply::text(*t))).collect())
    }
}

#[async_trait]
impl StructuredModelClient for ScriptedClient {
    async fn generate_structured(&self, request: &GenerationRequest) -> Result<ModelReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(request.prompt.clone());
        match self.replies.lock().await.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Status(status, body)) => Err(ProviderError::Status {
                provider: "scripted",
                status,
                body: body.to_string(),
            }),
            None => Ok(ModelReply::empty(Some("exhausted".to_string()))),
        }
    }
}

/// Holds every call until `release` is notified, then answers with `text`.
pub struct GatedClient {
    pub release: Notify,
    pub entered: Notify,
    text: String,
}

impl GatedClient {
    pub fn new(text: impl Into<String>) -> Self {
        Self { release: Notify::new(), entered: Notify::new(), text: text.into() }
    }
}

#[async_trait]
impl StructuredModelClient for GatedClient {
    async fn generate_structured(&self, _request: &GenerationRequest) -> Result<ModelReply, ProviderError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(ModelReply::text(self.text.clone()))
    }
}

pub fn generator(client: Arc<dyn StructuredModelClient>) -> Arc<StructuredReportGenerator> {
    Arc::new(StructuredReportGenerator::new(client, GeneratorSettings::default()))
}

pub fn sample_payload() -> Value {
    json!({
        "report_date": "2026-10-17T13:00:00Z",
        "time": "14:00 WAT",
        "executive_summary": [
            "Discussion of a viral checkpoint video dominated the afternoon.",
            "NPF-NCCC arrest announcements drew supportive engagement."
        ],
        "general_outlook": "Public sentiment is cautious with pockets of strong criticism.",
        "new_developments": [
            {
                "title": "Checkpoint video spreads",
                "description": "A clip alleging extortion at a checkpoint is trending.",
                "sentiment": { "positive": 34, "neutral": 45, "negative": 21 },
                "matched_keywords": ["Police brutality Nigeria"],
                "platforms": ["Twitter/X", "TikTok"],
                "engagement": { "volume": 51000, "trend_score": 9.1 }
            },
            {
                "title": "Romance scam ring arrested",
                "description": "NPF-NCCC reported arrests linked to a cross-border scam.",
                "sentiment": { "positive": 58, "neutral": 32, "negative": 10 },
                "matched_keywords": ["NPF-NCCC", "Yahoo Boys Nigeria"],
                "platforms": ["Facebook", "Instagram"],
                "engagement": { "volume": 17500, "trend_score": 6.4 }
            }
        ],
        "assessment": [
            "1. The checkpoint clip may revive EndSARS mobilisation.",
            "2. Cybercrime enforcement stories improve trust metrics.",
            "3. Short-form video drives most negative engagement."
        ],
        "recommendations": [
            "Publish a factual response on the checkpoint clip.",
            "Boost the scam-ring story on Facebook and Instagram."
        ],
        "sign_off": "Submitted for your information and further directives, please."
    })
}
