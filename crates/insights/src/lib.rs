use crate::error::InsightsError;
use async_trait::async_trait;
use configuration::InsightsConfig;
use core_types::Trade;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod prompt;

// --- Public API ---
pub use prompt::{build_prompt, build_trade_data, parse_patterns, TradePattern};

/// Something that can look at a trade history and name its recurring patterns.
#[async_trait]
pub trait PatternAnalyzer: Send + Sync {
    async fn analyze_trades(&self, trades: &[Trade]) -> Result<Vec<TradePattern>, InsightsError>;
}

// --- Wire format of the generateContent endpoint ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// The concatenated text of the first candidate.
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// A `PatternAnalyzer` backed by the Gemini `generateContent` REST API.
#[derive(Clone)]
pub struct GeminiAnalyzer {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    /// Creates a new `GeminiAnalyzer`.
    ///
    /// Returns `None` if no API key is configured, so the insights route can
    /// report itself as unavailable instead of failing every call.
    pub fn new(config: &InsightsConfig) -> Option<Self> {
        if config.api_key.is_empty() {
            tracing::warn!("Insights service is not configured (missing api_key); pattern analysis is disabled.");
            return None;
        }
        Some(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl PatternAnalyzer for GeminiAnalyzer {
    async fn analyze_trades(&self, trades: &[Trade]) -> Result<Vec<TradePattern>, InsightsError> {
        let trade_data = build_trade_data(trades)?;
        let prompt = build_prompt(&trade_data);
        let payload = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(model = %self.model, trades = trades.len(), "Requesting trade pattern analysis.");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(InsightsError::ApiError(error_text));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .first_text()
            .ok_or_else(|| InsightsError::EmptyResponse("no candidate text".to_string()))?;

        let patterns = parse_patterns(&text)?;
        tracing::info!(patterns = patterns.len(), "Trade pattern analysis complete.");
        Ok(patterns)
    }
}
