//! Agency summary generation
//!
//! Thin pass-through to an OpenAI-compatible chat completion endpoint.
//! The provider sits behind the `Summarizer` trait so handlers can be
//! exercised with a mock. Prompt construction is deterministic: the same
//! agency row always produces the same prompt text.

use crate::cfr::EnrichedCfrReference;
use crate::config::OpenAiConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// System message sent with every summary request
pub const SYSTEM_PROMPT: &str = "You are an expert on U.S. government agencies and federal \
regulations. Provide accurate, concise information about regulatory agencies.";

/// Trait for chat completion providers
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Submit a prompt and return the provider's text verbatim
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Build the deterministic summary prompt for an agency.
///
/// At most [`crate::MAX_PROMPT_CFR_REFS`] references are included to keep
/// the prompt inside provider token limits.
pub fn build_agency_prompt(
    name: &str,
    display_name: Option<&str>,
    refs: &[EnrichedCfrReference],
) -> String {
    let mut cfr_context = Vec::new();
    for reference in refs.iter().take(crate::MAX_PROMPT_CFR_REFS) {
        let title = reference
            .reference
            .title_number()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let title_name = reference.title_name.as_deref().unwrap_or("Unknown Title");

        let mut line = format!("Title {}: {}", title, title_name);
        if let Some(chapter) = reference.reference.chapter.as_deref() {
            line.push_str(&format!(", Chapter {}", chapter));
        }
        cfr_context.push(line);
    }

    let cfr_block = if cfr_context.is_empty() {
        "No CFR references available".to_string()
    } else {
        cfr_context.join("\n")
    };

    format!(
        "Generate a comprehensive summary for the U.S. government agency: {name}\n\
         \n\
         Display Name: {display}\n\
         \n\
         CFR References:\n\
         {cfr_block}\n\
         \n\
         Please provide:\n\
         1. A concise 2-3 sentence summary of the agency's role and mission\n\
         2. A list of 3-5 key responsibilities\n\
         3. A brief description of the agency's regulatory scope\n\
         \n\
         Format the response as JSON with keys: summary, key_responsibilities (array), \
         regulatory_scope",
        name = name,
        display = display_name.unwrap_or("N/A"),
        cfr_block = cfr_block,
    )
}

/// Parsed summary content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgencySummary {
    pub summary: String,

    #[serde(default)]
    pub key_responsibilities: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulatory_scope: Option<String>,
}

/// Interpret provider output.
///
/// The prompt asks for structured JSON; when the model complies the fields
/// are split out, otherwise the raw text becomes the summary unmodified.
pub fn parse_summary_content(content: &str) -> AgencySummary {
    match serde_json::from_str::<AgencySummary>(content.trim()) {
        Ok(parsed) if !parsed.summary.is_empty() => parsed,
        _ => AgencySummary {
            summary: content.to_string(),
            key_responsibilities: Vec::new(),
            regulatory_scope: None,
        },
    }
}

/// OpenAI chat completion client
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiSummarizer {
    /// Create a new summarizer from configuration.
    ///
    /// Fails fast when no API key is configured so a misconfigured
    /// deployment is caught at startup, not on the first request.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "openai.api_key is not set (OPENAI_API_KEY)".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::SummaryProviderTimeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    AppError::SummaryProvider {
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SummaryProvider {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::SummaryProvider {
                    message: format!("Failed to parse response: {}", e),
                })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::SummaryProvider {
                message: "Empty response".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock summarizer for testing
pub struct MockSummarizer {
    response: String,
    calls: AtomicUsize,
}

impl MockSummarizer {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completion calls made against this mock
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::{decode_references, enrich_references};
    use serde_json::json;
    use std::collections::HashMap;

    fn enriched(raw: serde_json::Value) -> Vec<EnrichedCfrReference> {
        enrich_references(decode_references(Some(&raw)), &HashMap::new())
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let refs = enriched(json!([{"title": 40, "chapter": "I"}]));
        let a = build_agency_prompt("Environmental Protection Agency", Some("EPA"), &refs);
        let b = build_agency_prompt("Environmental Protection Agency", Some("EPA"), &refs);
        assert_eq!(a, b);
        assert!(a.contains("Environmental Protection Agency"));
        assert!(a.contains("Title 40"));
        assert!(a.contains("Chapter I"));
    }

    #[test]
    fn test_prompt_without_references() {
        let prompt = build_agency_prompt("Test Agency", None, &[]);
        assert!(prompt.contains("No CFR references available"));
        assert!(prompt.contains("Display Name: N/A"));
    }

    #[test]
    fn test_prompt_caps_reference_count() {
        let items: Vec<_> = (1..=20).map(|n| json!({"title": n})).collect();
        let refs = enriched(serde_json::Value::Array(items));
        let prompt = build_agency_prompt("Test Agency", None, &refs);
        assert!(prompt.contains("Title 10:"));
        assert!(!prompt.contains("Title 11:"));
    }

    #[test]
    fn test_parse_structured_content() {
        let content = r#"{"summary": "Oversees air and water quality.",
            "key_responsibilities": ["Enforcement", "Permitting"],
            "regulatory_scope": "Environmental regulation"}"#;
        let parsed = parse_summary_content(content);
        assert_eq!(parsed.summary, "Oversees air and water quality.");
        assert_eq!(parsed.key_responsibilities.len(), 2);
        assert_eq!(
            parsed.regulatory_scope.as_deref(),
            Some("Environmental regulation")
        );
    }

    #[test]
    fn test_parse_falls_back_to_verbatim_text() {
        let content = "The agency regulates interstate commerce.";
        let parsed = parse_summary_content(content);
        assert_eq!(parsed.summary, content);
        assert!(parsed.key_responsibilities.is_empty());
        assert!(parsed.regulatory_scope.is_none());
    }

    #[tokio::test]
    async fn test_mock_summarizer_counts_calls() {
        let mock = MockSummarizer::new("canned");
        assert_eq!(mock.call_count(), 0);
        let out = mock.complete(SYSTEM_PROMPT, "prompt").await.unwrap();
        assert_eq!(out, "canned");
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_missing_api_key_is_a_configuration_error() {
        let config = OpenAiConfig::default();
        let err = OpenAiSummarizer::new(&config).err().unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
