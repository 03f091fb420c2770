//! Request and response bodies for each provider API.
//!
//! Responses are decoded into [`ProviderReply`] and normalized to trimmed
//! text at this boundary; nothing above the gateway sees provider JSON.

use consilium_domain::{PromptBundle, ProviderMessage, Role};
use serde::{Deserialize, Serialize};

pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const ANTHROPIC_MAX_TOKENS: u32 = 1024;

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

// ==================== OpenAI-compatible chat ====================

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

impl<'a> ChatRequest<'a> {
    /// System prompt, then history, then the user prompt
    pub fn new(model: &'a str, prompt: &'a PromptBundle, history: &'a [ProviderMessage]) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system",
            content: &prompt.system,
        });
        messages.extend(history.iter().map(|m| ChatMessage {
            role: role_name(m.role),
            content: &m.content,
        }));
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });
        Self {
            model,
            messages,
            temperature: CHAT_TEMPERATURE,
        }
    }
}

/// Message content: plain text or a list of parts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text(String),
    Object {
        #[serde(default)]
        text: Option<String>,
    },
}

impl ChatContent {
    fn into_text(self) -> String {
        match self {
            ChatContent::Text(text) => text,
            ChatContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|p| match p {
                    ContentPart::Text(text) => Some(text),
                    ContentPart::Object { text } => text,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<ChatContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub output_text: Option<String>,
}

// ==================== Anthropic messages ====================

#[derive(Debug, Serialize)]
pub struct AnthropicRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

impl<'a> AnthropicRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a PromptBundle, history: &'a [ProviderMessage]) -> Self {
        let mut messages: Vec<ChatMessage<'a>> = history
            .iter()
            .map(|m| ChatMessage {
                role: role_name(m.role),
                content: &m.content,
            })
            .collect();
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });
        Self {
            model,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            system: &prompt.system,
            messages,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnthropicBlock {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicBlock>,
}

// ==================== Gemini generateContent ====================

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent<'a> {
    pub role: &'static str,
    pub parts: Vec<GeminiTextPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GeminiTextPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest<'a> {
    pub system_instruction: GeminiContent<'a>,
    pub contents: Vec<GeminiContent<'a>>,
}

impl<'a> GeminiRequest<'a> {
    /// History with assistant turns sent under Gemini's `model` role
    pub fn new(prompt: &'a PromptBundle, history: &'a [ProviderMessage]) -> Self {
        let mut contents: Vec<GeminiContent<'a>> = history
            .iter()
            .map(|m| GeminiContent {
                role: match m.role {
                    Role::Assistant => "model",
                    Role::User => "user",
                },
                parts: vec![GeminiTextPart { text: &m.content }],
            })
            .collect();
        contents.push(GeminiContent {
            role: "user",
            parts: vec![GeminiTextPart { text: &prompt.user }],
        });
        Self {
            system_instruction: GeminiContent {
                role: "system",
                parts: vec![GeminiTextPart { text: &prompt.system }],
            },
            contents,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

// ==================== Normalization ====================

/// A decoded provider response
#[derive(Debug)]
pub enum ProviderReply {
    /// OpenAI and OpenAI-compatible chat completions
    Chat(ChatResponse),
    Anthropic(AnthropicResponse),
    Gemini(GeminiResponse),
}

impl ProviderReply {
    /// The reply text, trimmed; empty when the response carries none
    pub fn into_text(self) -> String {
        let text = match self {
            ProviderReply::Chat(response) => {
                let choice = response.choices.into_iter().next().unwrap_or_default();
                let content = choice
                    .message
                    .and_then(|m| m.content)
                    .map(ChatContent::into_text)
                    .filter(|t| !t.is_empty())
                    .or(choice.text.filter(|t| !t.is_empty()));
                content.or(response.output_text).unwrap_or_default()
            }
            ProviderReply::Anthropic(response) => response
                .content
                .into_iter()
                .next()
                .and_then(|b| b.text)
                .unwrap_or_default(),
            ProviderReply::Gemini(response) => {
                let parts = response
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|c| c.content)
                    .map(|c| c.parts)
                    .unwrap_or_default();
                let first = parts
                    .first()
                    .and_then(|p| p.text.as_deref())
                    .map(str::trim)
                    .filter(|t| !t.is_empty());
                match first {
                    Some(text) => text.to_string(),
                    None => parts
                        .into_iter()
                        .filter_map(|p| p.text)
                        .collect::<Vec<_>>()
                        .join("\n"),
                }
            }
        };
        text.trim().to_string()
    }
}

// ==================== Model listing ====================

#[derive(Debug, Default, Deserialize)]
pub struct RawModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelListResponse {
    #[serde(default)]
    pub data: Vec<RawModel>,
    #[serde(default)]
    pub models: Vec<RawModel>,
}

impl ModelListResponse {
    /// Entries from `data`, or from `models` when `data` is absent
    pub fn into_entries(self) -> Vec<RawModel> {
        if self.data.is_empty() { self.models } else { self.data }
    }
}

// ==================== Embeddings ====================

#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub encoding_format: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmbeddingItem {
    #[serde(default)]
    pub embedding: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingItem>,
    #[serde(default)]
    pub embedding: Option<serde_json::Value>,
}

impl EmbeddingResponse {
    /// `data[0].embedding`, else `embedding`; entries that are not numbers count as 0
    pub fn into_vector(self) -> Vec<f32> {
        let raw = self
            .data
            .into_iter()
            .next()
            .and_then(|item| item.embedding)
            .or(self.embedding);
        match raw {
            Some(serde_json::Value::Array(values)) => values.iter().map(coerce_number).collect(),
            _ => Vec::new(),
        }
    }
}

fn coerce_number(value: &serde_json::Value) -> f32 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0) as f32,
        serde_json::Value::String(s) => s.trim().parse::<f32>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
        serde_json::Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}
