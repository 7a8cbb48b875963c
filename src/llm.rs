use crate::errors::ClientError;
use crate::extract::{extract_json, parse_object};
use crate::models::{CheckInSummary, Plan, Profile, RawObject};
use crate::normalize::normalize_plan;
use crate::prompts::{SYSTEM_PROMPT, adjustment_prompt, plan_prompt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Diagnostics kept for display are cut to this many characters.
pub const DIAGNOSTIC_LIMIT: usize = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// Chat completion with `response_format: json_object`.
    ChatJsonObject,
    /// Plain responses call without an output format constraint.
    Responses,
}

/// Call shapes in the order they are attempted.
pub const CALL_SHAPES: [CallShape; 2] = [CallShape::ChatJsonObject, CallShape::Responses];

impl CallShape {
    fn parse(self, text: &str) -> Option<RawObject> {
        let object = match self {
            Self::ChatJsonObject => extract_json(text).or_else(|| parse_object(text)),
            Self::Responses => extract_json(text),
        };
        object.filter(|map| !map.is_empty())
    }
}

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Sends one system + user exchange and returns the raw text output.
    async fn complete(
        &self,
        shape: CallShape,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, ClientError>;
}

/// Outcome of a structured generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation<T> {
    Ready { value: T, raw: String },
    Absent { diagnostic: String },
}

impl<T> Generation<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Generation<U> {
        match self {
            Self::Ready { value, raw } => Generation::Ready {
                value: f(value),
                raw,
            },
            Self::Absent { diagnostic } => Generation::Absent { diagnostic },
        }
    }
}

/// Tries each call shape in turn until one yields a non-empty object. When
/// none does, the last output or error is returned as the diagnostic.
pub async fn generate_object(
    backend: &dyn GenerativeBackend,
    model: &str,
    system: &str,
    user: &str,
) -> Generation<RawObject> {
    let mut diagnostic = String::new();

    for shape in CALL_SHAPES {
        debug!(?shape, model, "calling generative endpoint");
        match backend.complete(shape, model, system, user).await {
            Ok(text) => {
                let text = text.trim();
                if let Some(value) = shape.parse(text) {
                    info!(?shape, "generative endpoint returned an object");
                    return Generation::Ready {
                        value,
                        raw: text.to_string(),
                    };
                }
                warn!(?shape, "generative output did not contain a usable object");
                diagnostic = text.to_string();
            }
            Err(err) => {
                warn!(?shape, "generative call failed: {err}");
                diagnostic = format!("ERROR: {err}");
            }
        }
    }

    Generation::Absent {
        diagnostic: truncate(&diagnostic, DIAGNOSTIC_LIMIT),
    }
}

pub async fn generate_plan(
    backend: &dyn GenerativeBackend,
    model: &str,
    profile: &Profile,
) -> Generation<Plan> {
    generate_object(backend, model, SYSTEM_PROMPT, &plan_prompt(profile))
        .await
        .map(|object| normalize_plan(&Value::Object(object)))
}

pub async fn adjust_plan(
    backend: &dyn GenerativeBackend,
    model: &str,
    current: &Plan,
    summary: &CheckInSummary,
    note: &str,
) -> Generation<Plan> {
    let prompt = adjustment_prompt(current, summary, note);
    generate_object(backend, model, SYSTEM_PROMPT, &prompt)
        .await
        .map(|object| normalize_plan(&Value::Object(object)))
}

pub fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: [Message<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    fn into_text(self) -> String {
        if let Some(text) = self.output_text.filter(|text| !text.trim().is_empty()) {
            return text;
        }
        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .filter(|content| content.kind == "output_text")
            .filter_map(|content| content.text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response, ClientError> {
        let response = self
            .http
            .post(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiBackend {
    async fn complete(
        &self,
        shape: CallShape,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, ClientError> {
        let messages = [
            Message {
                role: "system",
                content: system,
            },
            Message {
                role: "user",
                content: user,
            },
        ];

        let text = match shape {
            CallShape::ChatJsonObject => {
                let body = ChatRequest {
                    model,
                    messages,
                    response_format: ResponseFormat {
                        kind: "json_object",
                    },
                };
                let parsed: ChatResponse = self
                    .post("chat/completions", &body)
                    .await?
                    .json()
                    .await
                    .map_err(ClientError::decode)?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .unwrap_or_default()
            }
            CallShape::Responses => {
                let body = ResponsesRequest {
                    model,
                    input: messages,
                };
                let parsed: ResponsesResponse = self
                    .post("responses", &body)
                    .await?
                    .json()
                    .await
                    .map_err(ClientError::decode)?;
                parsed.into_text()
            }
        };

        if text.trim().is_empty() {
            return Err(ClientError::EmptyOutput);
        }
        Ok(text)
    }
}
