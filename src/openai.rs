//! Minimal OpenAI client for quiz generation.
//!
//! We only call chat.completions with a strict `json_schema` response format.
//! Calls are instrumented and log model names, latencies, and token usage (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short to avoid PII leaks.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::generator::{question_set_schema, GeneratedQuestion, GeneratedSet, GenerationError, QuestionGenerator};
use crate::prompt::QuizPrompt;
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(temperature: f32) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model =
      std::env::var("OPENAI_QUIZ_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .unwrap_or(60);

    match Self::new(api_key, base_url, model, temperature, Duration::from_secs(timeout_secs)) {
      Ok(oa) => Some(oa),
      Err(e) => {
        error!(target: "stacks_backend", error = %e, "Failed to build HTTP client for OpenAI");
        None
      }
    }
  }

  pub fn new(
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
  ) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string(), model, temperature })
  }

  /// Structured chat completion: the reply must match `schema`. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user, schema), fields(model = %self.model))]
  async fn chat_structured<T: for<'a> Deserialize<'a>>(
    &self,
    schema_name: &str,
    schema: Value,
    system: &str,
    user: &str,
  ) -> Result<T, GenerationError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature: self.temperature,
      response_format: Some(ResponseFormat {
        r#type: "json_schema".into(),
        json_schema: Some(JsonSchemaFormat { name: schema_name.into(), schema, strict: true }),
      }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "stacks-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| GenerationError::Upstream(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(GenerationError::Upstream(format!("OpenAI HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res.json().await
      .map_err(|e| GenerationError::Malformed(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let choice = body.choices.into_iter().next()
      .ok_or_else(|| GenerationError::Malformed("no choices in response".into()))?;
    if let Some(refusal) = choice.message.refusal {
      return Err(GenerationError::Upstream(format!("model refused: {}", trunc_for_log(&refusal, 200))));
    }
    let text = choice.message.content.unwrap_or_default();

    serde_json::from_str::<T>(&text).map_err(|e| GenerationError::Malformed(format!("JSON parse error: {}", e)))
  }
}

#[async_trait]
impl QuestionGenerator for OpenAI {
  fn name(&self) -> &'static str { "openai" }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, requested = prompt.requested, use_hots = prompt.use_hots))]
  async fn generate(&self, prompt: &QuizPrompt) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let start = Instant::now();
    let result = self
      .chat_structured::<GeneratedSet>("quiz_questions", question_set_schema(), &prompt.system, &prompt.user)
      .await;
    let elapsed = start.elapsed();

    match result {
      Ok(set) => {
        info!(?elapsed, returned = set.questions.len(), "Model response received successfully");
        Ok(set.questions)
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during quiz generation");
        Err(e)
      }
    }
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")] r#type: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  json_schema: Option<JsonSchemaFormat>,
}
#[derive(Serialize)]
struct JsonSchemaFormat { name: String, schema: Value, strict: bool }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
  #[serde(default)] refusal: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
