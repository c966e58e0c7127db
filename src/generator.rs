//! Question generation capability: `generate(prompt) -> questions | error`.
//!
//! Backends:
//!   - `OpenAI` (see `openai.rs`): structured-output chat completion
//!   - `TemplateGenerator`: deterministic offline questions built from resource titles
//!   - `Unconfigured`: always unavailable (OpenAI mode forced without a key)
//!
//! Backends return loosely-typed `GeneratedQuestion`s; the quiz engine validates
//! them before anything is persisted.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::Difficulty;
use crate::prompt::QuizPrompt;

#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("generation service unavailable: {0}")]
  Unavailable(String),
  #[error("upstream error: {0}")]
  Upstream(String),
  #[error("malformed result: {0}")]
  Malformed(String),
  #[error("generation returned no questions")]
  Empty,
}

/// A question as produced by a backend, before validation.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
  pub question: String,
  #[serde(default)]
  pub options: Vec<String>,
  pub correct_answer: i64,
  #[serde(default)]
  pub explanation: Option<String>,
  #[serde(default)]
  pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedSet {
  pub questions: Vec<GeneratedQuestion>,
}

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
  /// Short backend name for logs.
  fn name(&self) -> &'static str;

  async fn generate(&self, prompt: &QuizPrompt) -> Result<Vec<GeneratedQuestion>, GenerationError>;
}

/// JSON schema of a question set, in the shape OpenAI structured outputs accept.
pub fn question_set_schema() -> Value {
  json!({
    "type": "object",
    "properties": {
      "questions": {
        "type": "array",
        "description": "Array of quiz questions",
        "items": {
          "type": "object",
          "properties": {
            "question": { "type": "string", "description": "The quiz question text" },
            "options": {
              "type": "array",
              "items": { "type": "string" },
              "description": "Exactly four multiple choice options"
            },
            "correctAnswer": {
              "type": "integer",
              "enum": [0, 1, 2, 3],
              "description": "Index of the correct answer (0-3)"
            },
            "explanation": { "type": "string", "description": "Detailed explanation of the correct answer" },
            "difficulty": {
              "type": "string",
              "enum": ["easy", "medium", "hard"],
              "description": "Question difficulty level"
            }
          },
          "required": ["question", "options", "correctAnswer", "explanation", "difficulty"],
          "additionalProperties": false
        }
      }
    },
    "required": ["questions"],
    "additionalProperties": false
  })
}

const QUESTION_STEMS: [&str; 6] = [
  "What is the main concept explained in",
  "Which of the following best describes",
  "According to the content in",
  "What would be the most appropriate application of",
  "How does the information in",
  "What can be inferred from",
];

/// Offline generator: cycles stems over the source resources. Option 0 is always correct.
pub struct TemplateGenerator;

#[async_trait]
impl QuestionGenerator for TemplateGenerator {
  fn name(&self) -> &'static str { "template" }

  async fn generate(&self, prompt: &QuizPrompt) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    if prompt.resources.is_empty() {
      return Err(GenerationError::Empty);
    }
    let difficulty = if prompt.use_hots { Difficulty::Hard } else { Difficulty::Medium };
    let out = (0..prompt.requested as usize)
      .map(|i| {
        let title = &prompt.resources[i % prompt.resources.len()].title;
        let stem = QUESTION_STEMS[i % QUESTION_STEMS.len()];
        GeneratedQuestion {
          question: format!("{} \"{}\"?", stem, title),
          options: vec![
            format!("Primary concept related to {}", title),
            format!("Secondary aspect of {}", title),
            format!("Alternative interpretation of {}", title),
            format!("Unrelated concept to {}", title),
          ],
          correct_answer: 0,
          explanation: Some(format!(
            "This question tests your understanding of the key concepts presented in {}. The correct answer focuses on the primary learning objective of this resource.",
            title
          )),
          difficulty: Some(difficulty),
        }
      })
      .collect();
    Ok(out)
  }
}

/// Stand-in when OpenAI is required but not configured; every call fails.
pub struct Unconfigured;

#[async_trait]
impl QuestionGenerator for Unconfigured {
  fn name(&self) -> &'static str { "unconfigured" }

  async fn generate(&self, _prompt: &QuizPrompt) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    Err(GenerationError::Unavailable("OpenAI API key is not configured".into()))
  }
}
