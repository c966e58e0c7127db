//! Loading service configuration (prompts + generation settings) from TOML.
//!
//! See `AppConfig`, `Prompts` and `GenerationSettings` for the expected schema.
//! Every key is optional; anything omitted keeps its default.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub generation: GenerationSettings,
}

/// Prompts used for quiz generation. `quiz_user_template` accepts the
/// placeholders `{count}`, `{resources}` and `{cognitive_level}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub quiz_system: String,
  pub quiz_user_template: String,
  pub standard_level: String,
  pub hots_level: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are an expert educator creating high-quality multiple choice quiz questions based on study resources. Respond ONLY with JSON matching the provided schema.".into(),
      quiz_user_template: "Create {count} multiple choice questions based on the following study resources:

{resources}

Requirements:
- Each question must have exactly 4 options
- Only one correct answer per question
- Include detailed explanations for correct answers
- {cognitive_level}
- Make questions directly relevant to the resource content
- Ensure questions test understanding, not just memorization
- Vary question difficulty and types
- Use clear, unambiguous language

Focus Areas:
- Key concepts and principles from the resources
- Practical applications of the material
- Relationships between different concepts
- Critical thinking about the subject matter".into(),
      standard_level: "Focus on comprehension and application: understanding key concepts, remembering important facts, and applying knowledge to familiar situations.".into(),
      hots_level: "Focus on Higher Order Thinking Skills (HOTS): analysis, synthesis, evaluation, and critical thinking. Questions should require students to analyze relationships, evaluate arguments, synthesize information, and apply concepts to new situations.".into(),
    }
  }
}

/// Which question generator to run.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMode {
  /// OpenAI when OPENAI_API_KEY is set, template questions otherwise.
  #[default]
  Auto,
  Openai,
  Template,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
  pub mode: GeneratorMode,
  pub temperature: f32,
  pub max_questions: u32,
}

impl Default for GenerationSettings {
  fn default() -> Self {
    Self { mode: GeneratorMode::Auto, temperature: 0.5, max_questions: 50 }
  }
}

/// Parse a TOML document into `AppConfig`.
pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from STACKS_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("STACKS_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "stacks_backend", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "stacks_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "stacks_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
