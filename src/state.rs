//! Application state: record store, prompts, generation settings and the
//! question generator.
//!
//! `AppState` is cheap to clone (everything heavy sits behind `Arc`), so the
//! background generation task can own its own copy.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::{load_config_from_env, AppConfig, GenerationSettings, GeneratorMode, Prompts};
use crate::generator::{QuestionGenerator, TemplateGenerator, Unconfigured};
use crate::openai::OpenAI;
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub generator: Arc<dyn QuestionGenerator>,
    pub prompts: Prompts,
    pub generation: GenerationSettings,
}

impl AppState {
    pub fn new(store: Store, generator: Arc<dyn QuestionGenerator>, config: AppConfig) -> Self {
        Self {
            store: Arc::new(store),
            generator,
            prompts: config.prompts,
            generation: config.generation,
        }
    }

    /// Build state from env: load config, open the store, pick a generator.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Result<Self, StoreError> {
        let config = load_config_from_env().unwrap_or_default();

        let store = match std::env::var("STACKS_DATA_PATH") {
            Ok(path) if !path.trim().is_empty() => Store::open(path).await?,
            _ => {
                warn!(target: "stacks_backend", "STACKS_DATA_PATH not set; records live in memory only");
                Store::in_memory()
            }
        };

        let generator = select_generator(&config.generation);
        Ok(Self::new(store, generator, config))
    }
}

/// Generator policy:
/// - `template` mode always uses template questions
/// - otherwise OpenAI when OPENAI_API_KEY is present
/// - `auto` without a key falls back to template questions; `openai` without a key fails every generation
fn select_generator(settings: &GenerationSettings) -> Arc<dyn QuestionGenerator> {
    if settings.mode == GeneratorMode::Template {
        info!(target: "stacks_backend", "Quiz generation uses template questions (configured).");
        return Arc::new(TemplateGenerator);
    }

    match (OpenAI::from_env(settings.temperature), settings.mode) {
        (Some(oa), _) => {
            info!(target: "stacks_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
            Arc::new(oa)
        }
        (None, GeneratorMode::Openai) => {
            error!(target: "stacks_backend", "OpenAI mode configured but OPENAI_API_KEY not set; every quiz will fail to generate.");
            Arc::new(Unconfigured)
        }
        (None, _) => {
            warn!(target: "stacks_backend", "OpenAI disabled (no OPENAI_API_KEY). Using template questions.");
            Arc::new(TemplateGenerator)
        }
    }
}
