//! Prompt construction for quiz generation.

use serde::Deserialize;

use crate::config::Prompts;
use crate::domain::Resource;
use crate::util::fill_template;

/// The parts of a resource the generator gets to see.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub resource_url: String,
  pub resource_type: String,
}

impl From<&Resource> for ResourceInput {
  fn from(r: &Resource) -> Self {
    Self {
      title: r.title.clone(),
      description: r.description.clone(),
      resource_url: r.resource_url.clone(),
      resource_type: r.resource_type.as_str().to_string(),
    }
  }
}

/// Everything a generator needs: rendered text for LLM backends, plus the
/// structured inputs for offline ones.
#[derive(Clone, Debug)]
pub struct QuizPrompt {
  pub system: String,
  pub user: String,
  pub requested: u32,
  pub use_hots: bool,
  pub resources: Vec<ResourceInput>,
}

pub fn cognitive_level(prompts: &Prompts, use_hots: bool) -> &str {
  if use_hots { &prompts.hots_level } else { &prompts.standard_level }
}

/// Numbered, markdown-ish listing of the source resources.
pub fn render_resource_list(resources: &[ResourceInput]) -> String {
  resources
    .iter()
    .enumerate()
    .map(|(i, r)| {
      let description = r
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description provided");
      format!(
        "{}. **{}** ({}) \n- Description: {} \n- URL: {}",
        i + 1,
        r.title,
        r.resource_type,
        description,
        r.resource_url
      )
    })
    .collect::<Vec<_>>()
    .join("\n\n")
}

pub fn build_quiz_prompt(
  prompts: &Prompts,
  resources: Vec<ResourceInput>,
  requested: u32,
  use_hots: bool,
) -> QuizPrompt {
  let count = requested.to_string();
  let listing = render_resource_list(&resources);
  // Resource text is user-supplied; it goes in last so its braces stay literal.
  let user = fill_template(
    &prompts.quiz_user_template,
    &[
      ("count", count.as_str()),
      ("cognitive_level", cognitive_level(prompts, use_hots)),
      ("resources", listing.as_str()),
    ],
  );
  QuizPrompt { system: prompts.quiz_system.clone(), user, requested, use_hots, resources }
}
