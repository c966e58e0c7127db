//! Public protocol structs for HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LearningStatus, Quiz, QuizQuestion, QuizStatus, ResourceType, Stack};
use crate::prompt::ResourceInput;

//
// Stacks
//

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StackScope {
    /// Stacks owned by the requester.
    Mine,
    /// Public stacks, whoever owns them.
    Public,
    /// Both of the above.
    #[default]
    All,
}

#[derive(Debug, Deserialize, Default)]
pub struct StackListQuery {
    #[serde(default)]
    pub scope: StackScope,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStackIn {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStackIn {
    pub title: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackOut {
    #[serde(flatten)]
    pub stack: Stack,
    pub resource_count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    pub total: usize,
    pub reference: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    /// Done share of the resources meant to be learned (non-reference), 0-100.
    pub percent: u32,
    pub message: &'static str,
    pub emoji: &'static str,
}

//
// Resources
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceIn {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Detected from the URL when omitted.
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    pub resource_url: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub user_notes: Option<String>,
    #[serde(default)]
    pub status: Option<LearningStatus>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceIn {
    pub title: Option<String>,
    pub description: Option<String>,
    pub resource_type: Option<ResourceType>,
    pub resource_url: Option<String>,
    pub file_path: Option<String>,
    pub user_notes: Option<String>,
    pub status: Option<LearningStatus>,
}

//
// Quizzes
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizIn {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resource_ids: Vec<String>,
    pub number_of_questions: i64,
    #[serde(default, rename = "useHOTS")]
    pub use_hots: bool,
}

/// Source resource with its title resolved at read time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResourceRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOut {
    pub id: String,
    pub study_stack_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resource_ids: Vec<String>,
    pub resources: Vec<ResourceRef>,
    pub questions: Vec<QuizQuestion>,
    pub number_of_questions: u32,
    #[serde(rename = "useHOTS")]
    pub use_hots: bool,
    pub status: QuizStatus,
    pub generated_at: Option<DateTime<Utc>>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Convert a stored `Quiz` plus its resolved resources to the public DTO.
pub fn quiz_out(q: &Quiz, resources: Vec<ResourceRef>) -> QuizOut {
    QuizOut {
        id: q.id.clone(),
        study_stack_id: q.study_stack_id.clone(),
        title: q.title.clone(),
        description: q.description.clone(),
        resource_ids: q.resource_ids.clone(),
        resources,
        questions: q.questions().to_vec(),
        number_of_questions: q.number_of_questions,
        use_hots: q.use_hots,
        status: q.status(),
        generated_at: q.generated_at(),
        owner_id: q.owner_id.clone(),
        created_at: q.created_at,
        updated_at: q.updated_at,
    }
}

//
// Attempts
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub selected_answer: i64,
    #[serde(default)]
    pub time_spent: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptIn {
    pub answers: Vec<AnswerIn>,
    /// Total seconds; defaults to the sum of per-answer times.
    #[serde(default)]
    pub time_spent: Option<f64>,
}

//
// Ad-hoc generation
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiQuizIn {
    #[serde(default)]
    pub resources: Vec<ResourceInput>,
    pub number_of_questions: i64,
    #[serde(default, rename = "useHOTS")]
    pub use_hots: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiQuizOut {
    pub questions: Vec<QuizQuestion>,
    pub generated_at: DateTime<Utc>,
    pub resources_used: usize,
    pub cognitive_level: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiServiceOut {
    pub service: &'static str,
    pub version: &'static str,
    pub generator: &'static str,
    pub supported_question_types: Vec<&'static str>,
    pub max_questions: u32,
    pub supported_difficulties: Vec<&'static str>,
}

//
// Misc
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct DeletedOut {
    pub success: bool,
}
