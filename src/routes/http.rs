//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures render through `AppError`.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json, response::IntoResponse};
use tracing::instrument;

use super::extract::{JsonBody, QueryParams};
use crate::auth::Requester;
use crate::error::AppResult;
use crate::protocol::*;
use crate::state::AppState;
use crate::{attempts, quizzes, resources, stacks};

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

//
// Stacks
//

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_list_stacks(
  State(state): State<Arc<AppState>>,
  who: Requester,
  QueryParams(q): QueryParams<StackListQuery>,
) -> impl IntoResponse {
  Json(stacks::list_stacks(&state, &who, q.scope).await)
}

#[instrument(level = "info", skip(state, body), fields(requester = %who.id()))]
pub async fn http_create_stack(
  State(state): State<Arc<AppState>>,
  who: Requester,
  JsonBody(body): JsonBody<CreateStackIn>,
) -> AppResult<impl IntoResponse> {
  let stack = stacks::create_stack(&state, &who, body).await?;
  Ok((StatusCode::CREATED, Json(stack)))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_get_stack(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(stacks::get_stack(&state, &stack_id, &who).await?))
}

#[instrument(level = "info", skip(state, body), fields(requester = %who.id()))]
pub async fn http_update_stack(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
  JsonBody(body): JsonBody<UpdateStackIn>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(stacks::update_stack(&state, &stack_id, &who, body).await?))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_delete_stack(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
) -> AppResult<impl IntoResponse> {
  stacks::delete_stack(&state, &stack_id, &who).await?;
  Ok(Json(DeletedOut { success: true }))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_copy_stack(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
) -> AppResult<impl IntoResponse> {
  let stack = stacks::copy_stack(&state, &stack_id, &who).await?;
  Ok((StatusCode::CREATED, Json(stack)))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_stack_progress(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(stacks::stack_progress(&state, &stack_id, &who).await?))
}

//
// Resources
//

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_list_resources(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(resources::list_resources(&state, &stack_id, &who).await?))
}

#[instrument(level = "info", skip(state, body), fields(requester = %who.id()))]
pub async fn http_create_resource(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
  JsonBody(body): JsonBody<CreateResourceIn>,
) -> AppResult<impl IntoResponse> {
  let resource = resources::create_resource(&state, &stack_id, &who, body).await?;
  Ok((StatusCode::CREATED, Json(resource)))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_get_resource(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path((stack_id, resource_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(resources::get_resource(&state, &stack_id, &resource_id, &who).await?))
}

#[instrument(level = "info", skip(state, body), fields(requester = %who.id()))]
pub async fn http_update_resource(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path((stack_id, resource_id)): Path<(String, String)>,
  JsonBody(body): JsonBody<UpdateResourceIn>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(resources::update_resource(&state, &stack_id, &resource_id, &who, body).await?))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_delete_resource(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path((stack_id, resource_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
  resources::delete_resource(&state, &stack_id, &resource_id, &who).await?;
  Ok(Json(DeletedOut { success: true }))
}

//
// Quizzes
//

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_list_quizzes(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(quizzes::list_quizzes(&state, &stack_id, &who).await?))
}

/// Answers immediately with the `generating` quiz; clients poll the quiz for the outcome.
#[instrument(level = "info", skip(state, body), fields(requester = %who.id(), resources = body.resource_ids.len()))]
pub async fn http_create_quiz(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path(stack_id): Path<String>,
  JsonBody(body): JsonBody<CreateQuizIn>,
) -> AppResult<impl IntoResponse> {
  let quiz = quizzes::create_quiz(&state, &stack_id, &who, body).await?;
  Ok((StatusCode::CREATED, Json(quiz)))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path((stack_id, quiz_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(quizzes::get_quiz(&state, &stack_id, &quiz_id, &who).await?))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_delete_quiz(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path((stack_id, quiz_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
  quizzes::delete_quiz(&state, &stack_id, &quiz_id, &who).await?;
  Ok(Json(DeletedOut { success: true }))
}

//
// Attempts
//

#[instrument(level = "info", skip(state, body), fields(requester = %who.id(), answers = body.answers.len()))]
pub async fn http_submit_attempt(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path((stack_id, quiz_id)): Path<(String, String)>,
  JsonBody(body): JsonBody<SubmitAttemptIn>,
) -> AppResult<impl IntoResponse> {
  let attempt = attempts::submit_attempt(&state, &stack_id, &quiz_id, &who, body).await?;
  Ok((StatusCode::CREATED, Json(attempt)))
}

#[instrument(level = "info", skip(state), fields(requester = %who.id()))]
pub async fn http_list_attempts(
  State(state): State<Arc<AppState>>,
  who: Requester,
  Path((stack_id, quiz_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(attempts::list_attempts(&state, &stack_id, &quiz_id, &who).await?))
}

//
// Ad-hoc generation
//

#[instrument(level = "info", skip(state, body), fields(requester = %who.id()))]
pub async fn http_post_ai_quiz(
  State(state): State<Arc<AppState>>,
  who: Requester,
  JsonBody(body): JsonBody<AiQuizIn>,
) -> AppResult<impl IntoResponse> {
  Ok(Json(quizzes::generate_adhoc(&state, &who, body).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_ai_quiz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(quizzes::service_info(&state))
}
