//! Resource operations. A resource always lives in exactly one stack; an id
//! addressed through the wrong stack does not exist.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Requester;
use crate::domain::{youtube_embed_url, Resource, ResourceType};
use crate::error::{AppError, AppResult};
use crate::protocol::{CreateResourceIn, UpdateResourceIn};
use crate::stacks::{load_owned, load_readable};
use crate::state::AppState;
use crate::util::non_empty;

fn embed_for(resource_type: ResourceType, url: &str) -> Option<String> {
  match resource_type {
    ResourceType::Youtube => youtube_embed_url(url),
    _ => None,
  }
}

async fn load_in_stack(state: &AppState, stack_id: &str, resource_id: &str) -> AppResult<Resource> {
  match state.store.resources.find_by_id(resource_id).await {
    Some(r) if r.study_stack_id == stack_id => Ok(r),
    _ => Err(AppError::NotFound("Resource")),
  }
}

/// Oldest first.
#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn list_resources(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<Vec<Resource>> {
  load_readable(state, stack_id, requester).await?;
  Ok(state.store.resources.find(|r| r.study_stack_id == stack_id).await)
}

#[instrument(level = "info", skip(state, input), fields(requester = %requester.id()))]
pub async fn create_resource(
  state: &AppState,
  stack_id: &str,
  requester: &Requester,
  input: CreateResourceIn,
) -> AppResult<Resource> {
  load_owned(state, stack_id, requester).await?;

  let title = input.title.trim().to_string();
  let resource_url = input.resource_url.trim().to_string();
  if title.is_empty() {
    return Err(AppError::Validation("Title is required".into()));
  }
  if resource_url.is_empty() {
    return Err(AppError::Validation("Resource URL is required".into()));
  }

  let resource_type = input.resource_type.unwrap_or_else(|| ResourceType::detect(&resource_url));
  let now = Utc::now();
  let resource = Resource {
    id: Uuid::new_v4().to_string(),
    study_stack_id: stack_id.to_string(),
    title,
    description: non_empty(input.description),
    resource_type,
    status: input.status.unwrap_or_default(),
    embed_url: embed_for(resource_type, &resource_url),
    resource_url,
    file_path: non_empty(input.file_path),
    user_notes: non_empty(input.user_notes),
    created_at: now,
    updated_at: now,
  };
  let resource = state.store.resources.insert(resource).await;
  state.store.persist().await;
  info!(target: "stacks_backend", id = %resource.id, %stack_id, kind = resource.resource_type.as_str(), "Resource created");
  Ok(resource)
}

#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn get_resource(
  state: &AppState,
  stack_id: &str,
  resource_id: &str,
  requester: &Requester,
) -> AppResult<Resource> {
  load_readable(state, stack_id, requester).await?;
  load_in_stack(state, stack_id, resource_id).await
}

/// Partial update. A new URL or type re-derives the embed URL.
#[instrument(level = "info", skip(state, patch), fields(requester = %requester.id()))]
pub async fn update_resource(
  state: &AppState,
  stack_id: &str,
  resource_id: &str,
  requester: &Requester,
  patch: UpdateResourceIn,
) -> AppResult<Resource> {
  load_owned(state, stack_id, requester).await?;
  load_in_stack(state, stack_id, resource_id).await?;

  if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
    return Err(AppError::Validation("Title cannot be empty".into()));
  }
  if patch.resource_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
    return Err(AppError::Validation("Resource URL cannot be empty".into()));
  }

  let updated = state
    .store
    .resources
    .update_by_id(resource_id, |r| {
      let relink = patch.resource_url.is_some() || patch.resource_type.is_some();
      if let Some(t) = patch.title { r.title = t.trim().to_string(); }
      if let Some(d) = patch.description { r.description = non_empty(Some(d)); }
      if let Some(u) = patch.resource_url { r.resource_url = u.trim().to_string(); }
      if let Some(k) = patch.resource_type { r.resource_type = k; }
      if let Some(f) = patch.file_path { r.file_path = non_empty(Some(f)); }
      if let Some(n) = patch.user_notes { r.user_notes = non_empty(Some(n)); }
      if let Some(s) = patch.status { r.status = s; }
      if relink {
        r.embed_url = embed_for(r.resource_type, &r.resource_url);
      }
      r.updated_at = Utc::now();
      r.clone()
    })
    .await
    .ok_or(AppError::NotFound("Resource"))?;
  state.store.persist().await;
  Ok(updated)
}

/// Quizzes keep the id; their reads stop resolving it.
#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn delete_resource(
  state: &AppState,
  stack_id: &str,
  resource_id: &str,
  requester: &Requester,
) -> AppResult<()> {
  load_owned(state, stack_id, requester).await?;
  load_in_stack(state, stack_id, resource_id).await?;
  state.store.resources.delete_by_id(resource_id).await;
  state.store.persist().await;
  info!(target: "stacks_backend", %resource_id, %stack_id, "Resource deleted");
  Ok(())
}
