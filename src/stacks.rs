//! Stack operations: listing, CRUD, copy, learning progress, and the access
//! checks every other module goes through.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Requester;
use crate::domain::{LearningStatus, Resource, Stack};
use crate::error::{AppError, AppResult};
use crate::protocol::{CreateStackIn, ProgressOut, StackOut, StackScope, UpdateStackIn};
use crate::state::AppState;
use crate::util::non_empty;

const DEFAULT_EMOJI: &str = "📚";

/// Stack the requester may read (owner, or the stack is public).
pub async fn load_readable(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<Stack> {
  let stack = state.store.stacks.find_by_id(stack_id).await.ok_or(AppError::NotFound("Stack"))?;
  if !stack.is_readable_by(requester.id()) {
    return Err(AppError::Forbidden);
  }
  Ok(stack)
}

/// Stack the requester owns.
pub async fn load_owned(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<Stack> {
  let stack = state.store.stacks.find_by_id(stack_id).await.ok_or(AppError::NotFound("Stack"))?;
  if !stack.is_owned_by(requester.id()) {
    return Err(AppError::Forbidden);
  }
  Ok(stack)
}

#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn list_stacks(state: &AppState, requester: &Requester, scope: StackScope) -> Vec<StackOut> {
  let me = requester.id();
  let mut stacks = state
    .store
    .stacks
    .find(|s| match scope {
      StackScope::Mine => s.is_owned_by(me),
      StackScope::Public => s.is_public,
      StackScope::All => s.is_readable_by(me),
    })
    .await;
  stacks.reverse();

  let mut counts: HashMap<String, usize> = HashMap::new();
  for r in state.store.resources.find(|_| true).await {
    *counts.entry(r.study_stack_id).or_default() += 1;
  }

  stacks
    .into_iter()
    .map(|stack| {
      let resource_count = counts.get(&stack.id).copied().unwrap_or(0);
      StackOut { stack, resource_count }
    })
    .collect()
}

#[instrument(level = "info", skip(state, input), fields(requester = %requester.id()))]
pub async fn create_stack(state: &AppState, requester: &Requester, input: CreateStackIn) -> AppResult<Stack> {
  let title = input.title.trim().to_string();
  if title.is_empty() {
    return Err(AppError::Validation("Title is required".into()));
  }
  let now = Utc::now();
  let stack = Stack {
    id: Uuid::new_v4().to_string(),
    title,
    description: input.description.unwrap_or_default().trim().to_string(),
    emoji: non_empty(input.emoji).unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
    is_public: input.is_public.unwrap_or(false),
    owner_id: requester.id().to_string(),
    created_at: now,
    updated_at: now,
  };
  let stack = state.store.stacks.insert(stack).await;
  state.store.persist().await;
  info!(target: "stacks_backend", id = %stack.id, is_public = stack.is_public, "Stack created");
  Ok(stack)
}

#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn get_stack(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<StackOut> {
  let stack = load_readable(state, stack_id, requester).await?;
  let resource_count = state.store.resources.count(|r| r.study_stack_id == stack_id).await;
  Ok(StackOut { stack, resource_count })
}

#[instrument(level = "info", skip(state, patch), fields(requester = %requester.id()))]
pub async fn update_stack(
  state: &AppState,
  stack_id: &str,
  requester: &Requester,
  patch: UpdateStackIn,
) -> AppResult<Stack> {
  load_owned(state, stack_id, requester).await?;
  if let Some(t) = &patch.title {
    if t.trim().is_empty() {
      return Err(AppError::Validation("Title cannot be empty".into()));
    }
  }

  let updated = state
    .store
    .stacks
    .update_by_id(stack_id, |s| {
      if let Some(t) = patch.title { s.title = t.trim().to_string(); }
      if let Some(d) = patch.description { s.description = d.trim().to_string(); }
      if let Some(e) = non_empty(patch.emoji) { s.emoji = e; }
      if let Some(p) = patch.is_public { s.is_public = p; }
      s.updated_at = Utc::now();
      s.clone()
    })
    .await
    .ok_or(AppError::NotFound("Stack"))?;
  state.store.persist().await;
  Ok(updated)
}

/// Owner-only. Cascades: attempts of the stack's quizzes, quizzes, resources, then the stack.
#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn delete_stack(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<()> {
  load_owned(state, stack_id, requester).await?;
  let store = &state.store;
  let gate = store.attempt_gate.lock().await;

  let quiz_ids: Vec<String> = store
    .quizzes
    .find(|q| q.study_stack_id == stack_id)
    .await
    .into_iter()
    .map(|q| q.id)
    .collect();
  let attempts = store.attempts.delete_many(|a| quiz_ids.contains(&a.quiz_id)).await;
  let quizzes = store.quizzes.delete_many(|q| q.study_stack_id == stack_id).await;
  let resources = store.resources.delete_many(|r| r.study_stack_id == stack_id).await;
  store.stacks.delete_by_id(stack_id).await;
  drop(gate);
  store.persist().await;

  info!(target: "stacks_backend", %stack_id, attempts, quizzes, resources, "Stack deleted with its contents");
  Ok(())
}

/// Private copy of a readable stack (and its resources) owned by the requester.
#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn copy_stack(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<Stack> {
  let original = load_readable(state, stack_id, requester).await?;
  let now = Utc::now();
  let copy = Stack {
    id: Uuid::new_v4().to_string(),
    title: format!("{} (Copy)", original.title),
    description: original.description.clone(),
    emoji: original.emoji.clone(),
    is_public: false,
    owner_id: requester.id().to_string(),
    created_at: now,
    updated_at: now,
  };
  let copy = state.store.stacks.insert(copy).await;

  let resources = state.store.resources.find(|r| r.study_stack_id == stack_id).await;
  let copied = resources.len();
  for r in resources {
    state
      .store
      .resources
      .insert(Resource {
        id: Uuid::new_v4().to_string(),
        study_stack_id: copy.id.clone(),
        created_at: now,
        updated_at: now,
        ..r
      })
      .await;
  }
  state.store.persist().await;

  info!(target: "stacks_backend", from = %stack_id, to = %copy.id, resources = copied, "Stack copied");
  Ok(copy)
}

#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn stack_progress(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<ProgressOut> {
  load_readable(state, stack_id, requester).await?;
  let resources = state.store.resources.find(|r| r.study_stack_id == stack_id).await;
  Ok(progress_of(&resources))
}

pub fn progress_of(resources: &[Resource]) -> ProgressOut {
  let count = |st: LearningStatus| resources.iter().filter(|r| r.status == st).count();
  let reference = count(LearningStatus::Reference);
  let done = count(LearningStatus::Done);
  let learning = resources.len() - reference;
  let percent = if learning == 0 {
    0
  } else {
    ((200 * done + learning) / (2 * learning)) as u32
  };
  let (message, emoji) = progress_message(percent);
  ProgressOut {
    total: resources.len(),
    reference,
    todo: count(LearningStatus::Todo),
    in_progress: count(LearningStatus::Inprogress),
    done,
    percent,
    message,
    emoji,
  }
}

fn progress_message(percent: u32) -> (&'static str, &'static str) {
  match percent {
    0 => ("Ready to start your learning journey", "🚀"),
    1..=15 => ("Just getting started", "🌱"),
    16..=25 => ("Building momentum", "⚡"),
    26..=35 => ("Making steady progress", "📈"),
    36..=45 => ("Halfway there", "🎯"),
    46..=55 => ("Great progress", "💪"),
    56..=65 => ("Really picking up steam", "🔥"),
    66..=75 => ("Excellent work", "⭐"),
    76..=85 => ("Almost there", "🏃"),
    86..=95 => ("So close to completion", "🎊"),
    _ => ("Congratulations! All done", "🎉"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::fakes::{question, Fixed};
  use crate::protocol::CreateQuizIn;
  use crate::state::test_support::{seed_resource, seed_stack, state_with};
  use std::sync::Arc;

  fn owner() -> Requester { Requester("owner".into()) }
  fn stranger() -> Requester { Requester("stranger".into()) }

  #[tokio::test]
  async fn create_stack_applies_defaults_and_validates_title() {
    let state = state_with(Arc::new(Fixed(vec![])));
    let s = create_stack(
      &state,
      &owner(),
      CreateStackIn { title: "  Databases ".into(), description: None, emoji: Some("  ".into()), is_public: None },
    )
    .await
    .unwrap();
    assert_eq!(s.title, "Databases");
    assert_eq!(s.emoji, DEFAULT_EMOJI);
    assert!(!s.is_public);
    assert_eq!(s.owner_id, "owner");

    let err = create_stack(
      &state,
      &owner(),
      CreateStackIn { title: " ".into(), description: None, emoji: None, is_public: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
  }

  #[tokio::test]
  async fn list_respects_visibility_and_counts_resources() {
    let state = state_with(Arc::new(Fixed(vec![])));
    let mine = seed_stack(&state, "owner", false).await;
    let public = seed_stack(&state, "someone", true).await;
    let _hidden = seed_stack(&state, "someone", false).await;
    seed_resource(&state, &mine.id, "Ownership").await;
    seed_resource(&state, &mine.id, "Traits").await;

    let all = list_stacks(&state, &owner(), StackScope::All).await;
    let ids: Vec<&str> = all.iter().map(|s| s.stack.id.as_str()).collect();
    assert_eq!(ids, vec![public.id.as_str(), mine.id.as_str()]);
    assert_eq!(all[1].resource_count, 2);

    let only_mine = list_stacks(&state, &owner(), StackScope::Mine).await;
    assert_eq!(only_mine.len(), 1);
    let only_public = list_stacks(&state, &owner(), StackScope::Public).await;
    assert_eq!(only_public[0].stack.id, public.id);
  }

  #[tokio::test]
  async fn private_stack_is_forbidden_to_strangers() {
    let state = state_with(Arc::new(Fixed(vec![])));
    let s = seed_stack(&state, "owner", false).await;
    assert!(matches!(load_readable(&state, &s.id, &stranger()).await, Err(AppError::Forbidden)));
    assert!(matches!(load_readable(&state, "nope", &owner()).await, Err(AppError::NotFound("Stack"))));

    let public = seed_stack(&state, "owner", true).await;
    assert!(load_readable(&state, &public.id, &stranger()).await.is_ok());
    seed_resource(&state, &public.id, "Traits").await;
    assert_eq!(get_stack(&state, &public.id, &stranger()).await.unwrap().resource_count, 1);
    assert!(matches!(load_owned(&state, &public.id, &stranger()).await, Err(AppError::Forbidden)));
  }

  #[tokio::test]
  async fn update_is_owner_only_and_partial() {
    let state = state_with(Arc::new(Fixed(vec![])));
    let s = seed_stack(&state, "owner", false).await;

    let err = update_stack(&state, &s.id, &stranger(), UpdateStackIn::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let patch = UpdateStackIn { is_public: Some(true), ..Default::default() };
    let updated = update_stack(&state, &s.id, &owner(), patch).await.unwrap();
    assert!(updated.is_public);
    assert_eq!(updated.title, s.title);
    assert!(updated.updated_at >= s.updated_at);
  }

  #[tokio::test]
  async fn delete_cascades_resources_quizzes_and_attempts() {
    let state = state_with(Arc::new(Fixed(vec![question(0)])));
    let s = seed_stack(&state, "owner", false).await;
    let r = seed_resource(&state, &s.id, "Ownership").await;
    let other = seed_stack(&state, "owner", false).await;
    let kept = seed_resource(&state, &other.id, "Kept").await;

    let quiz = crate::quizzes::create_quiz(
      &state,
      &s.id,
      &owner(),
      CreateQuizIn {
        title: "Q".into(),
        description: None,
        resource_ids: vec![r.id.clone()],
        number_of_questions: 1,
        use_hots: false,
      },
    )
    .await
    .unwrap();
    crate::state::test_support::wait_until_settled(&state, &quiz.id).await;
    crate::attempts::submit_attempt(
      &state,
      &s.id,
      &quiz.id,
      &owner(),
      crate::protocol::SubmitAttemptIn {
        answers: vec![crate::protocol::AnswerIn { selected_answer: 0, time_spent: None }],
        time_spent: None,
      },
    )
    .await
    .unwrap();

    delete_stack(&state, &s.id, &owner()).await.unwrap();
    assert!(state.store.stacks.find_by_id(&s.id).await.is_none());
    assert_eq!(state.store.resources.count(|x| x.study_stack_id == s.id).await, 0);
    assert_eq!(state.store.quizzes.count(|_| true).await, 0);
    assert_eq!(state.store.attempts.count(|_| true).await, 0);
    assert!(state.store.resources.find_by_id(&kept.id).await.is_some());
  }

  #[tokio::test]
  async fn copy_creates_private_stack_with_resources() {
    let state = state_with(Arc::new(Fixed(vec![])));
    let s = seed_stack(&state, "owner", true).await;
    seed_resource(&state, &s.id, "Ownership").await;
    seed_resource(&state, &s.id, "Traits").await;

    let copy = copy_stack(&state, &s.id, &stranger()).await.unwrap();
    assert_eq!(copy.title, "Rust (Copy)");
    assert_eq!(copy.owner_id, "stranger");
    assert!(!copy.is_public);

    let copied = state.store.resources.find(|r| r.study_stack_id == copy.id).await;
    let titles: Vec<&str> = copied.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Ownership", "Traits"]);
    assert_eq!(state.store.resources.count(|r| r.study_stack_id == s.id).await, 2);
  }

  #[test]
  fn progress_ignores_reference_material() {
    let now = Utc::now();
    let make = |status| Resource {
      id: Uuid::new_v4().to_string(),
      study_stack_id: "s".into(),
      title: "t".into(),
      description: None,
      resource_type: crate::domain::ResourceType::Webpage,
      status,
      resource_url: "https://example.com".into(),
      embed_url: None,
      file_path: None,
      user_notes: None,
      created_at: now,
      updated_at: now,
    };
    let resources = vec![
      make(LearningStatus::Reference),
      make(LearningStatus::Done),
      make(LearningStatus::Todo),
      make(LearningStatus::Inprogress),
    ];
    let p = progress_of(&resources);
    assert_eq!(p.total, 4);
    assert_eq!(p.done, 1);
    assert_eq!(p.percent, 33);
    assert_eq!(p.message, "Making steady progress");

    assert_eq!(progress_of(&[make(LearningStatus::Reference)]).percent, 0);
    assert_eq!(progress_of(&[make(LearningStatus::Done)]).message, "Congratulations! All done");
  }
}
