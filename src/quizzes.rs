//! Quiz generation engine.
//!
//! Creating a quiz validates everything synchronously, stores the quiz as
//! `generating`, hands back that record, and leaves the external generation
//! call to a detached task. The task is the only writer of the generation
//! outcome: it builds the complete question set in memory, then flips the
//! status with a single update (`generating -> ready | failed`, exactly once).
//! Its failures never reach the caller; they only show up as `failed`.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, instrument, warn, Instrument};
use uuid::Uuid;

use crate::auth::Requester;
use crate::domain::{Difficulty, Quiz, QuizQuestion, QuizState, QuizStatus, Resource};
use crate::error::{AppError, AppResult};
use crate::generator::{GeneratedQuestion, GenerationError};
use crate::prompt::{build_quiz_prompt, ResourceInput};
use crate::protocol::{quiz_out, AiQuizIn, AiQuizOut, AiServiceOut, CreateQuizIn, QuizOut, ResourceRef};
use crate::stacks::{load_owned, load_readable};
use crate::state::AppState;

/// Validate the request, persist a `generating` quiz, and start generation in the background.
#[instrument(level = "info", skip(state, input), fields(requester = %requester.id(), requested = input.number_of_questions, use_hots = input.use_hots))]
pub async fn create_quiz(
  state: &AppState,
  stack_id: &str,
  requester: &Requester,
  input: CreateQuizIn,
) -> AppResult<QuizOut> {
  load_owned(state, stack_id, requester).await?;

  let title = input.title.trim().to_string();
  if title.is_empty() {
    return Err(AppError::Validation("Title is required".into()));
  }

  let mut seen = HashSet::new();
  let resource_ids: Vec<String> = input
    .resource_ids
    .into_iter()
    .filter(|id| seen.insert(id.clone()))
    .collect();
  if resource_ids.is_empty() {
    return Err(AppError::Validation("At least one resource is required".into()));
  }

  let max = state.generation.max_questions;
  let count = input.number_of_questions;
  if count < 1 || count > i64::from(max) {
    return Err(AppError::Validation(format!("Number of questions must be between 1 and {}", max)));
  }
  let count = count as u32;

  let resources = state
    .store
    .resources
    .find(|r| r.study_stack_id == stack_id && resource_ids.contains(&r.id))
    .await;
  if resources.len() != resource_ids.len() {
    warn!(target: "quiz", %stack_id, wanted = resource_ids.len(), found = resources.len(), "Quiz references resources outside the stack");
    return Err(AppError::NotFound("Resource"));
  }

  let now = Utc::now();
  let quiz = Quiz {
    id: Uuid::new_v4().to_string(),
    study_stack_id: stack_id.to_string(),
    title,
    description: crate::util::non_empty(input.description),
    resource_ids,
    number_of_questions: count,
    use_hots: input.use_hots,
    state: QuizState::Generating,
    owner_id: requester.id().to_string(),
    created_at: now,
    updated_at: now,
  };
  let quiz = state.store.quizzes.insert(quiz).await;
  state.store.persist().await;
  info!(target: "quiz", id = %quiz.id, %stack_id, count, generator = state.generator.name(), "Quiz created; generation started");

  let refs = resolve_refs(&quiz, &resources);
  spawn_generation(state.clone(), quiz.id.clone(), resources, count, quiz.use_hots);

  Ok(quiz_out(&quiz, refs))
}

/// Fire-and-forget: nothing awaits the returned task.
fn spawn_generation(state: AppState, quiz_id: String, resources: Vec<Resource>, count: u32, use_hots: bool) {
  let span = tracing::info_span!("quiz_generation", %quiz_id);
  tokio::spawn(
    async move {
      run_generation(&state, &quiz_id, &resources, count, use_hots).await;
    }
    .instrument(span),
  );
}

/// The background step. Returns the status the quiz ended in (or `None` if it
/// vanished while generating).
pub(crate) async fn run_generation(
  state: &AppState,
  quiz_id: &str,
  resources: &[Resource],
  count: u32,
  use_hots: bool,
) -> Option<QuizStatus> {
  let inputs: Vec<ResourceInput> = resources.iter().map(ResourceInput::from).collect();
  let prompt = build_quiz_prompt(&state.prompts, inputs, count, use_hots);

  let start = Instant::now();
  let outcome = match state.generator.generate(&prompt).await {
    Ok(raw) => finalize_questions(raw, use_hots),
    Err(e) => Err(e),
  };
  let elapsed = start.elapsed();

  match &outcome {
    Ok(qs) if qs.len() as u32 != count => {
      warn!(target: "quiz", %quiz_id, requested = count, returned = qs.len(), "Question count differs from request; accepting");
    }
    Ok(_) => {}
    Err(e) => error!(target: "quiz", %quiz_id, ?elapsed, error = %e, "Quiz generation failed"),
  }

  let now = Utc::now();
  let settled = state
    .store
    .quizzes
    .update_by_id(quiz_id, move |quiz| {
      let changed = match outcome {
        Ok(questions) => quiz.mark_ready(questions, now),
        Err(_) => quiz.mark_failed(now),
      };
      (changed, quiz.status())
    })
    .await;

  match settled {
    Some((true, status)) => {
      state.store.persist().await;
      info!(target: "quiz", %quiz_id, %status, ?elapsed, "Quiz generation settled");
      Some(status)
    }
    Some((false, status)) => {
      warn!(target: "quiz", %quiz_id, %status, "Quiz already settled; outcome dropped");
      Some(status)
    }
    None => {
      warn!(target: "quiz", %quiz_id, "Quiz deleted before generation finished; outcome dropped");
      None
    }
  }
}

/// Validate a backend result into stored questions. Any invalid question fails the whole set.
pub fn finalize_questions(raw: Vec<GeneratedQuestion>, use_hots: bool) -> Result<Vec<QuizQuestion>, GenerationError> {
  if raw.is_empty() {
    return Err(GenerationError::Empty);
  }
  let fallback = if use_hots { Difficulty::Hard } else { Difficulty::Medium };

  raw
    .into_iter()
    .enumerate()
    .map(|(i, q)| {
      let question = q.question.trim().to_string();
      if question.is_empty() {
        return Err(GenerationError::Malformed(format!("question {} has no text", i)));
      }
      if q.options.len() != 4 {
        return Err(GenerationError::Malformed(format!("question {} has {} options", i, q.options.len())));
      }
      if !(0..=3).contains(&q.correct_answer) {
        return Err(GenerationError::Malformed(format!("question {} has correct index {}", i, q.correct_answer)));
      }
      Ok(QuizQuestion {
        question,
        options: q.options,
        correct_answer: q.correct_answer as u8,
        explanation: q.explanation.unwrap_or_default(),
        difficulty: q.difficulty.unwrap_or(fallback),
      })
    })
    .collect()
}

/// Quiz by id, checked against the stack it is addressed through.
pub async fn load_in_stack(state: &AppState, stack_id: &str, quiz_id: &str) -> AppResult<Quiz> {
  match state.store.quizzes.find_by_id(quiz_id).await {
    Some(q) if q.study_stack_id == stack_id => Ok(q),
    _ => Err(AppError::NotFound("Quiz")),
  }
}

#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn get_quiz(state: &AppState, stack_id: &str, quiz_id: &str, requester: &Requester) -> AppResult<QuizOut> {
  load_readable(state, stack_id, requester).await?;
  let quiz = load_in_stack(state, stack_id, quiz_id).await?;
  let resources = state.store.resources.find(|r| quiz.resource_ids.contains(&r.id)).await;
  Ok(quiz_out(&quiz, resolve_refs(&quiz, &resources)))
}

/// Newest first.
#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn list_quizzes(state: &AppState, stack_id: &str, requester: &Requester) -> AppResult<Vec<QuizOut>> {
  load_readable(state, stack_id, requester).await?;
  let mut quizzes = state.store.quizzes.find(|q| q.study_stack_id == stack_id).await;
  quizzes.reverse();
  let resources = state.store.resources.find(|r| r.study_stack_id == stack_id).await;
  Ok(quizzes.iter().map(|q| quiz_out(q, resolve_refs(q, &resources))).collect())
}

/// Owner-only. Attempts go first so none ever points at a missing quiz.
#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn delete_quiz(state: &AppState, stack_id: &str, quiz_id: &str, requester: &Requester) -> AppResult<()> {
  load_owned(state, stack_id, requester).await?;
  load_in_stack(state, stack_id, quiz_id).await?;

  let gate = state.store.attempt_gate.lock().await;
  let attempts = state.store.attempts.delete_many(|a| a.quiz_id == quiz_id).await;
  state.store.quizzes.delete_by_id(quiz_id).await;
  drop(gate);
  state.store.persist().await;
  info!(target: "quiz", %quiz_id, attempts, "Quiz deleted");
  Ok(())
}

/// Quizzes left `generating` by a previous process have no task to finish them.
pub async fn fail_interrupted(state: &AppState) -> usize {
  let stuck: Vec<String> = state
    .store
    .quizzes
    .find(|q| q.status() == QuizStatus::Generating)
    .await
    .into_iter()
    .map(|q| q.id)
    .collect();
  let now = Utc::now();
  for id in &stuck {
    state.store.quizzes.update_by_id(id, |q| q.mark_failed(now)).await;
  }
  if !stuck.is_empty() {
    state.store.persist().await;
    warn!(target: "quiz", count = stuck.len(), "Marked interrupted generations as failed");
  }
  stuck.len()
}

/// Synchronous generation from ad-hoc resources. Here generation errors do reach the caller.
#[instrument(level = "info", skip(state, input), fields(requester = %requester.id(), resources = input.resources.len(), requested = input.number_of_questions))]
pub async fn generate_adhoc(state: &AppState, requester: &Requester, input: AiQuizIn) -> AppResult<AiQuizOut> {
  if input.resources.is_empty() {
    return Err(AppError::Validation("At least one resource is required".into()));
  }
  let max = state.generation.max_questions;
  if input.number_of_questions < 1 || input.number_of_questions > i64::from(max) {
    return Err(AppError::Validation(format!("Number of questions must be between 1 and {}", max)));
  }

  let resources_used = input.resources.len();
  let prompt = build_quiz_prompt(&state.prompts, input.resources, input.number_of_questions as u32, input.use_hots);
  let raw = state.generator.generate(&prompt).await.map_err(AppError::Upstream)?;
  let questions = finalize_questions(raw, input.use_hots).map_err(AppError::Upstream)?;
  info!(target: "quiz", returned = questions.len(), "Ad-hoc questions generated");

  Ok(AiQuizOut {
    questions,
    generated_at: Utc::now(),
    resources_used,
    cognitive_level: if input.use_hots { "HOTS" } else { "Standard" },
  })
}

pub fn service_info(state: &AppState) -> AiServiceOut {
  AiServiceOut {
    service: "Quiz Generation",
    version: env!("CARGO_PKG_VERSION"),
    generator: state.generator.name(),
    supported_question_types: vec!["multiple-choice"],
    max_questions: state.generation.max_questions,
    supported_difficulties: vec!["easy", "medium", "hard"],
  }
}

/// Titles of the quiz's source resources that still exist, in quiz order.
fn resolve_refs(quiz: &Quiz, resources: &[Resource]) -> Vec<ResourceRef> {
  let titles: HashMap<&str, &str> = resources.iter().map(|r| (r.id.as_str(), r.title.as_str())).collect();
  quiz
    .resource_ids
    .iter()
    .filter_map(|id| titles.get(id.as_str()).map(|t| ResourceRef { id: id.clone(), title: t.to_string() }))
    .collect()
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use tokio::sync::Notify;

  use super::*;
  use crate::generator::fakes::{question, Failing, Fixed, Gated};
  use crate::generator::QuestionGenerator;
  use crate::state::test_support::{seed_resource, seed_stack, state_with, wait_until_settled};

  fn owner() -> Requester { Requester("owner".into()) }

  fn request(resource_ids: Vec<String>, n: i64) -> CreateQuizIn {
    CreateQuizIn {
      title: "Week 1".into(),
      description: Some("Basics".into()),
      resource_ids,
      number_of_questions: n,
      use_hots: false,
    }
  }

  async fn setup(generator: Arc<dyn QuestionGenerator>) -> (AppState, String, Vec<String>) {
    let state = state_with(generator);
    let stack = seed_stack(&state, "owner", false).await;
    let r1 = seed_resource(&state, &stack.id, "Ownership").await;
    let r2 = seed_resource(&state, &stack.id, "Borrowing").await;
    (state, stack.id, vec![r1.id, r2.id])
  }

  #[tokio::test]
  async fn create_returns_generating_then_becomes_ready() {
    let gate = Arc::new(Notify::new());
    let gen = Gated { gate: gate.clone(), questions: vec![question(1), question(2), question(2)] };
    let (state, stack_id, ids) = setup(Arc::new(gen)).await;

    let created = create_quiz(&state, &stack_id, &owner(), request(ids.clone(), 3)).await.unwrap();
    assert_eq!(created.status, QuizStatus::Generating);
    assert!(created.questions.is_empty());
    assert!(created.generated_at.is_none());
    assert_eq!(created.resources.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(), vec!["Ownership", "Borrowing"]);

    // Still observable as generating while the upstream call is in flight.
    tokio::task::yield_now().await;
    let polled = get_quiz(&state, &stack_id, &created.id, &owner()).await.unwrap();
    assert_eq!(polled.status, QuizStatus::Generating);
    assert!(polled.questions.is_empty());

    gate.notify_one();
    let settled = wait_until_settled(&state, &created.id).await;
    assert_eq!(settled.status(), QuizStatus::Ready);
    assert_eq!(settled.questions().len(), 3);
    assert!(settled.generated_at().is_some());
  }

  #[tokio::test]
  async fn upstream_failure_ends_in_failed_with_no_questions() {
    let (state, stack_id, ids) = setup(Arc::new(Failing)).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 3)).await.unwrap();
    assert_eq!(created.status, QuizStatus::Generating);

    let settled = wait_until_settled(&state, &created.id).await;
    assert_eq!(settled.status(), QuizStatus::Failed);
    assert!(settled.questions().is_empty());
    assert!(settled.generated_at().is_none());
  }

  #[tokio::test]
  async fn malformed_result_fails_the_quiz() {
    let mut bad = question(0);
    bad.options.pop();
    let (state, stack_id, ids) = setup(Arc::new(Fixed(vec![question(0), bad]))).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 2)).await.unwrap();
    let settled = wait_until_settled(&state, &created.id).await;
    assert_eq!(settled.status(), QuizStatus::Failed);
  }

  #[tokio::test]
  async fn count_mismatch_is_accepted() {
    let (state, stack_id, ids) = setup(Arc::new(Fixed(vec![question(0), question(3)]))).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 5)).await.unwrap();
    let settled = wait_until_settled(&state, &created.id).await;
    assert_eq!(settled.status(), QuizStatus::Ready);
    assert_eq!(settled.questions().len(), 2);
    assert_eq!(settled.number_of_questions, 5);
  }

  #[tokio::test]
  async fn terminal_states_are_never_left() {
    let (state, stack_id, ids) = setup(Arc::new(Failing)).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 1)).await.unwrap();
    wait_until_settled(&state, &created.id).await;

    // A late second run (e.g. a duplicate task) must not resurrect the quiz.
    let late = state_with(Arc::new(Fixed(vec![question(0)])));
    let late = AppState { store: state.store.clone(), ..late };
    let status = run_generation(&late, &created.id, &[], 1, false).await;
    assert_eq!(status, Some(QuizStatus::Failed));
    let q = state.store.quizzes.find_by_id(&created.id).await.unwrap();
    assert!(q.questions().is_empty());
  }

  #[tokio::test]
  async fn foreign_resource_is_rejected_without_creating_a_quiz() {
    let (state, stack_id, mut ids) = setup(Arc::new(Fixed(vec![question(0)]))).await;
    let other = seed_stack(&state, "owner", false).await;
    let foreign = seed_resource(&state, &other.id, "Elsewhere").await;
    ids.push(foreign.id);

    let err = create_quiz(&state, &stack_id, &owner(), request(ids, 3)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("Resource")));
    assert_eq!(state.store.quizzes.count(|_| true).await, 0);
  }

  #[tokio::test]
  async fn preconditions_are_checked_before_anything_is_stored() {
    let (state, stack_id, ids) = setup(Arc::new(Fixed(vec![question(0)]))).await;

    let err = create_quiz(&state, &stack_id, &Requester("intruder".into()), request(ids.clone(), 3)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = create_quiz(&state, "missing", &owner(), request(ids.clone(), 3)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("Stack")));
    let err = create_quiz(&state, &stack_id, &owner(), request(vec![], 3)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = create_quiz(&state, &stack_id, &owner(), request(ids.clone(), 0)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = create_quiz(&state, &stack_id, &owner(), request(ids, 51)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(state.store.quizzes.count(|_| true).await, 0);
  }

  #[tokio::test]
  async fn duplicate_resource_ids_are_collapsed() {
    let (state, stack_id, ids) = setup(Arc::new(Fixed(vec![question(0)]))).await;
    let dup = vec![ids[0].clone(), ids[0].clone()];
    let created = create_quiz(&state, &stack_id, &owner(), request(dup, 1)).await.unwrap();
    assert_eq!(created.resource_ids, vec![ids[0].clone()]);
  }

  #[tokio::test]
  async fn read_access_follows_stack_visibility() {
    let (state, stack_id, ids) = setup(Arc::new(Fixed(vec![question(0)]))).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 1)).await.unwrap();
    let stranger = Requester("stranger".into());

    assert!(matches!(get_quiz(&state, &stack_id, &created.id, &stranger).await, Err(AppError::Forbidden)));
    assert!(matches!(list_quizzes(&state, &stack_id, &stranger).await, Err(AppError::Forbidden)));

    state.store.stacks.update_by_id(&stack_id, |s| s.is_public = true).await;
    assert!(get_quiz(&state, &stack_id, &created.id, &stranger).await.is_ok());

    let other = seed_stack(&state, "owner", true).await;
    assert!(matches!(get_quiz(&state, &other.id, &created.id, &owner()).await, Err(AppError::NotFound("Quiz"))));
  }

  #[tokio::test]
  async fn list_is_newest_first_and_resolves_surviving_titles() {
    let (state, stack_id, ids) = setup(Arc::new(Fixed(vec![question(0)]))).await;
    let first = create_quiz(&state, &stack_id, &owner(), request(ids.clone(), 1)).await.unwrap();
    let second = create_quiz(&state, &stack_id, &owner(), request(vec![ids[1].clone()], 1)).await.unwrap();

    // Orphan one reference: the id stays, the title no longer resolves.
    state.store.resources.delete_by_id(&ids[0]).await;

    let listed = list_quizzes(&state, &stack_id, &owner()).await.unwrap();
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
    assert_eq!(listed[1].resource_ids.len(), 2);
    assert_eq!(listed[1].resources, vec![ResourceRef { id: ids[1].clone(), title: "Borrowing".into() }]);
  }

  #[tokio::test]
  async fn delete_removes_attempts_then_quiz() {
    let (state, stack_id, ids) = setup(Arc::new(Fixed(vec![question(0)]))).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 1)).await.unwrap();
    wait_until_settled(&state, &created.id).await;
    crate::attempts::submit_attempt(
      &state,
      &stack_id,
      &created.id,
      &owner(),
      crate::protocol::SubmitAttemptIn {
        answers: vec![crate::protocol::AnswerIn { selected_answer: 0, time_spent: Some(3.0) }],
        time_spent: None,
      },
    )
    .await
    .unwrap();

    let err = delete_quiz(&state, &stack_id, &created.id, &Requester("stranger".into())).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    delete_quiz(&state, &stack_id, &created.id, &owner()).await.unwrap();
    assert!(state.store.quizzes.find_by_id(&created.id).await.is_none());
    assert_eq!(state.store.attempts.count(|a| a.quiz_id == created.id).await, 0);
    assert!(matches!(delete_quiz(&state, &stack_id, &created.id, &owner()).await, Err(AppError::NotFound("Quiz"))));
  }

  #[tokio::test]
  async fn deleting_during_generation_drops_the_outcome() {
    let gate = Arc::new(Notify::new());
    let gen = Gated { gate: gate.clone(), questions: vec![question(0)] };
    let (state, stack_id, ids) = setup(Arc::new(gen)).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 1)).await.unwrap();

    delete_quiz(&state, &stack_id, &created.id, &owner()).await.unwrap();
    gate.notify_one();
    for _ in 0..20 {
      tokio::task::yield_now().await;
    }
    assert!(state.store.quizzes.find_by_id(&created.id).await.is_none());
  }

  #[tokio::test]
  async fn interrupted_generations_are_failed_on_startup() {
    let gate = Arc::new(Notify::new());
    let gen = Gated { gate, questions: vec![question(0)] };
    let (state, stack_id, ids) = setup(Arc::new(gen)).await;
    let created = create_quiz(&state, &stack_id, &owner(), request(ids, 1)).await.unwrap();

    assert_eq!(fail_interrupted(&state).await, 1);
    let q = state.store.quizzes.find_by_id(&created.id).await.unwrap();
    assert_eq!(q.status(), QuizStatus::Failed);
  }

  fn adhoc(n: i64) -> AiQuizIn {
    AiQuizIn {
      resources: vec![ResourceInput {
        title: "Tokio".into(),
        description: None,
        resource_url: "https://tokio.rs".into(),
        resource_type: "webpage".into(),
      }],
      number_of_questions: n,
      use_hots: true,
    }
  }

  #[tokio::test]
  async fn adhoc_generation_returns_questions_directly() {
    let state = state_with(Arc::new(Fixed(vec![question(2), question(1)])));
    let out = generate_adhoc(&state, &owner(), adhoc(2)).await.unwrap();
    assert_eq!(out.questions.len(), 2);
    assert_eq!(out.resources_used, 1);
    assert_eq!(out.cognitive_level, "HOTS");
  }

  #[tokio::test]
  async fn adhoc_generation_surfaces_upstream_errors() {
    let state = state_with(Arc::new(Failing));
    let err = generate_adhoc(&state, &owner(), adhoc(2)).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(GenerationError::Upstream(_))));
    assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);

    let err = generate_adhoc(&state, &owner(), AiQuizIn { resources: vec![], ..adhoc(2) }).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
  }

  #[test]
  fn finalize_fills_missing_difficulty_and_explanation() {
    let mut q = question(3);
    q.difficulty = None;
    q.explanation = None;
    let out = finalize_questions(vec![q.clone()], true).unwrap();
    assert_eq!(out[0].difficulty, Difficulty::Hard);
    assert_eq!(out[0].explanation, "");
    assert_eq!(out[0].correct_answer, 3);
    assert_eq!(finalize_questions(vec![q], false).unwrap()[0].difficulty, Difficulty::Medium);
  }

  #[test]
  fn finalize_rejects_invalid_sets() {
    assert!(matches!(finalize_questions(vec![], false), Err(GenerationError::Empty)));
    assert!(matches!(finalize_questions(vec![question(4)], false), Err(GenerationError::Malformed(_))));
    assert!(matches!(finalize_questions(vec![question(-1)], false), Err(GenerationError::Malformed(_))));
    let mut blank = question(0);
    blank.question = "  ".into();
    assert!(matches!(finalize_questions(vec![blank], false), Err(GenerationError::Malformed(_))));
  }
}
