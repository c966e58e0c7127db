//! Quiz attempts: scoring a submission against a ready quiz and listing a
//! user's own history.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Requester;
use crate::domain::{QuizAttempt, QuizQuestion, QuizStatus, UserAnswer};
use crate::error::{AppError, AppResult};
use crate::protocol::{AnswerIn, SubmitAttemptIn};
use crate::quizzes::load_in_stack;
use crate::stacks::load_readable;
use crate::state::AppState;

/// Score and store one submission. Nothing is stored unless every answer is valid.
#[instrument(level = "info", skip(state, input), fields(requester = %requester.id(), answers = input.answers.len()))]
pub async fn submit_attempt(
  state: &AppState,
  stack_id: &str,
  quiz_id: &str,
  requester: &Requester,
  input: SubmitAttemptIn,
) -> AppResult<QuizAttempt> {
  load_readable(state, stack_id, requester).await?;
  let gate = state.store.attempt_gate.lock().await;
  let quiz = load_in_stack(state, stack_id, quiz_id).await?;
  if quiz.status() != QuizStatus::Ready {
    return Err(AppError::Validation("Quiz is not ready".into()));
  }

  let answers = score_answers(quiz.questions(), &input.answers)?;
  let total = answers.len() as u32;
  let correct = answers.iter().filter(|a| a.is_correct).count() as u32;
  let time_spent = input
    .time_spent
    .unwrap_or_else(|| answers.iter().map(|a| a.time_spent).sum());

  let now = Utc::now();
  let attempt = QuizAttempt {
    id: Uuid::new_v4().to_string(),
    quiz_id: quiz.id.clone(),
    user_id: requester.id().to_string(),
    answers,
    score: percent(correct, total),
    total_questions: total,
    correct_answers: correct,
    time_spent,
    completed_at: now,
    created_at: now,
  };
  let attempt = state.store.attempts.insert(attempt).await;
  drop(gate);
  state.store.persist().await;
  info!(target: "quiz", id = %attempt.id, %quiz_id, score = attempt.score, correct, total, "Attempt scored");
  Ok(attempt)
}

/// Pair answers with questions by position.
pub fn score_answers(questions: &[QuizQuestion], answers: &[AnswerIn]) -> AppResult<Vec<UserAnswer>> {
  if answers.len() != questions.len() {
    return Err(AppError::Validation(format!(
      "Expected {} answers, got {}",
      questions.len(),
      answers.len()
    )));
  }

  questions
    .iter()
    .zip(answers)
    .enumerate()
    .map(|(i, (q, a))| {
      if !(0..=3).contains(&a.selected_answer) {
        return Err(AppError::Validation(format!("Answer {} is out of range", i)));
      }
      let selected = a.selected_answer as u8;
      Ok(UserAnswer {
        question_index: i as u32,
        selected_answer: selected,
        is_correct: selected == q.correct_answer,
        time_spent: a.time_spent.unwrap_or(0.0).max(0.0),
      })
    })
    .collect()
}

/// `round(100 * correct / total)`, halves rounded up.
pub fn percent(correct: u32, total: u32) -> u32 {
  if total == 0 {
    return 0;
  }
  (200 * correct + total) / (2 * total)
}

/// The requester's own attempts on this quiz, newest first.
#[instrument(level = "info", skip(state), fields(requester = %requester.id()))]
pub async fn list_attempts(
  state: &AppState,
  stack_id: &str,
  quiz_id: &str,
  requester: &Requester,
) -> AppResult<Vec<QuizAttempt>> {
  load_readable(state, stack_id, requester).await?;
  load_in_stack(state, stack_id, quiz_id).await?;
  let me = requester.id();
  let mut attempts = state
    .store
    .attempts
    .find(|a| a.quiz_id == quiz_id && a.user_id == me)
    .await;
  attempts.reverse();
  Ok(attempts)
}
