//! Domain models: stacks, resources, quizzes and quiz attempts.
//!
//! Records serialize with camelCase keys; the same shape is used for the JSON
//! snapshot on disk and (mostly) for the HTTP API.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A named collection of study resources owned by one user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub emoji: String,
  #[serde(default)] pub is_public: bool,
  pub owner_id: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Stack {
  pub fn is_owned_by(&self, user_id: &str) -> bool {
    self.owner_id == user_id
  }

  pub fn is_readable_by(&self, user_id: &str) -> bool {
    self.is_public || self.is_owned_by(user_id)
  }
}

/// What kind of material a resource points at.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
  /// Video link (YouTube).
  Youtube,
  Webpage,
  Document,
  Image,
}

const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];
const DOCUMENT_EXTENSIONS: [&str; 5] = [".pdf", ".doc", ".docx", ".txt", ".md"];

impl ResourceType {
  /// Guess the type from the URL. Anything unrecognized is a web page.
  pub fn detect(url: &str) -> Self {
    let lower = url.to_lowercase();
    if lower.contains("youtube.com") || lower.contains("youtu.be") {
      ResourceType::Youtube
    } else if IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext)) {
      ResourceType::Image
    } else if DOCUMENT_EXTENSIONS.iter().any(|ext| lower.contains(ext)) {
      ResourceType::Document
    } else {
      ResourceType::Webpage
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceType::Youtube => "youtube",
      ResourceType::Webpage => "webpage",
      ResourceType::Document => "document",
      ResourceType::Image => "image",
    }
  }
}

/// Video id after any of the `youtube.com` / `youtu.be` URL shapes.
const YOUTUBE_ID_PATTERN: &str =
  r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#;

static YOUTUBE_ID: OnceLock<Option<Regex>> = OnceLock::new();

/// Convert a regular YouTube URL into its embeddable form.
pub fn youtube_embed_url(url: &str) -> Option<String> {
  let re = YOUTUBE_ID.get_or_init(|| Regex::new(YOUTUBE_ID_PATTERN).ok()).as_ref()?;
  let id = re.captures(url)?.get(1)?.as_str();
  Some(format!("https://www.youtube.com/embed/{}", id))
}

/// Per-resource learning status. `Reference` means "not meant to be learned".
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningStatus {
  #[default]
  Reference,
  Todo,
  Inprogress,
  Done,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
  pub id: String,
  pub study_stack_id: String,
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub resource_type: ResourceType,
  #[serde(default)]
  pub status: LearningStatus,
  pub resource_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub embed_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub question: String,
  /// Always exactly four options.
  pub options: Vec<String>,
  /// Index (0-3) of the correct option.
  pub correct_answer: u8,
  pub explanation: String,
  pub difficulty: Difficulty,
}

/// Flat status label, as exposed over the API.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
  Generating,
  Ready,
  Failed,
}

impl std::fmt::Display for QuizStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      QuizStatus::Generating => "generating",
      QuizStatus::Ready => "ready",
      QuizStatus::Failed => "failed",
    })
  }
}

/// Generation state of a quiz. Questions only exist in `Ready`, so a generating
/// or failed quiz cannot carry a partial question set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QuizState {
  Generating,
  Ready {
    questions: Vec<QuizQuestion>,
    #[serde(rename = "generatedAt")]
    generated_at: DateTime<Utc>,
  },
  Failed,
}

impl QuizState {
  pub fn status(&self) -> QuizStatus {
    match self {
      QuizState::Generating => QuizStatus::Generating,
      QuizState::Ready { .. } => QuizStatus::Ready,
      QuizState::Failed => QuizStatus::Failed,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
  pub id: String,
  pub study_stack_id: String,
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Source resources, validated against the stack at creation time only.
  pub resource_ids: Vec<String>,
  pub number_of_questions: u32,
  #[serde(rename = "useHOTS")]
  pub use_hots: bool,
  #[serde(flatten)]
  pub state: QuizState,
  pub owner_id: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Quiz {
  pub fn status(&self) -> QuizStatus {
    self.state.status()
  }

  pub fn questions(&self) -> &[QuizQuestion] {
    match &self.state {
      QuizState::Ready { questions, .. } => questions,
      _ => &[],
    }
  }

  pub fn generated_at(&self) -> Option<DateTime<Utc>> {
    match &self.state {
      QuizState::Ready { generated_at, .. } => Some(*generated_at),
      _ => None,
    }
  }

  /// `generating -> ready`. Refused from a terminal state or with no questions.
  pub fn mark_ready(&mut self, questions: Vec<QuizQuestion>, now: DateTime<Utc>) -> bool {
    if self.state != QuizState::Generating || questions.is_empty() {
      return false;
    }
    self.state = QuizState::Ready { questions, generated_at: now };
    self.updated_at = now;
    true
  }

  /// `generating -> failed`. Refused from a terminal state.
  pub fn mark_failed(&mut self, now: DateTime<Utc>) -> bool {
    if self.state != QuizState::Generating {
      return false;
    }
    self.state = QuizState::Failed;
    self.updated_at = now;
    true
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
  pub question_index: u32,
  pub selected_answer: u8,
  pub is_correct: bool,
  /// Seconds.
  #[serde(default)]
  pub time_spent: f64,
}

/// One user's scored submission. Immutable once stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
  pub id: String,
  pub quiz_id: String,
  pub user_id: String,
  pub answers: Vec<UserAnswer>,
  /// Percentage 0-100.
  pub score: u32,
  pub total_questions: u32,
  pub correct_answers: u32,
  /// Total seconds.
  pub time_spent: f64,
  pub completed_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question() -> QuizQuestion {
    QuizQuestion {
      question: "What is ownership?".into(),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      correct_answer: 1,
      explanation: "b".into(),
      difficulty: Difficulty::Medium,
    }
  }

  fn generating_quiz() -> Quiz {
    let now = Utc::now();
    Quiz {
      id: "q1".into(),
      study_stack_id: "s1".into(),
      title: "Rust basics".into(),
      description: None,
      resource_ids: vec!["r1".into()],
      number_of_questions: 1,
      use_hots: false,
      state: QuizState::Generating,
      owner_id: "u1".into(),
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn detect_resource_type_by_url() {
    assert_eq!(ResourceType::detect("https://www.youtube.com/watch?v=abc"), ResourceType::Youtube);
    assert_eq!(ResourceType::detect("https://youtu.be/abc"), ResourceType::Youtube);
    assert_eq!(ResourceType::detect("https://cdn.example.com/diagram.PNG"), ResourceType::Image);
    assert_eq!(ResourceType::detect("https://example.com/notes.pdf"), ResourceType::Document);
    assert_eq!(ResourceType::detect("https://doc.rust-lang.org/book/"), ResourceType::Webpage);
  }

  #[test]
  fn youtube_embed_url_handles_common_shapes() {
    let want = Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string());
    assert_eq!(youtube_embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), want);
    assert_eq!(youtube_embed_url("https://youtu.be/dQw4w9WgXcQ?t=42"), want);
    assert_eq!(youtube_embed_url("https://www.youtube.com/watch?list=x&v=dQw4w9WgXcQ"), want);
    assert_eq!(youtube_embed_url("https://www.youtube.com/embed/dQw4w9WgXcQ"), want);
    assert_eq!(youtube_embed_url("https://www.youtube.com/v/dQw4w9WgXcQ"), want);
    assert_eq!(youtube_embed_url("https://www.youtube.com/watch?v=aaaaaaaaaaa&v=dQw4w9WgXcQ"), want);
    assert_eq!(youtube_embed_url("https://www.youtube.com/user/SomeUser/u/1/dQw4w9WgXcQ"), want);
    assert_eq!(youtube_embed_url("https://www.youtube.com/channel/short"), None);
    assert_eq!(youtube_embed_url("https://example.com/video"), None);
  }

  #[test]
  fn quiz_reaches_a_terminal_state_exactly_once() {
    let mut quiz = generating_quiz();
    assert!(quiz.questions().is_empty());
    assert!(quiz.mark_ready(vec![question()], Utc::now()));
    assert_eq!(quiz.status(), QuizStatus::Ready);
    assert!(quiz.generated_at().is_some());

    assert!(!quiz.mark_failed(Utc::now()));
    assert!(!quiz.mark_ready(vec![question(), question()], Utc::now()));
    assert_eq!(quiz.questions().len(), 1);
  }

  #[test]
  fn failed_quiz_stays_failed_and_empty() {
    let mut quiz = generating_quiz();
    assert!(quiz.mark_failed(Utc::now()));
    assert!(!quiz.mark_ready(vec![question()], Utc::now()));
    assert_eq!(quiz.status(), QuizStatus::Failed);
    assert!(quiz.questions().is_empty());
  }

  #[test]
  fn ready_requires_questions() {
    let mut quiz = generating_quiz();
    assert!(!quiz.mark_ready(vec![], Utc::now()));
    assert_eq!(quiz.status(), QuizStatus::Generating);
  }

  #[test]
  fn quiz_state_flattens_into_status_field() {
    let mut quiz = generating_quiz();
    quiz.mark_ready(vec![question()], Utc::now());
    let v = serde_json::to_value(&quiz).unwrap();
    assert_eq!(v["status"], "ready");
    assert_eq!(v["useHOTS"], false);
    assert_eq!(v["questions"][0]["correctAnswer"], 1);
    assert!(v["generatedAt"].is_string());

    let back: Quiz = serde_json::from_value(v).unwrap();
    assert_eq!(back, quiz);
  }
}
