//! Study Stacks Backend
//!
//! - Axum HTTP API for study stacks, their resources, quizzes and attempts
//! - Quiz questions generated in the background (OpenAI or offline templates)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   OPENAI_API_KEY       : enables OpenAI integration if present
//!   OPENAI_BASE_URL      : default "https://api.openai.com/v1"
//!   OPENAI_QUIZ_MODEL    : default "gpt-4o-mini"
//!   OPENAI_TIMEOUT_SECS  : upstream request timeout, default 60
//!   STACKS_CONFIG_PATH   : path to TOML config (prompts + generation settings)
//!   STACKS_DATA_PATH     : JSON snapshot file; unset keeps records in memory only
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod error;
mod auth;
mod store;
mod prompt;
mod generator;
mod openai;
mod state;
mod protocol;
mod stacks;
mod resources;
mod quizzes;
mod attempts;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (store, generator, prompts).
  let state = AppState::from_env().await?;

  // Nothing is left to finish quizzes a previous process was generating.
  quizzes::fail_interrupted(&state).await;

  let app = build_router(Arc::new(state));

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "stacks_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
