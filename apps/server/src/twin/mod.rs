//! The tool itself: answer a message as the person described by the loaded CV.

pub mod prompts;

use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::{ChatCompletions, ChatMessage};
use crate::state::AppState;

/// Full tool flow: resolve the CV (cached, supplied path, or discovery),
/// then answer the message as that CV's subject.
pub async fn chat_with_me(
    state: &AppState,
    message: &str,
    cv_path: Option<&str>,
) -> Result<String, AppError> {
    let document = state.cv.ensure_loaded(cv_path).await?;
    respond(state.llm.as_ref(), &document.text, message).await
}

/// Sends the fixed two-message conversation (system prompt with the CV
/// embedded, then the caller's message) and returns the reply verbatim.
pub async fn respond(
    llm: &dyn ChatCompletions,
    cv_text: &str,
    message: &str,
) -> Result<String, AppError> {
    let messages = [
        ChatMessage::system(prompts::build_system_prompt(cv_text)),
        ChatMessage::user(message),
    ];

    debug!("Invoking chat completion ({} char message)", message.len());

    llm.complete(&messages)
        .await
        .map_err(|error| AppError::Llm(error.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
