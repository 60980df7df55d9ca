use thiserror::Error;

/// Application-level error type for the tool surface.
///
/// Every variant's display string is the exact human-readable message a
/// caller sees: `mcp::server` forwards it inside a flagged tool result.
/// None of these are fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("CV file not found: {0}")]
    CvNotFound(String),

    #[error("Could not extract text from CV: {0}")]
    CvUnreadable(String),

    #[error("No CV loaded. Provide a cv_path argument or place your CV PDF in the configured docs directory.")]
    CvNotLoaded,

    #[error("LLM error: {0}")]
    Llm(String),
}
