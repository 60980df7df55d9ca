use std::sync::Arc;

use crate::config::Config;
use crate::cv::CvStore;
use crate::llm_client::ChatCompletions;

/// Shared application state handed to both transports.
#[derive(Clone)]
pub struct AppState {
    /// Load-once CV document store.
    pub cv: Arc<CvStore>,
    /// Chat-completion backend. Production: `OpenAiClient`; tests: stubs.
    pub llm: Arc<dyn ChatCompletions>,
    pub config: Config,
}
