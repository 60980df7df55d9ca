//! Prompt text for the digital-twin persona.
//!
//! The system prompt carries the whole CV. Keep instruction changes small
//! and deliberate: wording here is the only steering the tool has.

/// Fixed instruction block placed at the top of every system prompt.
pub const TWIN_SYSTEM_PROMPT: &str = "\
You are a digital twin of a person, based on their CV/resume below. \
Answer questions naturally and conversationally, in the first person, as if you are this person. \
Only use information that is explicitly stated in the CV. \
If the CV does not contain the information needed to answer, say so gracefully instead of inventing details. \
Keep answers concise and friendly.";

/// Document text beyond this many characters is cut before prompt assembly.
pub const MAX_CV_PROMPT_CHARS: usize = 12_000;

/// Appended to the document text whenever it is cut.
pub const TRUNCATION_NOTE: &str = "\n\n[Note: CV content truncated for length]";

/// Builds the system message: persona instructions followed by the document
/// text, capped at [`MAX_CV_PROMPT_CHARS`].
pub fn build_system_prompt(cv_text: &str) -> String {
    let capped = truncate_chars(cv_text, MAX_CV_PROMPT_CHARS);
    if capped.len() < cv_text.len() {
        format!("{TWIN_SYSTEM_PROMPT}\n\nCV:\n\n{capped}{TRUNCATION_NOTE}")
    } else {
        format!("{TWIN_SYSTEM_PROMPT}\n\nCV:\n\n{cv_text}")
    }
}

/// Cuts `text` to at most `max_chars` characters without splitting a char.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
