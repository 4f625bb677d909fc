//! Translation prompt assembly
//!
//! Pure function over the selection, the current page, and the page-text
//! cache. The context window is the current page plus its neighbors; pages
//! missing from the cache (extraction pending or failed) are silently
//! omitted.

use std::collections::HashMap;

/// Build the clipboard prompt for translating the current selection.
///
/// The prompt has four fixed parts: the instruction header, the labeled
/// context section, the labeled target section, and the closing
/// output-only instruction. The consumer is an LLM chat window, so the
/// labels are what lets it tell "reference" from "translate this."
pub fn build_prompt(
    selection: &str,
    current_page: usize,
    page_texts: &HashMap<usize, String>,
) -> String {
    let mut context = String::new();
    let first = current_page.saturating_sub(1).max(1);
    for page in first..=current_page + 1 {
        if let Some(text) = page_texts.get(&page) {
            context.push_str(&format!("[Page {}]\n{}\n\n", page, text));
        }
    }

    format!(
        "Please translate the following English text to Chinese.\n\
         Only translate the [SELECTED TEXT] portion, but use the surrounding context to ensure accurate translation.\n\
         \n\
         === CONTEXT (for reference only, do NOT translate) ===\n\
         {}\n\
         \n\
         === TEXT TO TRANSLATE ===\n\
         {}\n\
         \n\
         Please provide only the Chinese translation of the selected text above, nothing else.",
        context.trim(),
        selection
    )
}
