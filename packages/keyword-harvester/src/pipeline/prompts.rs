//! Oracle prompts.

use crate::types::term::SearchTerm;

/// System prompt for language classification.
pub const CLASSIFY_SYSTEM_PROMPT: &str =
    "You are a language detection assistant. You only return the language code for a given search term.";

/// System prompt for ad group matching.
pub const MATCH_SYSTEM_PROMPT: &str = "You are a semantic matching assistant. Your task is to match a user's search term to the most relevant ad group from a provided list.";

/// User prompt asking for one code from the closed vocabulary.
pub fn format_classify_prompt(term: &SearchTerm) -> String {
    format!(
        "Please determine the language of the following search term. \
         Classify it as one of the following: fr, it, es, de, zh, or other. \
         Return only the two-letter code or 'other'.\nSearch Term: \"{}\"",
        term.text()
    )
}

/// User prompt listing candidate names and asking for the best one verbatim.
pub fn format_match_prompt(term: &SearchTerm, candidate_names: &[String]) -> String {
    format!(
        "From the following list of ad group names: [{}].\n\
         Which ad group name is the best semantic match for the search term: \"{}\"?\n\
         Please return only the best matching ad group name from the list, exactly as it appears in the list.",
        candidate_names.join(", "),
        term.text()
    )
}
