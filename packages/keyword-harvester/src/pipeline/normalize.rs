//! Term normalization: trim, reject blanks, drop repeats within a run.

use crate::ledger::RunContext;
use crate::types::term::SearchTerm;

/// Clean a raw search term. Returns `None` (and logs why) when the term
/// is blank or was already taken through the pipeline in this run.
pub fn normalize_term(ctx: &mut RunContext, raw: &str) -> Option<SearchTerm> {
    let Some(term) = SearchTerm::new(raw) else {
        ctx.log("Skipping empty search term.");
        return None;
    };

    if !ctx.seen_terms.insert(term.normalized().to_string()) {
        ctx.log(format!(
            "Search term \"{}\" was already processed in this run. Skipping.",
            term
        ));
        return None;
    }

    Some(term)
}
