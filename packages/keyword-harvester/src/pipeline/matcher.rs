//! Ad-group matching through the oracle.

use crate::config::HarvestConfig;
use crate::ledger::RunContext;
use crate::pipeline::prompts::{format_match_prompt, MATCH_SYSTEM_PROMPT};
use crate::traits::oracle::{Oracle, OracleOutcome, OracleRequest, OracleTask};
use crate::types::term::SearchTerm;

/// Build the matching request for a term and its candidate names.
pub fn match_request(config: &HarvestConfig, term: &SearchTerm, candidate_names: &[String]) -> OracleRequest {
    OracleRequest {
        task: OracleTask::MatchAdGroup,
        model: config.model.clone(),
        system: MATCH_SYSTEM_PROMPT.to_string(),
        user: format_match_prompt(term, candidate_names),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
    }
}

/// First candidate, in candidate order, that occurs inside the lowercased
/// response. Verbose answers wrapping the name in extra words still match.
///
/// When one name is a substring of another (`shoes` / `shoes - red`) the
/// earlier candidate wins even if the response names the longer one.
pub fn find_candidate<'a>(response: &str, candidate_names: &'a [String]) -> Option<&'a String> {
    let content = response.trim().to_lowercase();
    candidate_names
        .iter()
        .find(|name| !name.is_empty() && content.contains(name.to_lowercase().as_str()))
}

/// Pick one of `candidate_names` for the term.
///
/// Falls back to the first name when the oracle fails or its answer names
/// no candidate. `candidate_names` must not be empty.
pub async fn select_best_match<O: Oracle + ?Sized>(
    oracle: &O,
    config: &HarvestConfig,
    ctx: &mut RunContext,
    term: &SearchTerm,
    candidate_names: &[String],
) -> String {
    debug_assert!(!candidate_names.is_empty(), "matcher needs at least one candidate");
    let fallback = candidate_names.first().cloned().unwrap_or_default();

    let response = oracle
        .complete(&match_request(config, term, candidate_names))
        .await;
    let outcome = OracleOutcome::from_response(response, |raw| find_candidate(raw, candidate_names).cloned());

    match outcome {
        OracleOutcome::Success(name) => name,
        OracleOutcome::Invalid(raw) => {
            ctx.log(format!(
                "Ad group matcher returned no listed name for \"{}\" (\"{}\"). Defaulting to first option: {}",
                term,
                raw.trim(),
                fallback
            ));
            fallback
        }
        OracleOutcome::Unavailable(reason) => {
            ctx.log(format!(
                "ERROR: Ad group matcher unavailable for \"{}\": {}. Defaulting to first option: {}",
                term, reason, fallback
            ));
            fallback
        }
    }
}
