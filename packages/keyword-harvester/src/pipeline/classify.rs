//! Language classification through the oracle.

use crate::config::HarvestConfig;
use crate::ledger::RunContext;
use crate::pipeline::prompts::{format_classify_prompt, CLASSIFY_SYSTEM_PROMPT};
use crate::traits::oracle::{Oracle, OracleOutcome, OracleRequest, OracleTask};
use crate::types::{language::Language, term::SearchTerm};

/// Build the classification request for a term.
pub fn classify_request(config: &HarvestConfig, term: &SearchTerm) -> OracleRequest {
    OracleRequest {
        task: OracleTask::ClassifyLanguage,
        model: config.model.clone(),
        system: CLASSIFY_SYSTEM_PROMPT.to_string(),
        user: format_classify_prompt(term),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
    }
}

/// Ask the oracle and tag the answer. Only the closed vocabulary is a success.
pub async fn classify_outcome<O: Oracle + ?Sized>(
    oracle: &O,
    config: &HarvestConfig,
    term: &SearchTerm,
) -> OracleOutcome<Language> {
    let response = oracle.complete(&classify_request(config, term)).await;
    OracleOutcome::from_response(response, Language::parse)
}

/// Classify a term. Any failure or out-of-vocabulary answer yields
/// [`Language::Other`]; the call is never retried.
pub async fn classify_language<O: Oracle + ?Sized>(
    oracle: &O,
    config: &HarvestConfig,
    ctx: &mut RunContext,
    term: &SearchTerm,
) -> Language {
    let language = match classify_outcome(oracle, config, term).await {
        OracleOutcome::Success(language) => language,
        OracleOutcome::Invalid(raw) => {
            ctx.log(format!(
                "Language classifier returned an unexpected answer for \"{}\": \"{}\". Defaulting to 'other'.",
                term,
                raw.trim()
            ));
            Language::Other
        }
        OracleOutcome::Unavailable(reason) => {
            ctx.log(format!(
                "ERROR: Language classifier unavailable for \"{}\": {}. Defaulting to 'other'.",
                term, reason
            ));
            Language::Other
        }
    };

    ctx.log(format!(
        "Search term: \"{}\" was identified as language: {}",
        term, language
    ));
    language
}
