//! End-of-run labeling of the keywords created in this run.

use chrono::NaiveDate;
use tracing::warn;

use crate::ledger::RunContext;
use crate::traits::platform::LabelSink;
use crate::types::keyword::Label;

/// Description given to a newly created run label.
pub const RUN_LABEL_DESCRIPTION: &str = "Keywords added automatically by the search-term harvester.";

/// `Converted_YYYYMMDD` for the run date.
pub fn run_label_name(date: NaiveDate) -> String {
    format!("Converted_{}", date.format("%Y%m%d"))
}

/// Find the label by name, creating it when missing.
///
/// A failed create is not fatal by itself: another run on the same day may
/// have created the label in between, so the lookup is repeated.
async fn get_or_create_label<L: LabelSink + ?Sized>(
    labels: &L,
    ctx: &mut RunContext,
    name: &str,
) -> Option<Label> {
    match labels.find_label(name).await {
        Ok(Some(label)) => return Some(label),
        Ok(None) => {}
        Err(e) => {
            ctx.log(format!("ERROR: Could not look up label '{}': {}", name, e));
            return None;
        }
    }

    match labels.create_label(name, RUN_LABEL_DESCRIPTION).await {
        Ok(()) => ctx.log(format!("Created label '{}'.", name)),
        Err(e) => ctx.log(format!("Could not create label '{}': {}. Looking it up again.", name, e)),
    }

    match labels.find_label(name).await {
        Ok(Some(label)) => Some(label),
        Ok(None) => {
            warn!(label = %name, "Label missing after create");
            ctx.log(format!("ERROR: Label '{}' is still missing after creation. Skipping labeling.", name));
            None
        }
        Err(e) => {
            ctx.log(format!("ERROR: Could not look up label '{}': {}", name, e));
            None
        }
    }
}

/// Attach the run label to every keyword in `ctx.created`.
///
/// Returns the number of keywords labelled. Individual failures are logged
/// and do not stop the remaining assignments.
pub async fn apply_run_label<L: LabelSink + ?Sized>(labels: &L, ctx: &mut RunContext) -> usize {
    if ctx.created.is_empty() {
        ctx.log("No new keywords were created. Skipping labeling.");
        return 0;
    }

    let name = run_label_name(ctx.run_date);
    let Some(label) = get_or_create_label(labels, ctx, &name).await else {
        return 0;
    };

    ctx.log(format!(
        "Applying label '{}' to {} new keywords.",
        label.name,
        ctx.created.len()
    ));

    let created = std::mem::take(&mut ctx.created);
    let mut applied = 0;
    for record in &created {
        match labels.apply_label(record, &label).await {
            Ok(()) => applied += 1,
            Err(e) => ctx.log(format!(
                "ERROR: Could not label keyword {} in ad group {}: {}",
                record.text, record.ad_group_id.0, e
            )),
        }
    }
    ctx.created = created;
    applied
}
