//! Fan-out/fan-in protocol for the alignment stage.

use log::{debug, warn};

use crate::align::matcher::{AlignmentResult, align_query};
use crate::config::AlignConfig;
use crate::executor::{Executor, TaskOutcome};
use crate::text::SourcedText;

/// Align every query document of a batch against its reference region.
///
/// Work fans out per query over `executor`; the returned vector has exactly
/// one slot per query document, in batch order, so downstream stages can zip
/// it positionally against the cut index list. Queries failing the match
/// ratio come back as `None` and are logged, not errored.
pub fn align_queries(
    sourced: &SourcedText,
    num_queries: usize,
    config: &AlignConfig,
    executor: &Executor,
) -> Vec<Option<AlignmentResult>> {
    debug!("aligning {num_queries} queries on {} threads", executor.threads());

    let outcomes = executor.map((0..num_queries).collect::<Vec<_>>(), |query_doc| {
        match align_query(sourced, query_doc, num_queries, config) {
            Some(result) => TaskOutcome::Ok(result),
            None => TaskOutcome::Skipped(format!(
                "query '{}' matched below ratio {}",
                sourced.document(query_doc).name(),
                config.min_matched_query_ratio
            )),
        }
    });

    let results: Vec<Option<AlignmentResult>> = outcomes
        .into_iter()
        .map(|outcome| {
            outcome.into_option(|message, failed| {
                if failed {
                    warn!("alignment task failed: {message}");
                } else {
                    debug!("alignment skipped: {message}");
                }
            })
        })
        .collect();

    let aligned = results.iter().filter(|r| r.is_some()).count();
    debug!("aligned {aligned}/{num_queries} queries");
    results
}
