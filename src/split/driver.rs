//! Fan-out/fan-in protocol for the segmentation stage.

use log::{debug, warn};

use crate::align::matcher::AlignmentResult;
use crate::config::SplitConfig;
use crate::executor::{Executor, TaskOutcome};
use crate::split::splitter::{Segment, split_aligned_query};
use crate::text::SourcedText;

/// Split every aligned query of a batch into segments.
///
/// `alignments` and `tags` are zipped positionally (one slot per query
/// document, `None` for queries that failed alignment). Results come back
/// tagged rather than positional: each entry pairs a tag with that query's
/// segments, and queries yielding no valid segments are dropped. A worker
/// failing on one query is logged and treated as empty; it never aborts the
/// batch.
pub fn split_aligned_queries<T>(
    sourced: &SourcedText,
    alignments: &[Option<AlignmentResult>],
    tags: &[T],
    config: &SplitConfig,
    executor: &Executor,
) -> Vec<(T, Vec<Segment>)>
where
    T: Copy + Send + Sync,
{
    debug_assert_eq!(alignments.len(), tags.len());

    let work: Vec<(T, &AlignmentResult)> = alignments
        .iter()
        .zip(tags.iter())
        .filter_map(|(alignment, tag)| alignment.as_ref().map(|a| (*tag, a)))
        .collect();

    debug!(
        "splitting {} aligned queries on {} threads",
        work.len(),
        executor.threads()
    );

    let outcomes = executor.map(work, |(tag, alignment)| {
        match split_aligned_query(sourced, alignment, config) {
            Ok(segments) => TaskOutcome::Ok((tag, segments)),
            Err(e) => TaskOutcome::Failed(format!(
                "splitting query '{}': {e}",
                sourced.document(alignment.query_doc).name()
            )),
        }
    });

    let mut results = Vec::new();
    let mut total_segments = 0;
    for outcome in outcomes {
        if let Some((tag, segments)) = outcome.into_option(|message, _| {
            warn!("segmentation task failed: {message}");
        }) {
            if !segments.is_empty() {
                total_segments += segments.len();
                results.push((tag, segments));
            }
        }
    }

    debug!(
        "split produced {total_segments} segments from {} queries",
        results.len()
    );
    results
}
