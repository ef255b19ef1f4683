//! Segmentation of aligned queries into bounded utterances.
//!
//! `splitter` proposes non-overlapping segments for one aligned query,
//! cutting at silence gaps and filtering on duration and error rate;
//! `driver` fans the per-query work out over the split executor with
//! tagged (not positional) result aggregation.

pub mod driver;
pub mod splitter;

pub use driver::split_aligned_queries;
pub use splitter::{Segment, split_aligned_query};
