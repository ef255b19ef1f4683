//! Batch pipeline: assemble, align, split, write.
//!
//! The controller drives strictly sequential batches; all parallelism lives
//! inside the alignment and segmentation stages, per document, on two
//! long-lived worker pools.

pub mod batch;
pub mod controller;
pub mod writer;

pub use batch::{CutIndex, LoadedBatch, load_batch};
pub use controller::{PipelineController, RunSummary};
pub use writer::write_batch;
