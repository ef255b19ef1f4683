//! Pipeline controller: sequential batches over long-lived pools.

use log::{debug, info, warn};

use crate::align::driver::align_queries;
use crate::config::Config;
use crate::error::Result;
use crate::executor::Executor;
use crate::manifest::cut::Cut;
use crate::manifest::writer::CutSetWriter;
use crate::pipeline::batch::load_batch;
use crate::pipeline::writer::write_batch;
use crate::split::driver::split_aligned_queries;

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cuts_read: usize,
    pub batches_processed: usize,
    pub segments_written: usize,
}

/// Owns the two worker pools and drives batches through the four stages.
///
/// Batches never overlap: batch N+1 starts only after batch N's records are
/// flushed. Both pools are created once here and reused for the whole run.
pub struct PipelineController {
    config: Config,
    align_pool: Executor,
    split_pool: Executor,
}

impl PipelineController {
    /// Validate the configuration and bring up the worker pools.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let align_pool = Executor::new(config.executor.align_threads)?;
        let split_pool = Executor::new(config.executor.split_threads)?;
        Ok(Self {
            config,
            align_pool,
            split_pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the cut stream in order, processing full batches as they
    /// fill and the final partial batch at the end.
    pub fn run(
        &self,
        cuts: impl IntoIterator<Item = Result<Cut>>,
        writer: &mut CutSetWriter,
    ) -> Result<RunSummary> {
        let mut batch: Vec<Cut> = Vec::with_capacity(self.config.batch_size);
        let mut summary = RunSummary::default();

        for cut in cuts {
            batch.push(cut?);
            summary.cuts_read += 1;
            if batch.len() == self.config.batch_size {
                summary.segments_written += self.process_batch(&batch, writer)?;
                summary.batches_processed += 1;
                info!("{} cuts processed so far", summary.cuts_read);
                batch.clear();
            }
        }
        if !batch.is_empty() {
            summary.segments_written += self.process_batch(&batch, writer)?;
            summary.batches_processed += 1;
        }

        info!(
            "run complete: {} cuts in, {} segments out over {} batches",
            summary.cuts_read, summary.segments_written, summary.batches_processed
        );
        Ok(summary)
    }

    /// Drive one batch through load → align → split → write.
    ///
    /// Each stage short-circuits the batch with a warning when it produces
    /// nothing; only an invariant violation is an error.
    fn process_batch(&self, cuts: &[Cut], writer: &mut CutSetWriter) -> Result<usize> {
        debug!("loading batch of {} cuts", cuts.len());
        let Some(batch) = load_batch(cuts, &self.config.text)? else {
            warn!("batch produced no usable query documents");
            return Ok(0);
        };

        let alignments = align_queries(
            &batch.sourced_text,
            batch.cut_indexes.len(),
            &self.config.align,
            &self.align_pool,
        );
        if alignments.iter().all(Option::is_none) {
            warn!("batch produced no alignments");
            return Ok(0);
        }

        let results = split_aligned_queries(
            &batch.sourced_text,
            &alignments,
            &batch.cut_indexes,
            &self.config.split,
            &self.split_pool,
        );
        if results.is_empty() {
            warn!("batch produced no segments");
            return Ok(0);
        }

        write_batch(cuts, &results, writer)
    }
}
