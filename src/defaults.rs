//! Default configuration constants for bookalign.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

/// Default number of cuts processed per batch.
///
/// Batches are strictly sequential; within a batch, alignment and splitting
/// fan out per supervision, so larger batches amortize book loading at the
/// cost of memory.
pub const BATCH_SIZE: usize = 50;

/// Whether reference books are indexed as raw bytes.
///
/// `false` indexes Unicode codepoints, which is correct for any UTF-8 book.
/// Set to `true` only for ASCII-clean corpora where byte indexing is cheaper.
pub const USE_UTF8: bool = false;

/// Whether supervision symbols are BPE pieces.
///
/// BPE recognizers emit pieces like `▁THE`; the word-boundary marker is
/// rewritten to a space before the piece is expanded to tokens.
pub const IS_BPE: bool = true;

/// Whether tokens are uppercased before matching.
///
/// Uppercasing both queries and references makes matching case-insensitive
/// while byte provenance still points at the original book text.
pub const USE_UPPERCASE: bool = true;

/// Whether reference books carry punctuation.
///
/// When `true`, punctuation tokens are stripped from the reference side
/// before matching. Queries are assumed punctuation-free already.
pub const HAS_PUNCTUATION: bool = true;

/// Default number of candidate reference regions examined per query.
pub const NUM_CLOSE_MATCHES: usize = 2;

/// Default reference scan granularity in tokens.
///
/// The reference side is scanned in windows of this many tokens when
/// scoring candidate regions for a query.
pub const SEGMENT_LENGTH: usize = 5000;

/// Default tolerance on reference/query length ratio.
///
/// A matched reference region may be up to this fraction longer or shorter
/// than the query before alignment is attempted.
pub const REFERENCE_LENGTH_DIFFERENCE: f64 = 0.1;

/// Default minimum fraction of query tokens that must match.
///
/// Alignments matching fewer query tokens than this ratio are rejected and
/// the query contributes nothing to the batch.
pub const MIN_MATCHED_QUERY_RATIO: f64 = 0.33;

/// Default length of reference context kept around a cut, in characters.
pub const PRECEDING_CONTEXT_LENGTH: usize = 1000;

/// Default minimum silence gap (seconds) accepted as a break point.
///
/// 0.45s sits above typical inter-word gaps but below sentence pauses in
/// read speech, so cuts land between sentences or clauses.
pub const SILENCE_LENGTH_TO_BREAK: f64 = 0.45;

/// Default minimum duration (seconds) of an emitted segment.
pub const MIN_DURATION: f64 = 2.0;

/// Default maximum duration (seconds) of an emitted segment.
pub const MAX_DURATION: f64 = 30.0;

/// Default soft target duration range (seconds) for emitted segments.
///
/// Within [min, max], the splitter prefers the first break point that puts
/// the segment inside this range.
pub const EXPECTED_DURATION: (f64, f64) = (5.0, 20.0);

/// Default maximum tolerable alignment error rate per segment.
///
/// Error rate is (substitutions + insertions + deletions) / aligned length.
pub const MAX_ERROR_RATE: f64 = 0.20;
