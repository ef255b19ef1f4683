//! Indexed text space for batch matching.
//!
//! Queries (supervision transcripts) and references (books) are tokenized
//! into [`Document`]s, then concatenated into one offset-addressable
//! [`SourcedText`] per batch. Every token keeps a byte offset into its
//! original text, so segment provenance survives normalization and
//! punctuation filtering.

pub mod document;
pub mod sourced;

pub use document::{Document, Token, is_punctuation};
pub use sourced::SourcedText;
