//! Composite offset-addressable text over a batch of documents.

use std::ops::Range;
use std::sync::Arc;

use crate::text::document::{Document, Token};

/// All documents of one batch concatenated into a single token index space.
///
/// `doc_splits` partitions the global index range per document, in the fixed
/// order [all query documents][all reference documents]. `pos` stores, for
/// every global index, the token's pre-filter index within its owning
/// document, so a filtered text still maps back to original byte offsets.
#[derive(Debug, Clone)]
pub struct SourcedText {
    tokens: Vec<Token>,
    pos: Vec<usize>,
    doc_splits: Vec<usize>,
    documents: Vec<Arc<Document>>,
}

impl SourcedText {
    /// Concatenate documents in order.
    pub fn from_documents(documents: Vec<Arc<Document>>) -> Self {
        let total: usize = documents.iter().map(|d| d.len()).sum();
        let mut tokens = Vec::with_capacity(total);
        let mut pos = Vec::with_capacity(total);
        let mut doc_splits = Vec::with_capacity(documents.len() + 1);

        doc_splits.push(0);
        for doc in &documents {
            tokens.extend_from_slice(doc.tokens());
            pos.extend(0..doc.len());
            doc_splits.push(tokens.len());
        }

        Self {
            tokens,
            pos,
            doc_splits,
            documents,
        }
    }

    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Global token index where document `n` starts.
    ///
    /// `boundary(n)` for n == num_documents is the total token count.
    pub fn boundary(&self, n: usize) -> usize {
        self.doc_splits[n]
    }

    pub fn doc_splits(&self) -> &[usize] {
        &self.doc_splits
    }

    pub fn document(&self, index: usize) -> &Document {
        &self.documents[index]
    }

    /// Global index range covered by document `index`.
    pub fn doc_range(&self, index: usize) -> Range<usize> {
        self.doc_splits[index]..self.doc_splits[index + 1]
    }

    /// Tokens of document `index`.
    pub fn doc_tokens(&self, index: usize) -> &[Token] {
        &self.tokens[self.doc_range(index)]
    }

    pub fn token(&self, global: usize) -> Token {
        self.tokens[global]
    }

    /// Pre-filter token index within the owning document.
    pub fn pos(&self, global: usize) -> usize {
        self.pos[global]
    }

    /// Document owning the token at `global`.
    pub fn doc_of(&self, global: usize) -> usize {
        debug_assert!(global < self.len());
        self.doc_splits.partition_point(|&s| s <= global) - 1
    }

    /// Drop tokens failing `keep` from documents `first_doc..`.
    ///
    /// Earlier documents pass through untouched. The returned text keeps the
    /// original `pos` values, so filtered tokens stay addressable in their
    /// source documents.
    pub fn filter_from(&self, first_doc: usize, keep: impl Fn(Token) -> bool) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len());
        let mut pos = Vec::with_capacity(self.pos.len());
        let mut doc_splits = Vec::with_capacity(self.doc_splits.len());

        doc_splits.push(0);
        for d in 0..self.num_documents() {
            for global in self.doc_range(d) {
                if d < first_doc || keep(self.tokens[global]) {
                    tokens.push(self.tokens[global]);
                    pos.push(self.pos[global]);
                }
            }
            doc_splits.push(tokens.len());
        }

        Self {
            tokens,
            pos,
            doc_splits,
            documents: self.documents.clone(),
        }
    }
}
