//! Batch assembly: cuts and books into one sourced text.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;

use crate::config::TextConfig;
use crate::error::{BookalignError, Result};
use crate::manifest::Cut;
use crate::text::{Document, SourcedText, is_punctuation};

/// Correlates a query document back to its originating cut and supervision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutIndex {
    pub cut: usize,
    pub supervision: usize,
}

/// One batch's indexed text space, ready for alignment.
///
/// `cut_indexes` is parallel to the query documents of `sourced_text`:
/// entry i tags query document i.
#[derive(Debug)]
pub struct LoadedBatch {
    pub num_query_tokens: usize,
    pub cut_indexes: Vec<CutIndex>,
    pub sourced_text: SourcedText,
}

/// Build the indexed text space for one batch of cuts.
///
/// Cuts with a missing or unreadable reference book are skipped with a
/// warning; supervisions with empty symbol alignments are skipped silently.
/// Each unique book is loaded and tokenized exactly once however many cuts
/// cite it. Returns `Ok(None)` when no usable query documents remain, which
/// short-circuits the batch.
///
/// The token-count postcondition is checked against the boundary table; a
/// mismatch is a construction bug and fails the whole batch.
pub fn load_batch(cuts: &[Cut], config: &TextConfig) -> Result<Option<LoadedBatch>> {
    load_batch_with(cuts, config, &mut |path| std::fs::read_to_string(path))
}

/// [`load_batch`] with an injectable book loader, for tests and callers
/// that cache book contents themselves.
pub fn load_batch_with(
    cuts: &[Cut],
    config: &TextConfig,
    load_book: &mut dyn FnMut(&Path) -> std::io::Result<String>,
) -> Result<Option<LoadedBatch>> {
    // Unique book paths in first-appearance order, loaded exactly once.
    let mut book_paths: Vec<PathBuf> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    for cut in cuts {
        if let Some(path) = cut.text_path()
            && seen.insert(path.clone())
        {
            book_paths.push(path.clone());
        }
    }

    let mut books: HashMap<PathBuf, String> = HashMap::new();
    for path in &book_paths {
        match load_book(path) {
            Ok(text) => {
                books.insert(path.clone(), text);
            }
            Err(e) => {
                warn!(
                    "{}",
                    BookalignError::BookRead {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    }
                );
            }
        }
    }

    let mut query_docs: Vec<Arc<Document>> = Vec::new();
    let mut cut_indexes: Vec<CutIndex> = Vec::new();
    let mut num_query_tokens = 0usize;

    for (cut_idx, cut) in cuts.iter().enumerate() {
        let Some(path) = cut.text_path() else {
            warn!("skipping cut {}: no reference book path", cut.id);
            continue;
        };
        if !books.contains_key(path) {
            warn!("skipping cut {}: missing reference book", cut.id);
            continue;
        }
        for (sup_idx, supervision) in cut.supervisions.iter().enumerate() {
            let symbols: Vec<(String, f64)> = supervision
                .alignment
                .as_ref()
                .map(|a| {
                    a.symbol
                        .iter()
                        .map(|s| (s.symbol.clone(), s.start))
                        .collect()
                })
                .unwrap_or_default();
            if symbols.is_empty() {
                continue;
            }
            let doc = Document::from_symbols(&supervision.id, &symbols, config);
            if doc.is_empty() {
                continue;
            }
            num_query_tokens += doc.len();
            query_docs.push(Arc::new(doc));
            cut_indexes.push(CutIndex {
                cut: cut_idx,
                supervision: sup_idx,
            });
        }
    }

    if query_docs.is_empty() {
        return Ok(None);
    }

    let num_queries = query_docs.len();
    let mut documents = query_docs;
    for path in &book_paths {
        if let Some(text) = books.remove(path) {
            documents.push(Arc::new(Document::from_book(
                &path.display().to_string(),
                text,
                config,
            )));
        }
    }

    let sourced = SourcedText::from_documents(documents);
    let sourced_text = if config.has_punctuation {
        sourced.filter_from(num_queries, |t| !is_punctuation(t))
    } else {
        sourced
    };

    // Hard invariant: the boundary table must account for every query token.
    let boundary = sourced_text.boundary(num_queries);
    if boundary != num_query_tokens {
        return Err(BookalignError::TokenCountMismatch {
            expected: num_query_tokens,
            actual: boundary,
        });
    }

    Ok(Some(LoadedBatch {
        num_query_tokens,
        cut_indexes,
        sourced_text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::cut::{AlignedSymbol, Recording, SymbolAlignment};
    use crate::manifest::{CutCustom, Supervision};
    use serde_json::Map;

    fn text_config() -> TextConfig {
        TextConfig {
            use_utf8: false,
            is_bpe: true,
            use_uppercase: true,
            has_punctuation: true,
        }
    }

    fn supervision(id: &str, symbols: &[(&str, f64)]) -> Supervision {
        Supervision {
            id: id.to_string(),
            recording_id: None,
            start: 0.0,
            duration: 10.0,
            channel: 0,
            text: None,
            language: Some("English".to_string()),
            speaker: Some("spk".to_string()),
            alignment: Some(SymbolAlignment {
                symbol: symbols
                    .iter()
                    .map(|(s, t)| AlignedSymbol {
                        symbol: s.to_string(),
                        start: *t,
                        duration: None,
                    })
                    .collect(),
            }),
            custom: None,
            extra: Map::new(),
        }
    }

    fn cut(id: &str, book: &str, supervisions: Vec<Supervision>) -> Cut {
        Cut {
            id: id.to_string(),
            start: 0.0,
            duration: 10.0,
            channel: 0,
            supervisions,
            recording: Recording {
                id: format!("rec-{id}"),
                extra: Map::new(),
            },
            custom: Some(CutCustom {
                text_path: Some(PathBuf::from(book)),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    fn loader(books: &[(&str, &str)]) -> impl FnMut(&Path) -> std::io::Result<String> {
        let books: HashMap<PathBuf, String> = books
            .iter()
            .map(|(p, t)| (PathBuf::from(p), t.to_string()))
            .collect();
        move |path: &Path| {
            books.get(path).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such book")
            })
        }
    }

    #[test]
    fn test_shared_book_loaded_once() {
        let cuts = vec![
            cut("a", "/books/b1.txt", vec![supervision("a-0", &[("▁HI", 0.0)])]),
            cut("b", "/books/b1.txt", vec![supervision("b-0", &[("▁HO", 0.0)])]),
        ];
        let mut load_count = 0;
        let mut base = loader(&[("/books/b1.txt", "HI HO")]);
        let mut counting = |path: &Path| {
            load_count += 1;
            base(path)
        };
        let batch = load_batch_with(&cuts, &text_config(), &mut counting)
            .unwrap()
            .unwrap();
        assert_eq!(load_count, 1);
        // Two query docs, one reference doc
        assert_eq!(batch.cut_indexes.len(), 2);
        assert_eq!(batch.sourced_text.num_documents(), 3);
    }

    #[test]
    fn test_missing_book_skips_cut() {
        let cuts = vec![
            cut("a", "/books/gone.txt", vec![supervision("a-0", &[("▁HI", 0.0)])]),
            cut("b", "/books/b1.txt", vec![supervision("b-0", &[("▁HO", 0.0)])]),
        ];
        let batch = load_batch_with(
            &cuts,
            &text_config(),
            &mut loader(&[("/books/b1.txt", "HO HO")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(batch.cut_indexes.len(), 1);
        assert_eq!(batch.cut_indexes[0], CutIndex { cut: 1, supervision: 0 });
    }

    #[test]
    fn test_empty_alignment_skips_supervision() {
        let cuts = vec![cut(
            "a",
            "/books/b1.txt",
            vec![
                supervision("a-0", &[]),
                supervision("a-1", &[("▁OK", 0.0)]),
            ],
        )];
        let batch = load_batch_with(
            &cuts,
            &text_config(),
            &mut loader(&[("/books/b1.txt", "OK THEN")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(batch.cut_indexes.len(), 1);
        assert_eq!(batch.cut_indexes[0].supervision, 1);
    }

    #[test]
    fn test_all_unusable_returns_none() {
        let cuts = vec![cut("a", "/books/gone.txt", vec![supervision("a-0", &[("▁X", 0.0)])])];
        let batch = load_batch_with(&cuts, &text_config(), &mut loader(&[])).unwrap();
        assert!(batch.is_none());
    }

    #[test]
    fn test_token_count_invariant_holds() {
        let cuts = vec![cut(
            "a",
            "/books/b1.txt",
            vec![supervision("a-0", &[("▁HELLO", 0.0), ("▁WORLD", 0.5)])],
        )];
        let batch = load_batch_with(
            &cuts,
            &text_config(),
            &mut loader(&[("/books/b1.txt", "Say: hello, world!")]),
        )
        .unwrap()
        .unwrap();
        // "HELLO WORLD" = 11 tokens; boundary table must agree.
        assert_eq!(batch.num_query_tokens, 11);
        assert_eq!(batch.sourced_text.boundary(1), 11);
    }

    #[test]
    fn test_punctuation_stripped_from_reference_only() {
        let cuts = vec![cut(
            "a",
            "/books/b1.txt",
            vec![supervision("a-0", &[("▁A", 0.0)])],
        )];
        let batch = load_batch_with(
            &cuts,
            &text_config(),
            &mut loader(&[("/books/b1.txt", "a.b")]),
        )
        .unwrap()
        .unwrap();
        let text = &batch.sourced_text;
        // Reference "a.b" keeps 2 tokens after the filter.
        let ref_tokens = text.doc_tokens(1);
        assert_eq!(ref_tokens, &['A' as u32, 'B' as u32]);
        // Projection still reaches the original offsets.
        assert_eq!(text.pos(text.boundary(1) + 1), 2);
    }

    #[test]
    fn test_book_order_deterministic() {
        let cuts = vec![
            cut("a", "/books/z.txt", vec![supervision("a-0", &[("▁A", 0.0)])]),
            cut("b", "/books/a.txt", vec![supervision("b-0", &[("▁B", 0.0)])]),
        ];
        let batch = load_batch_with(
            &cuts,
            &text_config(),
            &mut loader(&[("/books/z.txt", "A"), ("/books/a.txt", "B")]),
        )
        .unwrap()
        .unwrap();
        // Books appear in first-citation order, not path order.
        assert_eq!(batch.sourced_text.document(2).name(), "/books/z.txt");
        assert_eq!(batch.sourced_text.document(3).name(), "/books/a.txt");
    }
}
