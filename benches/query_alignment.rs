//! Benchmark query alignment against a book-sized reference.

use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use bookalign::align::align_query;
use bookalign::config::{AlignConfig, TextConfig};
use bookalign::text::{Document, SourcedText};

const SENTENCES: &[&str] = &[
    "IT WAS A BRIGHT COLD DAY IN APRIL",
    "THE CLOCKS WERE STRIKING THIRTEEN",
    "HE MADE FOR THE STAIRS WITHOUT LOOKING BACK",
    "OUTSIDE THE WIND CARRIED DUST ALONG THE STREET",
    "NOTHING MOVED EXCEPT THE PAPERS ON THE DESK",
    "SHE TURNED THE PAGE AND KEPT READING ALOUD",
    "A LONG CORRIDOR STRETCHED PAST THE LANDING",
    "EVENING SETTLED OVER THE TOWN LIKE A BLANKET",
];

fn text_config() -> TextConfig {
    TextConfig {
        use_utf8: false,
        is_bpe: true,
        use_uppercase: true,
        has_punctuation: true,
    }
}

/// A synthetic book: the sentence set cycled to roughly `target_len` chars.
fn synthetic_book(target_len: usize) -> String {
    let mut book = String::with_capacity(target_len + 64);
    let mut i = 0;
    while book.len() < target_len {
        book.push_str(SENTENCES[i % SENTENCES.len()]);
        book.push_str(". ");
        i += 7; // co-prime stride so neighboring sentences vary
    }
    book
}

/// A query reading one passage of the book with a few recognition errors.
fn query_from(book: &str, start: usize, len: usize) -> Arc<Document> {
    let passage: String = book[start..start + len]
        .chars()
        .enumerate()
        .map(|(i, c)| if i % 97 == 13 { 'X' } else { c })
        .filter(|c| *c != '.')
        .collect();
    let symbols: Vec<(String, f64)> = passage
        .chars()
        .enumerate()
        .map(|(i, c)| (c.to_string(), i as f64 * 0.05))
        .collect();
    Arc::new(Document::from_symbols("query", &symbols, &text_config()))
}

fn bench_align_query(c: &mut Criterion) {
    let config = AlignConfig {
        num_close_matches: 2,
        segment_length: 5000,
        reference_length_difference: 0.1,
        min_matched_query_ratio: 0.33,
    };

    for book_len in [50_000usize, 200_000] {
        let book = synthetic_book(book_len);
        let query = query_from(&book, book_len / 3, 2000);
        let book_doc = Arc::new(Document::from_book("book", book, &text_config()));
        let sourced = SourcedText::from_documents(vec![query, book_doc]);

        c.bench_function(&format!("align_query/book_{book_len}"), |b| {
            b.iter(|| {
                let result = align_query(std::hint::black_box(&sourced), 0, 1, &config);
                assert!(result.is_some());
                result
            })
        });
    }
}

criterion_group!(benches, bench_align_query);
criterion_main!(benches);
