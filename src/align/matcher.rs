//! Approximate matching of one query against the batch references.
//!
//! Matching runs in two phases: a coarse scan locates candidate reference
//! regions by counting shared n-grams in windows of `segment_length` tokens,
//! then a banded Levenshtein alignment against each candidate produces a
//! token-level trace. The best trace wins if it matches at least
//! `min_matched_query_ratio` of the query.

use std::collections::HashSet;

use crate::config::AlignConfig;
use crate::text::{SourcedText, Token};

/// Anchor n-gram length for the coarse candidate scan.
const NGRAM: usize = 8;

/// Hard cap on the alignment band radius.
///
/// A true alignment path never deviates from the proportional diagonal by
/// more than the edit count; paths needing more than this lose matches and
/// fall below the accept ratio anyway.
const MAX_BAND_RADIUS: usize = 2048;

/// How one trace step relates the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Tokens equal.
    Match,
    /// Both sides consumed, tokens differ.
    Substitute,
    /// Hypothesis token with no reference counterpart.
    Insert,
    /// Reference token skipped by the hypothesis.
    Delete,
}

/// One step of an alignment trace.
///
/// Positions are local token indices: `ref_pos` within the (filtered)
/// reference document, `hyp_pos` within the query document. On `Insert`
/// the reference token is absent; on `Delete` the hypothesis token is.
#[derive(Debug, Clone)]
pub struct AlignmentItem {
    pub kind: MatchKind,
    pub ref_pos: usize,
    pub hyp_pos: usize,
    pub ref_token: Option<Token>,
    pub hyp_token: Option<Token>,
    pub hyp_time: Option<f64>,
}

/// A query aligned to a contiguous region of one reference document.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Batch index of the query document.
    pub query_doc: usize,
    /// Batch index of the matched reference document.
    pub target_doc: usize,
    /// Global index of the first aligned query token.
    pub query_start: usize,
    /// Global index of the first aligned reference token.
    pub target_start: usize,
    pub items: Vec<AlignmentItem>,
    /// Fraction of query tokens with an exact match.
    pub matched_ratio: f64,
}

/// Align one query document against the reference portion of the batch.
///
/// Returns `None` when no candidate region matches at least
/// `min_matched_query_ratio` of the query tokens.
pub fn align_query(
    sourced: &SourcedText,
    query_doc: usize,
    num_queries: usize,
    config: &AlignConfig,
) -> Option<AlignmentResult> {
    let query = sourced.doc_tokens(query_doc);
    if query.is_empty() {
        return None;
    }

    let candidates = find_candidate_regions(sourced, query, num_queries, config);
    if candidates.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize, Trace)> = None;
    for candidate in candidates {
        let region =
            &sourced.doc_tokens(candidate.doc)[candidate.start..candidate.start + candidate.len];
        let trace = banded_levenshtein(query, region);
        let better = match &best {
            None => true,
            Some((best_doc, best_start, current)) => {
                trace.matched > current.matched
                    || (trace.matched == current.matched
                        && (candidate.doc, candidate.start) < (*best_doc, *best_start))
            }
        };
        if better {
            best = Some((candidate.doc, candidate.start, trace));
        }
    }

    let (target_doc, region_start, trace) = best?;
    let matched_ratio = trace.matched as f64 / query.len() as f64;
    if matched_ratio < config.min_matched_query_ratio {
        return None;
    }

    let query_document = sourced.document(query_doc);
    let items: Vec<AlignmentItem> = trace
        .steps
        .iter()
        .map(|step| {
            let hyp_time = match step.kind {
                MatchKind::Delete => None,
                _ => query_document.time(step.hyp_pos),
            };
            AlignmentItem {
                kind: step.kind,
                ref_pos: region_start + step.ref_pos,
                hyp_pos: step.hyp_pos,
                ref_token: step.ref_token,
                hyp_token: step.hyp_token,
                hyp_time,
            }
        })
        .collect();

    let first_ref = items
        .iter()
        .find(|item| item.ref_token.is_some())
        .map(|item| item.ref_pos)?;
    let first_hyp = items
        .iter()
        .find(|item| item.hyp_token.is_some())
        .map(|item| item.hyp_pos)?;

    Some(AlignmentResult {
        query_doc,
        target_doc,
        query_start: sourced.boundary(query_doc) + first_hyp,
        target_start: sourced.boundary(target_doc) + first_ref,
        items,
        matched_ratio,
    })
}

/// A scored candidate region within one reference document.
struct Candidate {
    doc: usize,
    start: usize,
    len: usize,
}

/// Coarse scan: count query n-grams per reference window, keep the best
/// `num_close_matches` non-overlapping windows, and size each region to the
/// admissible matched length around the window's hit cluster.
fn find_candidate_regions(
    sourced: &SourcedText,
    query: &[Token],
    num_queries: usize,
    config: &AlignConfig,
) -> Vec<Candidate> {
    let n = NGRAM.min(query.len());
    let query_grams: HashSet<&[Token]> = query.windows(n).collect();
    // Matched region may exceed the query by the configured ratio.
    let max_region = query.len()
        + (query.len() as f64 * config.reference_length_difference).ceil() as usize
        + 2 * (n + 16);

    struct Window {
        doc: usize,
        start: usize,
        hits: usize,
        first_hit: usize,
        last_hit: usize,
    }
    let mut windows: Vec<Window> = Vec::new();

    let step = (config.segment_length / 2).max(1);
    for doc in num_queries..sourced.num_documents() {
        let tokens = sourced.doc_tokens(doc);
        if tokens.len() < n {
            continue;
        }
        let mut start = 0;
        while start < tokens.len() {
            let end = (start + config.segment_length).min(tokens.len());
            let mut hits = 0;
            let mut first_hit = usize::MAX;
            let mut last_hit = 0;
            for p in start..end.saturating_sub(n - 1) {
                if query_grams.contains(&tokens[p..p + n]) {
                    hits += 1;
                    first_hit = first_hit.min(p);
                    last_hit = last_hit.max(p + n);
                }
            }
            if hits > 0 {
                windows.push(Window {
                    doc,
                    start,
                    hits,
                    first_hit,
                    last_hit,
                });
            }
            if end == tokens.len() {
                break;
            }
            start += step;
        }
    }

    // Highest hit count first; ties go to the earliest window.
    windows.sort_by(|a, b| {
        b.hits
            .cmp(&a.hits)
            .then(a.doc.cmp(&b.doc))
            .then(a.start.cmp(&b.start))
    });

    let mut candidates: Vec<Candidate> = Vec::new();
    for window in windows {
        if candidates.len() >= config.num_close_matches {
            break;
        }
        let doc_len = sourced.doc_tokens(window.doc).len();
        let center = (window.first_hit + window.last_hit) / 2;
        let half = max_region / 2;
        let start = center.saturating_sub(half);
        let len = max_region.min(doc_len - start);
        let overlaps = candidates.iter().any(|c| {
            c.doc == window.doc && start < c.start + c.len && c.start < start + len
        });
        if !overlaps && len >= n {
            candidates.push(Candidate {
                doc: window.doc,
                start,
                len,
            });
        }
    }
    candidates
}

struct TraceStep {
    kind: MatchKind,
    ref_pos: usize,
    hyp_pos: usize,
    ref_token: Option<Token>,
    hyp_token: Option<Token>,
}

struct Trace {
    steps: Vec<TraceStep>,
    matched: usize,
}

/// Semi-global banded Levenshtein: the query must be consumed in full, the
/// region may contribute any contiguous subrange (leading and trailing
/// reference tokens are free).
///
/// The band follows the proportional diagonal; its radius covers the length
/// difference plus an edit allowance, capped at [`MAX_BAND_RADIUS`].
fn banded_levenshtein(query: &[Token], region: &[Token]) -> Trace {
    let m = query.len();
    let n = region.len();
    if n == 0 {
        let steps = query
            .iter()
            .enumerate()
            .map(|(i, &t)| TraceStep {
                kind: MatchKind::Insert,
                ref_pos: 0,
                hyp_pos: i,
                ref_token: None,
                hyp_token: Some(t),
            })
            .collect();
        return Trace { steps, matched: 0 };
    }

    let radius = (m.abs_diff(n) + (m / 20).max(64)).min(MAX_BAND_RADIUS);
    let width = (2 * radius + 1).min(n + 1);

    const OP_NONE: u8 = 0;
    const OP_DIAG: u8 = 1; // consume both
    const OP_LEFT: u8 = 2; // consume reference only
    const OP_UP: u8 = 3; // consume query only
    const INF: u32 = u32::MAX / 2;

    // Row i covers columns lo[i]..lo[i]+width, centered on the proportional
    // diagonal. Costs keep only the previous row; ops keep everything for
    // the traceback.
    let lo_of = |i: usize| -> usize {
        let center = i * n / m.max(1);
        center.saturating_sub(radius).min((n + 1).saturating_sub(width))
    };

    let mut ops = vec![OP_NONE; (m + 1) * width];
    let mut prev = vec![INF; width];
    let mut curr = vec![INF; width];

    // Leading reference tokens are free.
    for v in prev.iter_mut() {
        *v = 0;
    }

    let mut prev_lo = lo_of(0);
    for i in 1..=m {
        let lo = lo_of(i);
        for v in curr.iter_mut() {
            *v = INF;
        }
        for k in 0..width {
            let j = lo + k;
            if j > n {
                break;
            }
            let up = if j >= prev_lo && j - prev_lo < width {
                prev[j - prev_lo]
            } else {
                INF
            };
            let diag = if j >= 1 && j - 1 >= prev_lo && j - 1 - prev_lo < width {
                prev[j - 1 - prev_lo]
            } else {
                INF
            };
            let left = if k > 0 { curr[k - 1] } else { INF };

            let sub_cost = if j >= 1 && query[i - 1] == region[j - 1] {
                0
            } else {
                1
            };
            let mut best = up.saturating_add(1);
            let mut op = OP_UP;
            if j >= 1 && diag.saturating_add(sub_cost) < best {
                best = diag + sub_cost;
                op = OP_DIAG;
            }
            if left.saturating_add(1) < best {
                best = left + 1;
                op = OP_LEFT;
            }
            curr[k] = best;
            ops[i * width + k] = op;
        }
        std::mem::swap(&mut prev, &mut curr);
        prev_lo = lo;
    }

    // Trailing reference tokens are free: end anywhere on the last row.
    let last_lo = lo_of(m);
    let mut end_k = 0;
    let mut end_cost = INF;
    for k in 0..width {
        if last_lo + k > n {
            break;
        }
        if prev[k] < end_cost {
            end_cost = prev[k];
            end_k = k;
        }
    }

    // Traceback.
    let mut rev = Vec::with_capacity(m + m / 4);
    let mut matched = 0;
    let mut i = m;
    let mut j = last_lo + end_k;
    while i > 0 {
        let lo = lo_of(i);
        let k = j.checked_sub(lo).filter(|&k| k < width);
        let op = match k {
            Some(k) => ops[i * width + k],
            None => OP_UP,
        };
        match op {
            OP_DIAG => {
                let kind = if query[i - 1] == region[j - 1] {
                    matched += 1;
                    MatchKind::Match
                } else {
                    MatchKind::Substitute
                };
                rev.push(TraceStep {
                    kind,
                    ref_pos: j - 1,
                    hyp_pos: i - 1,
                    ref_token: Some(region[j - 1]),
                    hyp_token: Some(query[i - 1]),
                });
                i -= 1;
                j -= 1;
            }
            OP_LEFT => {
                rev.push(TraceStep {
                    kind: MatchKind::Delete,
                    ref_pos: j - 1,
                    hyp_pos: i,
                    ref_token: Some(region[j - 1]),
                    hyp_token: None,
                });
                j -= 1;
            }
            _ => {
                rev.push(TraceStep {
                    kind: MatchKind::Insert,
                    ref_pos: j,
                    hyp_pos: i - 1,
                    ref_token: None,
                    hyp_token: Some(query[i - 1]),
                });
                i -= 1;
            }
        }
    }
    rev.reverse();
    Trace {
        steps: rev,
        matched,
    }
}
