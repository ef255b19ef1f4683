//! Segment proposal for one aligned query.
//!
//! Cut points are silence gaps between matched tokens. Between cut points,
//! segments grow greedily: the first break putting the running duration
//! into the expected range closes a segment; a break in [min_duration,
//! expected.0) is kept as a fallback for spans that would otherwise
//! overshoot max_duration. Candidates over the error-rate limit are
//! discarded without being written.

use crate::align::matcher::{AlignmentResult, MatchKind};
use crate::config::{SplitConfig, TimestampPosition};
use crate::error::{BookalignError, Result};
use crate::text::SourcedText;

/// A bounded-duration output unit with full provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Begin byte offset into the original reference text.
    pub begin_byte: usize,
    /// End byte offset into the original reference text (exclusive).
    pub end_byte: usize,
    /// Segment start in the audio, seconds.
    pub start_time: f64,
    /// Segment duration, seconds.
    pub duration: f64,
    /// Matched reference text, exactly as it appears in the book.
    pub ref_text: String,
    /// Matched hypothesis text from the recognizer.
    pub hyp_text: String,
    /// Reference context preceding the match.
    pub pre_ref: String,
    /// Hypothesis context preceding the match.
    pub pre_hyp: String,
    /// Reference context following the match.
    pub post_ref: String,
    /// Hypothesis context following the match.
    pub post_hyp: String,
}

/// A matched trace item usable as a segment boundary.
struct Anchor {
    item_idx: usize,
    hyp_pos: usize,
    ref_pos: usize,
    time: f64,
}

/// A candidate cut between two anchors.
struct Break {
    /// Anchor closing the segment before the cut.
    end_anchor: usize,
    /// Anchor opening the segment after the cut, `None` at the query end.
    start_anchor: Option<usize>,
    /// Cut time per the configured timestamp position.
    time: f64,
}

/// Split one aligned query into zero or more valid segments.
pub fn split_aligned_query(
    sourced: &SourcedText,
    alignment: &AlignmentResult,
    config: &SplitConfig,
) -> Result<Vec<Segment>> {
    let anchors = collect_anchors(alignment)?;
    if anchors.len() < 2 {
        return Ok(Vec::new());
    }

    let breaks = find_breaks(&anchors, config);
    let mut segments = Vec::new();

    let mut start_anchor = 0;
    let mut start_time = anchors[0].time;
    let mut fallback: Option<usize> = None;

    let mut b = 0;
    while b < breaks.len() {
        let brk = &breaks[b];
        let duration = brk.time - start_time;

        if duration < config.min_duration {
            b += 1;
            continue;
        }

        if duration <= config.max_duration {
            // The expected-range preference only defers a cut while more
            // material remains; the terminal break takes any valid duration.
            if duration >= config.expected_duration.0 || brk.start_anchor.is_none() {
                if let Some(segment) = build_segment(
                    sourced,
                    alignment,
                    &anchors,
                    start_anchor,
                    brk.end_anchor,
                    start_time,
                    brk.time,
                    config,
                ) {
                    segments.push(segment);
                }
                match brk.start_anchor {
                    Some(next) => {
                        start_anchor = next;
                        start_time = segment_start_time(&anchors, next, brk.time, config);
                        fallback = None;
                    }
                    None => return Ok(segments),
                }
            } else {
                // Long enough to be valid but short of the target range:
                // remember the latest such cut in case we overshoot.
                fallback = Some(b);
            }
            b += 1;
            continue;
        }

        // Overshot max_duration. Cut at the fallback if one exists,
        // otherwise the span up to this break cannot form a valid segment.
        if let Some(fb) = fallback.take() {
            let fb_brk = &breaks[fb];
            if let Some(segment) = build_segment(
                sourced,
                alignment,
                &anchors,
                start_anchor,
                fb_brk.end_anchor,
                start_time,
                fb_brk.time,
                config,
            ) {
                segments.push(segment);
            }
            match fb_brk.start_anchor {
                Some(next) => {
                    start_anchor = next;
                    start_time = segment_start_time(&anchors, next, fb_brk.time, config);
                    // Re-scan the breaks after the fallback against the new
                    // start; some may now close a valid segment.
                    b = fb + 1;
                }
                None => return Ok(segments),
            }
        } else {
            match brk.start_anchor {
                Some(next) => {
                    start_anchor = next;
                    start_time = segment_start_time(&anchors, next, brk.time, config);
                    b += 1;
                }
                None => return Ok(segments),
            }
        }
    }

    Ok(segments)
}

fn collect_anchors(alignment: &AlignmentResult) -> Result<Vec<Anchor>> {
    let mut anchors = Vec::new();
    for (item_idx, item) in alignment.items.iter().enumerate() {
        if item.kind != MatchKind::Match {
            continue;
        }
        let time = item.hyp_time.ok_or_else(|| {
            BookalignError::Other(format!(
                "matched trace item without timestamp at hyp position {}",
                item.hyp_pos
            ))
        })?;
        anchors.push(Anchor {
            item_idx,
            hyp_pos: item.hyp_pos,
            ref_pos: item.ref_pos,
            time,
        });
    }
    Ok(anchors)
}

/// Silence-gap cuts between consecutive anchors, plus the terminal cut.
///
/// The terminal cut time extends past the last token by the mean anchor
/// gap, approximating the final token's duration.
fn find_breaks(anchors: &[Anchor], config: &SplitConfig) -> Vec<Break> {
    let mut breaks = Vec::new();
    for i in 0..anchors.len() - 1 {
        let gap = anchors[i + 1].time - anchors[i].time;
        if gap >= config.silence_length_to_break {
            let time = match config.timestamp_position {
                TimestampPosition::Current => anchors[i + 1].time,
                TimestampPosition::Previous => anchors[i].time,
                TimestampPosition::Middle => (anchors[i].time + anchors[i + 1].time) / 2.0,
            };
            breaks.push(Break {
                end_anchor: i,
                start_anchor: Some(i + 1),
                time,
            });
        }
    }

    let first = anchors[0].time;
    let last = anchors[anchors.len() - 1].time;
    let mean_gap = (last - first) / (anchors.len() - 1) as f64;
    breaks.push(Break {
        end_anchor: anchors.len() - 1,
        start_anchor: None,
        time: last + mean_gap,
    });
    breaks
}

/// Start time of the segment opening at `anchor`, given the cut time of the
/// break before it.
fn segment_start_time(
    anchors: &[Anchor],
    anchor: usize,
    cut_time: f64,
    config: &SplitConfig,
) -> f64 {
    match config.timestamp_position {
        TimestampPosition::Current => anchors[anchor].time,
        _ => cut_time,
    }
}

/// Assemble one candidate segment, returning `None` when it fails the
/// error-rate or duration checks.
#[allow(clippy::too_many_arguments)]
fn build_segment(
    sourced: &SourcedText,
    alignment: &AlignmentResult,
    anchors: &[Anchor],
    start_anchor: usize,
    end_anchor: usize,
    start_time: f64,
    end_time: f64,
    config: &SplitConfig,
) -> Option<Segment> {
    let duration = end_time - start_time;
    if duration < config.min_duration || duration > config.max_duration {
        return None;
    }

    let start = &anchors[start_anchor];
    let end = &anchors[end_anchor];

    // Error rate over the trace span covered by this segment.
    let span = &alignment.items[start.item_idx..=end.item_idx];
    let errors = span.iter().filter(|i| i.kind != MatchKind::Match).count();
    let error_rate = errors as f64 / span.len() as f64;
    if error_rate > config.max_error_rate {
        return None;
    }

    let ref_doc = sourced.document(alignment.target_doc);
    let ref_base = sourced.boundary(alignment.target_doc);
    // Un-apply the punctuation filter: global filtered index → pre-filter
    // token index → original byte offset.
    let begin_pre = sourced.pos(ref_base + start.ref_pos);
    let end_pre = sourced.pos(ref_base + end.ref_pos);
    let begin_byte = ref_doc.byte_offset(begin_pre);
    let end_byte = ref_doc.byte_offset(end_pre) + ref_doc.token_byte_len(end_pre);

    let query_doc = sourced.document(alignment.query_doc);
    let hyp_begin = query_doc.byte_offset(start.hyp_pos);
    let hyp_end = query_doc.byte_offset(end.hyp_pos) + query_doc.token_byte_len(end.hyp_pos);

    let context = config.preceding_context_length;
    let (pre_ref, post_ref) = context_around(ref_doc.text(), begin_byte, end_byte, context);
    let (pre_hyp, post_hyp) = context_around(query_doc.text(), hyp_begin, hyp_end, context);

    Some(Segment {
        begin_byte,
        end_byte,
        start_time,
        duration,
        ref_text: ref_doc.byte_slice(begin_byte, end_byte),
        hyp_text: query_doc.byte_slice(hyp_begin, hyp_end),
        pre_ref,
        pre_hyp,
        post_ref,
        post_hyp,
    })
}

/// Up to `context` bytes of text before and after a byte range, clamped to
/// char boundaries.
fn context_around(text: &str, begin: usize, end: usize, context: usize) -> (String, String) {
    let mut pre_start = begin.saturating_sub(context);
    while pre_start < begin && !text.is_char_boundary(pre_start) {
        pre_start += 1;
    }
    let mut post_end = (end + context).min(text.len());
    while post_end > end && !text.is_char_boundary(post_end) {
        post_end -= 1;
    }
    (
        text[pre_start..begin.min(text.len())].to_string(),
        text[end.min(post_end)..post_end].to_string(),
    )
}
