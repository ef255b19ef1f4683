//! Result writing: segments back onto corpus records.

use std::collections::HashMap;

use log::debug;
use serde_json::Map;

use crate::error::Result;
use crate::manifest::cut::{Cut, CutCustom, Recording, Supervision, SupervisionCustom};
use crate::manifest::writer::CutSetWriter;
use crate::pipeline::batch::CutIndex;
use crate::split::splitter::Segment;

/// Write one batch's segments as new cut records.
///
/// Segments are tagged with their originating (cut, supervision); new ids
/// are `{original_id}_{n}` with `n` counting per original cut across all
/// of its supervisions, in production order. The writer is flushed once,
/// after the batch's last record.
pub fn write_batch(
    cuts: &[Cut],
    results: &[(CutIndex, Vec<Segment>)],
    writer: &mut CutSetWriter,
) -> Result<usize> {
    let mut segment_counters: HashMap<&str, usize> = HashMap::new();
    let mut written = 0;

    for (tag, segments) in results {
        let cut = &cuts[tag.cut];
        let supervision = &cut.supervisions[tag.supervision];
        for segment in segments {
            let counter = segment_counters.entry(cut.id.as_str()).or_insert(0);
            let id = format!("{}_{}", cut.id, counter);
            *counter += 1;

            let record = synthesize_cut(&id, cut, supervision, &cut.recording, segment);
            writer.write(&record)?;
            written += 1;
        }
    }

    writer.flush()?;
    debug!("wrote {written} segment records");
    Ok(written)
}

fn synthesize_cut(
    id: &str,
    cut: &Cut,
    supervision: &Supervision,
    recording: &Recording,
    segment: &Segment,
) -> Cut {
    let new_supervision = Supervision {
        id: id.to_string(),
        recording_id: Some(recording.id.clone()),
        start: 0.0,
        duration: segment.duration,
        channel: supervision.channel,
        text: None,
        language: supervision.language.clone(),
        speaker: supervision.speaker.clone(),
        alignment: None,
        custom: Some(SupervisionCustom {
            texts: Some([segment.ref_text.clone(), segment.hyp_text.clone()]),
            pre_texts: Some([segment.pre_ref.clone(), segment.pre_hyp.clone()]),
            post_texts: Some([segment.post_ref.clone(), segment.post_hyp.clone()]),
            begin_byte: Some(segment.begin_byte),
            end_byte: Some(segment.end_byte),
            extra: Map::new(),
        }),
        extra: Map::new(),
    };

    Cut {
        id: id.to_string(),
        start: segment.start_time,
        duration: segment.duration,
        channel: cut.channel,
        supervisions: vec![new_supervision],
        recording: recording.clone(),
        custom: Some(CutCustom {
            text_path: cut.text_path().cloned(),
            extra: Map::new(),
        }),
        extra: Map::new(),
    }
}
