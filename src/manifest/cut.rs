//! Cut and supervision record types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One recording with its supervisions and a pointer to the reference book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cut {
    pub id: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub channel: i64,
    #[serde(default)]
    pub supervisions: Vec<Supervision>,
    pub recording: Recording,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CutCustom>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cut {
    /// Path to the reference book, when the cut carries one.
    pub fn text_path(&self) -> Option<&PathBuf> {
        self.custom.as_ref().and_then(|c| c.text_path.as_ref())
    }
}

/// Cut-level custom block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CutCustom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_path: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A time-stamped text span within a recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supervision {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_id: Option<String>,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub channel: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<SymbolAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<SupervisionCustom>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token-level timing produced by the recognizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SymbolAlignment {
    #[serde(default)]
    pub symbol: Vec<AlignedSymbol>,
}

/// One recognized symbol with its begin time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignedSymbol {
    pub symbol: String,
    pub start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Supervision-level custom block; output records fill the segment fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SupervisionCustom {
    /// Matched `[reference, hypothesis]` text pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texts: Option<[String; 2]>,
    /// Preceding `[reference, hypothesis]` context pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_texts: Option<[String; 2]>,
    /// Following `[reference, hypothesis]` context pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_texts: Option<[String; 2]>,
    /// Begin byte offset into the original book.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_byte: Option<usize>,
    /// End byte offset into the original book.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_byte: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to the source audio. Fields beyond the id pass through as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recording {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
