//! Matching configuration.
//!
//! All tuning parameters for the three pipeline stages live here as plain
//! typed fields with documented defaults. A TOML file can override any
//! subset; command-line flags are applied on top by `main`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::defaults;
use crate::error::{BookalignError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub text: TextConfig,
    pub align: AlignConfig,
    pub split: SplitConfig,
    pub executor: ExecutorConfig,
    /// Number of cuts per batch.
    pub batch_size: usize,
}

/// Text loading and tokenization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Index reference books as raw bytes instead of codepoints.
    pub use_utf8: bool,
    /// Supervision symbols are BPE pieces (word boundary marker `▁`).
    pub is_bpe: bool,
    /// Uppercase all tokens before matching.
    pub use_uppercase: bool,
    /// Reference books carry punctuation to be stripped before matching.
    pub has_punctuation: bool,
}

/// Query alignment configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlignConfig {
    /// Candidate reference regions examined per query.
    pub num_close_matches: usize,
    /// Reference scan window in tokens.
    pub segment_length: usize,
    /// Tolerance on reference/query length ratio.
    pub reference_length_difference: f64,
    /// Minimum fraction of query tokens that must match.
    pub min_matched_query_ratio: f64,
}

/// Which token timestamp edge a cut lands on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPosition {
    /// Cut at the begin time of the token at the break point.
    #[default]
    Current,
    /// Cut at the begin time of the token before the break point.
    Previous,
    /// Cut midway between the surrounding token begin times.
    Middle,
}

/// Segmentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    /// Reference context kept before and after a cut, in characters.
    pub preceding_context_length: usize,
    /// Timestamp edge used when cutting.
    pub timestamp_position: TimestampPosition,
    /// Minimum silence gap (seconds) accepted as a break point.
    pub silence_length_to_break: f64,
    /// Minimum emitted segment duration (seconds).
    pub min_duration: f64,
    /// Maximum emitted segment duration (seconds).
    pub max_duration: f64,
    /// Soft target duration range (seconds).
    pub expected_duration: (f64, f64),
    /// Maximum tolerable alignment error rate per segment.
    pub max_error_rate: f64,
}

/// Worker pool sizing per stage.
///
/// `0` sizes a pool to the available cores; `1` selects the serial
/// strategy. Both pools are created once at controller start and reused
/// across every batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Threads for the alignment stage.
    pub align_threads: usize,
    /// Threads for the segmentation stage.
    pub split_threads: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            use_utf8: defaults::USE_UTF8,
            is_bpe: defaults::IS_BPE,
            use_uppercase: defaults::USE_UPPERCASE,
            has_punctuation: defaults::HAS_PUNCTUATION,
        }
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            num_close_matches: defaults::NUM_CLOSE_MATCHES,
            segment_length: defaults::SEGMENT_LENGTH,
            reference_length_difference: defaults::REFERENCE_LENGTH_DIFFERENCE,
            min_matched_query_ratio: defaults::MIN_MATCHED_QUERY_RATIO,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            preceding_context_length: defaults::PRECEDING_CONTEXT_LENGTH,
            timestamp_position: TimestampPosition::default(),
            silence_length_to_break: defaults::SILENCE_LENGTH_TO_BREAK,
            min_duration: defaults::MIN_DURATION,
            max_duration: defaults::MAX_DURATION,
            expected_duration: defaults::EXPECTED_DURATION,
            max_error_rate: defaults::MAX_ERROR_RATE,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields take their default values. Returns an error for a
    /// missing file or invalid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BookalignError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                BookalignError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise return validated defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Check value ranges and cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        fn invalid(key: &str, message: &str) -> BookalignError {
            BookalignError::ConfigInvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            }
        }

        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.align.num_close_matches == 0 {
            return Err(invalid("align.num_close_matches", "must be at least 1"));
        }
        if self.align.segment_length == 0 {
            return Err(invalid("align.segment_length", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.align.reference_length_difference) {
            return Err(invalid(
                "align.reference_length_difference",
                "must be in [0, 1)",
            ));
        }
        if !(0.0..=1.0).contains(&self.align.min_matched_query_ratio)
            || self.align.min_matched_query_ratio == 0.0
        {
            return Err(invalid(
                "align.min_matched_query_ratio",
                "must be in (0, 1]",
            ));
        }
        if self.split.min_duration <= 0.0 {
            return Err(invalid("split.min_duration", "must be positive"));
        }
        if self.split.min_duration >= self.split.max_duration {
            return Err(invalid(
                "split.min_duration",
                "must be less than max_duration",
            ));
        }
        let (lo, hi) = self.split.expected_duration;
        if lo > hi {
            return Err(invalid(
                "split.expected_duration",
                "range start must not exceed range end",
            ));
        }
        if lo < self.split.min_duration || hi > self.split.max_duration {
            return Err(invalid(
                "split.expected_duration",
                "range must lie within [min_duration, max_duration]",
            ));
        }
        if !(0.0..1.0).contains(&self.split.max_error_rate) {
            return Err(invalid("split.max_error_rate", "must be in [0, 1)"));
        }
        if self.split.silence_length_to_break <= 0.0 {
            return Err(invalid(
                "split.silence_length_to_break",
                "must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text: TextConfig::default(),
            align: AlignConfig::default(),
            split: SplitConfig::default(),
            executor: ExecutorConfig::default(),
            batch_size: defaults::BATCH_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.batch_size, 50);
        assert!(!config.text.use_utf8);
        assert!(config.text.is_bpe);
        assert!(config.text.use_uppercase);
        assert!(config.text.has_punctuation);
        assert_eq!(config.align.num_close_matches, 2);
        assert_eq!(config.align.segment_length, 5000);
        assert_eq!(config.split.timestamp_position, TimestampPosition::Current);
        assert_eq!(config.split.expected_duration, (5.0, 20.0));
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "batch_size = 8\n\n[split]\nmin_duration = 3.0\nmax_duration = 25.0"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.split.min_duration, 3.0);
        assert_eq!(config.split.max_duration, 25.0);
        // Untouched sections keep their defaults
        assert_eq!(config.align.segment_length, 5000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/bookalign.toml")).unwrap_err();
        assert!(matches!(err, BookalignError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = = 8").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, BookalignError::Config(_)));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = Config {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_durations() {
        let mut config = Config::default();
        config.split.min_duration = 30.0;
        config.split.max_duration = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_duration"));
    }

    #[test]
    fn test_validate_rejects_expected_outside_bounds() {
        let mut config = Config::default();
        config.split.expected_duration = (1.0, 20.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = Config::default();
        config.align.min_matched_query_ratio = 0.0;
        assert!(config.validate().is_err());
        config.align.min_matched_query_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timestamp_position_roundtrip() {
        let toml_str = "[split]\ntimestamp_position = \"middle\"";
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.split.timestamp_position, TimestampPosition::Middle);
    }
}
