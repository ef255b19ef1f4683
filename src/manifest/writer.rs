//! Sequential append-only JSONL manifest writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{BookalignError, Result};
use crate::manifest::cut::Cut;

/// Writes cuts to a JSONL manifest, one record per line.
///
/// Writes go through a buffer; callers flush explicitly once per batch.
/// A crash before the flush loses the unflushed batch, which is acceptable
/// because batches re-process idempotently.
#[derive(Debug)]
pub struct CutSetWriter {
    writer: BufWriter<File>,
    records_written: usize,
}

impl CutSetWriter {
    /// Create (or truncate) the output manifest.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| BookalignError::ManifestOpen {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Append one cut record.
    pub fn write(&mut self, cut: &Cut) -> Result<()> {
        let line = serde_json::to_string(cut).map_err(|e| BookalignError::ManifestWrite {
            message: e.to_string(),
        })?;
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| BookalignError::ManifestWrite {
                message: e.to_string(),
            })?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush buffered records to durable storage.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| BookalignError::ManifestWrite {
            message: e.to_string(),
        })
    }

    /// Total records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::cut::Recording;
    use serde_json::Map;
    use tempfile::tempdir;

    fn cut(id: &str) -> Cut {
        Cut {
            id: id.to_string(),
            start: 0.0,
            duration: 1.0,
            channel: 0,
            supervisions: vec![],
            recording: Recording {
                id: format!("r-{id}"),
                extra: Map::new(),
            },
            custom: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        let mut writer = CutSetWriter::create(&path).unwrap();
        writer.write(&cut("a")).unwrap();
        writer.write(&cut("b")).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.records_written(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let ids: Vec<String> = contents
            .lines()
            .map(|l| serde_json::from_str::<Cut>(l).unwrap().id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_create_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut writer = CutSetWriter::create(&path).unwrap();
        writer.write(&cut("fresh")).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("fresh"));
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let err = CutSetWriter::create(Path::new("/nonexistent/dir/out.jsonl")).unwrap_err();
        assert!(matches!(err, BookalignError::ManifestOpen { .. }));
    }
}
