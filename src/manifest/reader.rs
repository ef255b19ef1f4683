//! Lazy JSONL manifest reader.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::{BookalignError, Result};
use crate::manifest::cut::Cut;

/// Iterates cuts from a JSONL manifest one record at a time.
///
/// Records are deserialized lazily so arbitrarily large manifests stream
/// through in constant memory. Blank lines are skipped; a malformed line
/// yields an error carrying its line number.
#[derive(Debug)]
pub struct CutSetReader {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl CutSetReader {
    /// Open a manifest for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| BookalignError::ManifestOpen {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

impl Iterator for CutSetReader {
    type Item = Result<Cut>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_number += 1;
            match self.lines.next()? {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(&line).map_err(|e| {
                        BookalignError::ManifestParse {
                            line: self.line_number,
                            message: e.to_string(),
                        }
                    }));
                }
                Err(e) => return Some(Err(BookalignError::Io(e))),
            }
        }
    }
}
