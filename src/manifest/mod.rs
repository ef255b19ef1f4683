//! Corpus manifest I/O.
//!
//! Manifests are JSONL: one cut per line. The reader is lazy (one record
//! deserialized per iteration), the writer is append-only with an explicit
//! flush once per batch. Unknown fields round-trip untouched so records
//! produced by other tooling survive a pass through bookalign.

pub mod cut;
pub mod reader;
pub mod writer;

pub use cut::{AlignedSymbol, Cut, CutCustom, Recording, Supervision, SupervisionCustom, SymbolAlignment};
pub use reader::CutSetReader;
pub use writer::CutSetWriter;
