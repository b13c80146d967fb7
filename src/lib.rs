//! Core library for the file compressor: accepts a batch of images and
//! PDFs, reduces each with a format-specific routine, and packages the
//! results into a single download (one file, or a ZIP of many).

// Public modules
pub mod compression;
pub mod errors;

pub use compression::{
    package, trigger, BatchProcessor, BatchReport, BatchState, BatchStatus, DownloadUnit,
    InputFile, ReduceOutcome, ReducedPayload, ResultPair,
};
pub use errors::{DomainError, DomainResult};
