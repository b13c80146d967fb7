//! Batch file size-reduction pipeline.
//!
//! Input files flow one way: batch processor -> per-file reducer dispatch
//! -> accumulated result pairs -> packager -> download trigger.

pub mod batch;
pub mod compressors;
pub mod download;
pub mod packager;
pub mod types;

pub use batch::{BatchProcessor, BatchState};
pub use compressors::ReducerDispatch;
pub use download::trigger;
pub use packager::{package, DownloadUnit};
pub use types::{
    BatchReport, BatchStatus, InputFile, ReduceOutcome, ReducedPayload, ResultPair,
};
