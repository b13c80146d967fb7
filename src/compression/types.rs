//! Type definitions for the compression pipeline.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Filename prefix applied to every reduced file offered for download
pub const COMPRESSED_PREFIX: &str = "compressed-";

/// Fixed filename used when multiple results are bundled into one archive
pub const ARCHIVE_FILENAME: &str = "compressed-files.zip";

/// A user-supplied file: name, declared media type, and byte payload.
/// Immutable once constructed; discarded when the batch completes.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing the media type from its extension.
    /// Used by the debug binary and tests; the library API takes
    /// already-constructed `InputFile`s.
    pub fn from_path(path: &std::path::Path) -> Result<Self, DomainError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::File(format!("Invalid file name: {}", path.display())))?
            .to_string();
        let data = std::fs::read(path)
            .map_err(|e| DomainError::File(format!("Failed to read {}: {}", path.display(), e)))?;
        let mime_type = super::compressors::guess_mime_type(&name).to_string();
        Ok(Self {
            name,
            mime_type,
            data,
        })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// The size-reduced byte payload produced for one input file
#[derive(Debug, Clone)]
pub struct ReducedPayload {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ReducedPayload {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Association between an original file and its reduced payload.
/// The ordered sequence of pairs is the batch processor's sole output
/// artifact; insertion order matches selection order.
#[derive(Debug, Clone)]
pub struct ResultPair {
    pub original: InputFile,
    pub reduced: ReducedPayload,
}

/// Outcome of one reduction attempt. Skipped and Failed files are both
/// excluded from results; they differ only in their diagnostics.
#[derive(Debug)]
pub enum ReduceOutcome {
    Reduced(ReducedPayload),
    Skipped { reason: String },
    Failed(DomainError),
}

/// Processing status for one batch invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Idle,
    Processing,
}

impl Default for BatchStatus {
    fn default() -> Self {
        BatchStatus::Idle
    }
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Idle => "idle",
            BatchStatus::Processing => "processing",
        }
    }
}

/// Fixed configuration for image reduction. Not exposed to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReductionConfig {
    /// Target maximum output size in bytes (best effort)
    pub max_size_bytes: usize,
    /// Maximum length of the longer image edge in pixels
    pub max_edge_px: u32,
    /// JPEG quality to start from when stepping down to meet the target
    pub initial_quality: u8,
    /// JPEG quality floor; never encode below this
    pub min_quality: u8,
    /// Quality decrement per re-encode attempt
    pub quality_step: u8,
}

impl Default for ImageReductionConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 1024 * 1024, // ~1 MB target
            max_edge_px: 1200,
            initial_quality: 85,
            min_quality: 40,
            quality_step: 10,
        }
    }
}

/// Fixed configuration for PDF optimization. Not exposed to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfReductionConfig {
    /// Consolidate and deflate object streams on re-serialization
    pub consolidate_streams: bool,
}

impl Default for PdfReductionConfig {
    fn default() -> Self {
        Self {
            consolidate_streams: true,
        }
    }
}

/// Aggregate statistics for one completed batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_files: usize,
    pub reduced_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub original_bytes: u64,
    pub reduced_bytes: u64,
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn space_saved_bytes(&self) -> i64 {
        self.original_bytes as i64 - self.reduced_bytes as i64
    }

    pub fn space_saved_percentage(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (self.space_saved_bytes() as f64 / self.original_bytes as f64) * 100.0
    }
}
