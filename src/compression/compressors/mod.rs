//! Format-specific size reducers and the per-file dispatch.

pub mod image_compressor;
pub mod pdf_compressor;

use async_trait::async_trait;
use std::path::Path;

use crate::errors::DomainResult;

use super::types::{InputFile, ReduceOutcome, ReducedPayload};

pub use image_compressor::ImageCompressor;
pub use pdf_compressor::PdfCompressor;

/// Common trait for all size reducers
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Check if this compressor can handle the declared media type.
    /// Routing never sniffs file extensions; extension-based MIME
    /// guessing happens only at the path-based entry point.
    fn can_handle(&self, mime_type: &str) -> bool;

    /// Reduce the file data, returning the new payload and its media type
    async fn compress(&self, data: Vec<u8>) -> DomainResult<ReducedPayload>;

    /// Name used in diagnostics
    fn name(&self) -> &'static str;
}

/// Routes one input file to the matching reducer.
///
/// Unsupported media types are skipped; reducer errors are contained per
/// file. Neither outcome produces a result entry downstream.
pub struct ReducerDispatch {
    compressors: Vec<Box<dyn Compressor>>,
}

impl Default for ReducerDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ReducerDispatch {
    pub fn new() -> Self {
        Self::with_compressors(vec![
            Box::new(ImageCompressor::new()),
            Box::new(PdfCompressor::new()),
        ])
    }

    pub fn with_compressors(compressors: Vec<Box<dyn Compressor>>) -> Self {
        Self { compressors }
    }

    fn find_compressor(&self, mime_type: &str) -> Option<&dyn Compressor> {
        self.compressors
            .iter()
            .find(|c| c.can_handle(mime_type))
            .map(|c| c.as_ref())
    }

    /// Attempt to reduce one file. Never propagates an error to the caller;
    /// failures are folded into the returned outcome.
    pub async fn reduce(&self, file: &InputFile) -> ReduceOutcome {
        let Some(compressor) = self.find_compressor(&file.mime_type) else {
            log::warn!(
                "Skipping unsupported file: {} ({})",
                file.name,
                file.mime_type
            );
            return ReduceOutcome::Skipped {
                reason: format!("Unsupported media type: {}", file.mime_type),
            };
        };

        log::debug!(
            "Reducing {} ({} bytes) with {}",
            file.name,
            file.size(),
            compressor.name()
        );

        match compressor.compress(file.data.clone()).await {
            Ok(reduced) => ReduceOutcome::Reduced(reduced),
            Err(e) => {
                log::error!("Compression failed for {}: {}", file.name, e);
                ReduceOutcome::Failed(e)
            }
        }
    }
}

/// Utility function to get file extension from filename
pub fn get_extension(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|ext| ext.to_str())
}

/// Utility function to guess MIME type from extension
pub fn guess_mime_type(filename: &str) -> &'static str {
    match get_extension(filename).unwrap_or("").to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",

        // Documents
        "pdf" => "application/pdf",

        // Anything else is passed through so the dispatch can skip it
        "txt" => "text/plain",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension("photo.JPG"), Some("JPG"));
        assert_eq!(get_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(get_extension("noext"), None);
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("holiday.jpeg"), "image/jpeg");
        assert_eq!(guess_mime_type("scan.pdf"), "application/pdf");
        assert_eq!(guess_mime_type("notes.txt"), "text/plain");
        assert_eq!(guess_mime_type("unknown.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_dispatch_skips_unsupported_type() {
        let dispatch = ReducerDispatch::new();
        let file = InputFile::new("notes.txt", "text/plain", b"hello".to_vec());
        match dispatch.reduce(&file).await {
            ReduceOutcome::Skipped { reason } => {
                assert!(reason.contains("text/plain"));
            }
            other => panic!("expected Skipped, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_ignores_extension_of_unsupported_declared_type() {
        let dispatch = ReducerDispatch::new();

        // A valid PDF payload with a .pdf name is still skipped when its
        // declared media type is unsupported; routing never falls back to
        // the extension.
        let pdf = InputFile::new(
            "doc.pdf",
            "text/plain",
            crate::compression::fixtures::pdf_bytes(),
        );
        match dispatch.reduce(&pdf).await {
            ReduceOutcome::Skipped { reason } => assert!(reason.contains("text/plain")),
            other => panic!("expected Skipped, got {:?}", other),
        }

        let jpg = InputFile::new("photo.jpg", "application/octet-stream", vec![0u8; 16]);
        match dispatch.reduce(&jpg).await {
            ReduceOutcome::Skipped { reason } => {
                assert!(reason.contains("application/octet-stream"))
            }
            other => panic!("expected Skipped, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_routes_image_family_prefix() {
        let dispatch = ReducerDispatch::new();
        // Declared type drives routing; the payload is garbage, so the
        // image reducer is chosen and then fails.
        let file = InputFile::new("broken.png", "image/png", vec![0u8; 16]);
        match dispatch.reduce(&file).await {
            ReduceOutcome::Failed(_) => {}
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_failure_excludes_file_without_error() {
        let dispatch = ReducerDispatch::new();
        let file = InputFile::new("broken.pdf", "application/pdf", b"not a pdf".to_vec());
        // reduce never returns Err; the failure is folded into the outcome
        match dispatch.reduce(&file).await {
            ReduceOutcome::Failed(e) => {
                assert!(e.to_string().contains("PDF"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
