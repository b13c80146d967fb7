//! PDF size reduction using `lopdf` structural rewriting.

use async_trait::async_trait;
use tokio::task;

use crate::errors::{DomainError, DomainResult};

use super::super::types::{PdfReductionConfig, ReducedPayload};
use super::Compressor;

/// Reduces PDFs by parsing the document structure and re-serializing it
/// with stream consolidation. No pages are added or removed.
pub struct PdfCompressor {
    config: PdfReductionConfig,
}

impl PdfCompressor {
    pub fn new() -> Self {
        Self {
            config: PdfReductionConfig::default(),
        }
    }
}

impl Default for PdfCompressor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Compressor for PdfCompressor {
    fn can_handle(&self, mime_type: &str) -> bool {
        mime_type == "application/pdf"
    }

    async fn compress(&self, data: Vec<u8>) -> DomainResult<ReducedPayload> {
        let config = self.config.clone();

        // Run PDF operations in a blocking task
        task::spawn_blocking(move || -> DomainResult<ReducedPayload> {
            let mut doc = lopdf::Document::load_mem(&data)
                .map_err(|e| DomainError::Pdf(format!("Failed to parse PDF: {}", e)))?;

            if config.consolidate_streams {
                doc.compress();
            }

            let mut output = Vec::with_capacity(data.len());
            doc.save_to(&mut output)
                .map_err(|e| DomainError::Pdf(format!("Failed to re-serialize PDF: {}", e)))?;

            Ok(ReducedPayload {
                data: output,
                mime_type: "application/pdf".to_string(),
            })
        })
        .await
        .map_err(|e| DomainError::Internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "PdfCompressor"
    }
}
