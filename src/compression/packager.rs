//! Packages batch results into a single downloadable unit.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::errors::{DomainError, DomainResult};

use super::types::{ResultPair, ARCHIVE_FILENAME, COMPRESSED_PREFIX};

/// The final byte payload offered to the user, with a suggested filename
#[derive(Debug, Clone)]
pub struct DownloadUnit {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Turn the accumulated results into one download unit.
///
/// Empty results produce nothing; a single result is offered directly
/// under `compressed-<original name>`; multiple results are bundled into
/// one deflated ZIP archive with an entry per pair.
pub fn package(results: &[ResultPair]) -> DomainResult<Option<DownloadUnit>> {
    match results {
        [] => Ok(None),
        [single] => Ok(Some(DownloadUnit {
            filename: format!("{}{}", COMPRESSED_PREFIX, single.original.name),
            mime_type: single.reduced.mime_type.clone(),
            data: single.reduced.data.clone(),
        })),
        many => {
            let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            for pair in many {
                // Entry names are not deduplicated or sanitized; two
                // originals with the same name follow the archive's
                // last-write-wins semantics.
                let entry_name = format!("{}{}", COMPRESSED_PREFIX, pair.original.name);
                zip.start_file(entry_name, options).map_err(|e| {
                    DomainError::Archive(format!("Failed to start archive entry: {}", e))
                })?;
                zip.write_all(&pair.reduced.data).map_err(|e| {
                    DomainError::Archive(format!("Failed to write archive entry: {}", e))
                })?;
            }

            let cursor = zip
                .finish()
                .map_err(|e| DomainError::Archive(format!("Failed to finish archive: {}", e)))?;

            Ok(Some(DownloadUnit {
                filename: ARCHIVE_FILENAME.to_string(),
                mime_type: "application/zip".to_string(),
                data: cursor.into_inner(),
            }))
        }
    }
}
