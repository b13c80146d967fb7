//! Image size reduction using the `image` crate.

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageEncoder, ImageFormat};
use tokio::task;

use crate::errors::{DomainError, DomainResult};

use super::super::types::{ImageReductionConfig, ReducedPayload};
use super::Compressor;

/// Reduces images by downscaling the longer edge and re-encoding toward a
/// fixed size target. Handles the whole `image/*` family.
#[derive(Clone)]
pub struct ImageCompressor {
    config: ImageReductionConfig,
}

impl ImageCompressor {
    pub fn new() -> Self {
        Self {
            config: ImageReductionConfig::default(),
        }
    }

    pub fn with_config(config: ImageReductionConfig) -> Self {
        Self { config }
    }
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Compressor for ImageCompressor {
    fn can_handle(&self, mime_type: &str) -> bool {
        mime_type.starts_with("image/")
    }

    async fn compress(&self, data: Vec<u8>) -> DomainResult<ReducedPayload> {
        let config = self.config.clone();

        // Run image operations in a blocking task to avoid blocking the runtime
        task::spawn_blocking(move || -> DomainResult<ReducedPayload> {
            let format = image::guess_format(&data)
                .map_err(|e| DomainError::Image(format!("Failed to detect image format: {}", e)))?;

            let img = image::load_from_memory(&data)
                .map_err(|e| DomainError::Image(format!("Failed to load image: {}", e)))?;

            let (width, height) = img.dimensions();
            let img = if width.max(height) > config.max_edge_px {
                // thumbnail preserves the aspect ratio within the bounding box
                img.thumbnail(config.max_edge_px, config.max_edge_px)
            } else {
                img
            };

            // PNG input stays PNG when best-compression output already fits
            // the size target; everything else goes through JPEG.
            if format == ImageFormat::Png {
                let output = encode_png(&img)?;
                if output.len() <= config.max_size_bytes {
                    return Ok(ReducedPayload {
                        data: output,
                        mime_type: "image/png".to_string(),
                    });
                }
            }

            encode_jpeg_to_target(&img, &config)
        })
        .await
        .map_err(|e| DomainError::Internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "ImageCompressor"
    }
}

fn encode_png(img: &DynamicImage) -> DomainResult<Vec<u8>> {
    let mut output = Vec::new();
    let png = img.to_rgba8();
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut output,
        image::codecs::png::CompressionType::Best,
        image::codecs::png::FilterType::Adaptive,
    );
    encoder
        .write_image(&png, png.width(), png.height(), image::ColorType::Rgba8)
        .map_err(|e| DomainError::Image(format!("PNG encoding error: {}", e)))?;
    Ok(output)
}

/// Encode as JPEG, stepping the quality down until the output fits the
/// size target or the quality floor is reached. Best effort: the floor
/// result is returned even when it overshoots the target.
fn encode_jpeg_to_target(
    img: &DynamicImage,
    config: &ImageReductionConfig,
) -> DomainResult<ReducedPayload> {
    // JPEG has no alpha channel; flatten before encoding
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut quality = config.initial_quality;
    loop {
        let mut output = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| DomainError::Image(format!("JPEG encoding error: {}", e)))?;

        if output.len() <= config.max_size_bytes || quality <= config.min_quality {
            return Ok(ReducedPayload {
                data: output,
                mime_type: "image/jpeg".to_string(),
            });
        }
        quality = quality
            .saturating_sub(config.quality_step)
            .max(config.min_quality);
    }
}
