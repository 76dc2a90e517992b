use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::staging::StagedSelection;

/// Longest edge of a generated preview thumbnail.
const PREVIEW_MAX_DIMENSION: u32 = 200;
const PREVIEW_JPEG_QUALITY: u8 = 60;

/// One rendered preview, carrying the removal control's positional index as
/// of the render pass that produced it. `file_id` is the stable handle; the
/// index dies with the pass.
#[derive(Debug, Clone)]
pub struct PreviewBlock {
    pub file_id: Uuid,
    pub index: usize,
    pub file_name: String,
    pub data_url: String,
}

/// Rebuilds the full preview list after every selection mutation.
///
/// There is no incremental diffing; expected selections are small. Each
/// rebuild is a numbered pass, and starting a new pass cancels any pass still
/// decoding, at the next file boundary. A cancelled pass contributes nothing.
#[derive(Debug, Default)]
pub struct PreviewRenderer {
    generation: Arc<AtomicU64>,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down and rebuild previews for every image file in the selection.
    pub async fn render(&self, selection: &StagedSelection) -> Vec<PreviewBlock> {
        let pass = self.begin_pass();
        self.render_pass(pass, selection).await
    }

    fn begin_pass(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn render_pass(&self, pass: u64, selection: &StagedSelection) -> Vec<PreviewBlock> {
        // Snapshot up front; the indices below are only meaningful for the
        // selection as it stood when this pass began.
        let snapshot: Vec<(usize, Uuid, String, Bytes)> = selection
            .files()
            .iter()
            .enumerate()
            .filter(|(_, file)| file.is_previewable())
            .map(|(index, file)| (index, file.id, file.name.clone(), file.bytes.clone()))
            .collect();

        let mut blocks = Vec::with_capacity(snapshot.len());

        for (index, file_id, file_name, bytes) in snapshot {
            if self.generation.load(Ordering::SeqCst) != pass {
                log::debug!("Preview pass {} superseded, discarding partial render", pass);
                return Vec::new();
            }

            let decoded = tokio::task::spawn_blocking(move || decode_preview(&bytes)).await;

            match decoded {
                Ok(Ok(data_url)) => blocks.push(PreviewBlock {
                    file_id,
                    index,
                    file_name,
                    data_url,
                }),
                Ok(Err(e)) => {
                    log::warn!("Skipping preview for {}: {}", file_name, e);
                }
                Err(e) => {
                    log::error!("Preview decode task panicked for {}: {}", file_name, e);
                }
            }
        }

        if self.generation.load(Ordering::SeqCst) != pass {
            return Vec::new();
        }

        blocks
    }
}

/// Decode an image and produce a displayable JPEG thumbnail as a data URL.
fn decode_preview(bytes: &[u8]) -> AppResult<String> {
    let img = image::load_from_memory(bytes)?;
    let thumbnail = img.thumbnail(PREVIEW_MAX_DIMENSION, PREVIEW_MAX_DIMENSION);

    // JPEG has no alpha channel
    let rgb = thumbnail.to_rgb8();

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut output), PREVIEW_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(output)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::StagedFile;
    use image::codecs::png::PngEncoder;
    use image::RgbImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([120, 80, 200]));
        let mut output = Vec::new();
        img.write_with_encoder(PngEncoder::new(Cursor::new(&mut output)))
            .expect("encode test PNG");
        output
    }

    fn image_file(name: &str) -> StagedFile {
        StagedFile::new(name, "image/png", png_bytes(4, 4))
    }

    #[tokio::test]
    async fn test_render_produces_one_block_per_image_file() {
        let mut selection = StagedSelection::new();
        selection.add([image_file("a.png"), image_file("b.png")]);

        let renderer = PreviewRenderer::new();
        let blocks = renderer.render(&selection).await;

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 0);
        assert_eq!(blocks[1].index, 1);
        assert!(blocks[0].data_url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_non_image_files_keep_their_selection_index() {
        let mut selection = StagedSelection::new();
        selection.add([
            image_file("a.png"),
            StagedFile::new("notes.pdf", "application/pdf", vec![1u8]),
            image_file("c.png"),
        ]);

        let blocks = PreviewRenderer::new().render(&selection).await;

        // The PDF gets no block, but the indices still address the full
        // selection so removal controls stay correct.
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 0);
        assert_eq!(blocks[1].index, 2);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_skipped_not_fatal() {
        let mut selection = StagedSelection::new();
        selection.add([
            StagedFile::new("broken.png", "image/png", vec![0u8; 16]),
            image_file("ok.png"),
        ]);

        let blocks = PreviewRenderer::new().render(&selection).await;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].file_name, "ok.png");
        assert_eq!(blocks[0].index, 1);
    }

    #[tokio::test]
    async fn test_superseded_pass_contributes_no_blocks() {
        let mut selection = StagedSelection::new();
        selection.add([image_file("a.png"), image_file("b.png")]);

        let renderer = PreviewRenderer::new();
        let stale_pass = renderer.begin_pass();
        let current_pass = renderer.begin_pass();

        let stale = renderer.render_pass(stale_pass, &selection).await;
        assert!(stale.is_empty());

        let current = renderer.render_pass(current_pass, &selection).await;
        assert_eq!(current.len(), 2);
    }
}
