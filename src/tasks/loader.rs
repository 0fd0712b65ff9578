use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use image::{ImageError, imageops::FilterType};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::assets::AssetId;
use crate::error::ShowcaseError;
use crate::events::{LoadTexture, PreparedTexture, TextureEvent};

/// Decode an image to RGBA8, shrinking it to fit `max_dimension` on both
/// sides while keeping its aspect ratio.
pub fn decode_texture(path: &Path, max_dimension: u32) -> Result<image::RgbaImage, ShowcaseError> {
    let decode = || -> Result<image::DynamicImage, ImageError> {
        image::ImageReader::open(path)
            .map_err(ImageError::IoError)?
            .with_guessed_format()
            .map_err(ImageError::IoError)?
            .decode()
    };
    let img = decode().map_err(|source| ShowcaseError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let max = max_dimension.max(1);
    let img = if img.width() > max || img.height() > max {
        debug!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            max,
            "downscaling oversized texture"
        );
        img.resize(max, max, FilterType::Triangle)
    } else {
        img
    };
    Ok(img.to_rgba8())
}

fn prepare(request: LoadTexture, max_dimension: u32) -> TextureEvent {
    match decode_texture(&request.path, max_dimension) {
        Ok(rgba8) => {
            let (width, height) = rgba8.dimensions();
            TextureEvent::Loaded(PreparedTexture {
                id: request.id,
                path: request.path,
                width,
                height,
                pixels: rgba8.into_raw(),
            })
        }
        Err(err) => TextureEvent::Failed {
            id: request.id,
            path: request.path,
            reason: err.to_string(),
        },
    }
}

/// Decode requested textures off the async runtime, at most `max_in_flight`
/// at a time, and forward every outcome to the viewer.
pub async fn run(
    mut load_rx: Receiver<LoadTexture>,
    to_viewer: Sender<TextureEvent>,
    cancel: CancellationToken,
    max_in_flight: usize,
    max_dimension: u32,
) -> Result<()> {
    let max_in_flight = max_in_flight.max(1);
    let mut in_flight: HashSet<AssetId> = HashSet::new();
    let mut tasks: JoinSet<(AssetId, TextureEvent)> = JoinSet::new();

    loop {
        select! {
            _ = cancel.cancelled() => break,

            Some(request) = load_rx.recv(), if in_flight.len() < max_in_flight => {
                if in_flight.insert(request.id) {
                    let id = request.id;
                    tasks.spawn(async move {
                        let path = request.path.clone();
                        let event = match tokio::task::spawn_blocking(move || prepare(request, max_dimension)).await {
                            Ok(event) => event,
                            Err(err) => TextureEvent::Failed {
                                id,
                                path,
                                reason: format!("decode task failed: {err}"),
                            },
                        };
                        (id, event)
                    });
                }
            }

            Some(join_res) = tasks.join_next() => {
                if let Ok((id, event)) = join_res {
                    in_flight.remove(&id);
                    match &event {
                        TextureEvent::Loaded(texture) => {
                            debug!(path = %texture.path.display(), "decoded texture");
                        }
                        TextureEvent::Failed { path, reason, .. } => {
                            debug!(path = %path.display(), reason = %reason, "texture decode failed");
                        }
                    }
                    if to_viewer.send(event).await.is_err() {
                        debug!("viewer dropped texture channel; stopping loader");
                        break;
                    }
                }
            }

            else => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_images_are_downscaled_keeping_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbaImage::from_pixel(64, 16, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let img = decode_texture(&path, 32).unwrap();
        assert_eq!(img.dimensions(), (32, 8));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = decode_texture(Path::new("/nonexistent/hero.png"), 4096).unwrap_err();
        assert!(matches!(err, ShowcaseError::Decode { .. }));
    }
}
