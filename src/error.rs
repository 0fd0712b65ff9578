use std::path::PathBuf;

use thiserror::Error;

/// Library error type for showcase operations.
#[derive(Debug, Error)]
pub enum ShowcaseError {
    /// An image could not be opened or decoded into a texture.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A manual slide selection pointed past the end of the slide list.
    #[error("slide {index} is out of range (slides: {len})")]
    SlideOutOfRange { index: usize, len: usize },

    /// A gallery item index that does not exist on the ring.
    #[error("gallery item {index} is out of range (items: {len})")]
    ItemOutOfRange { index: usize, len: usize },

    /// Decoded pixels do not match the reported dimensions.
    #[error("{path} reports {width}x{height} but carries {bytes} bytes")]
    TextureSize {
        path: PathBuf,
        width: u32,
        height: u32,
        bytes: usize,
    },

    /// A decoded image exceeds the device's 2D texture limit.
    #[error("{path} is {width}x{height}, larger than the device limit of {limit}")]
    TextureTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        limit: u32,
    },
}
