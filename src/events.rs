use std::path::PathBuf;

use crate::assets::AssetId;

/// Request for the loader to decode one catalog asset.
#[derive(Debug, Clone)]
pub struct LoadTexture {
    pub id: AssetId,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PreparedTexture {
    pub id: AssetId,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Loader outcome, consumed by the viewer on the next frame.
#[derive(Debug, Clone)]
pub enum TextureEvent {
    Loaded(PreparedTexture),
    Failed {
        id: AssetId,
        path: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Manual selection of a hero slide by index.
    SelectSlide(usize),
    /// Move to the slide after the currently requested one (timer, SIGUSR1).
    AdvanceSlide,
    /// Switch between the hero and gallery sections.
    ToggleSection,
}
