pub mod assets;
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod gpu;
pub mod hero;
pub mod motion;
pub mod stage;
pub mod tasks {
    pub mod autoplay;
    pub mod loader;
    pub mod viewer;
}
