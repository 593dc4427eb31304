//! bandviz - five-band spectral analysis synced to a render loop.

pub mod audio;
pub mod config;
pub mod encode;
pub mod export;
pub mod render;
pub mod sync;
