//! Renderer error type

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Invalid frame size {width}x{height}: both dimensions must be at least 1")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Thread count must be at least 1")]
    InvalidThreadCount,

    #[error("Failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write frame: {0}")]
    Io(#[from] std::io::Error),
}
