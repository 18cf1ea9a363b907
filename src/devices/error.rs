use super::types::MouseButton;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for input injection.
pub type InjectionResult<T> = Result<T, InjectionError>;

/// A specialized `Result` type for frame capture.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Failure reported by an [`InputInjector`](super::InputInjector).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InjectionError {
    #[error("Failed to {operation} {button} button: {description}")]
    Failed {
        operation: &'static str,
        button: MouseButton,
        description: String,
    },

    #[error("Click count must be at least 1 (got {count})")]
    InvalidClickCount { count: u32 },

    #[error("Input device is not available: {description}")]
    Unavailable { description: String },
}

/// Failure reported by a [`FrameGrabber`](super::FrameGrabber).
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture region {width}x{height} at ({left},{top}) is empty or outside the screen")]
    InvalidRegion {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    },

    #[error("No frames found in {path:?}")]
    NoFrames { path: PathBuf },

    #[error("Failed to read frame source {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode frame {path:?}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Capture task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },
}

/// Failure reported by an [`EventSource`](super::EventSource) while listening.
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("Key event stream failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
