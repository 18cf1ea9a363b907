// Frame grabbers that replay recorded screenshots instead of reading the screen
use super::error::{CaptureError, CaptureResult};
use super::types::{CaptureRegion, ChannelOrder, Frame, FrameGrabber};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cycles through the PNG/JPEG screenshots found in a directory.
///
/// Each `capture` crops the next screenshot to the requested region and hands it
/// out in BGRA order, the layout desktop grabbers produce.
pub struct ReplayFrameGrabber {
    frames: Vec<DynamicImage>,
    next: AtomicUsize,
    screen_width: u32,
    screen_height: u32,
}

impl ReplayFrameGrabber {
    pub fn from_dir(dir: &Path) -> CaptureResult<Self> {
        let paths = scan_frame_files(dir)?;
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let img = image::open(&path).map_err(|source| CaptureError::Decode {
                path: path.clone(),
                source,
            })?;
            frames.push(img);
        }
        Self::from_images(frames).ok_or_else(|| CaptureError::NoFrames {
            path: dir.to_path_buf(),
        })
    }

    pub fn from_images(frames: Vec<DynamicImage>) -> Option<Self> {
        let first = frames.first()?;
        let (screen_width, screen_height) = (first.width(), first.height());
        log::info!(
            "🎞️ Replay grabber loaded {} frames ({}x{})",
            frames.len(),
            screen_width,
            screen_height
        );
        Some(Self {
            frames,
            next: AtomicUsize::new(0),
            screen_width,
            screen_height,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameGrabber for ReplayFrameGrabber {
    fn capture(&self, region: &CaptureRegion) -> CaptureResult<Frame> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        let img = &self.frames[index];
        let clipped = region.clip_to_screen(img.width(), img.height());
        if !clipped.is_valid() {
            return Err(CaptureError::InvalidRegion {
                left: region.left,
                top: region.top,
                width: region.width,
                height: region.height,
            });
        }
        let cropped = img.crop_imm(clipped.left, clipped.top, clipped.width, clipped.height);
        Ok(Frame::from_image(&cropped, ChannelOrder::Bgra))
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Hands out a fixed list of frames in order, repeating the last one.
///
/// The region is ignored; frames are returned as given.
pub struct ScriptedFrameGrabber {
    frames: Mutex<Vec<Frame>>,
    cursor: AtomicUsize,
}

impl ScriptedFrameGrabber {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: Mutex::new(frames),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn captures(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl FrameGrabber for ScriptedFrameGrabber {
    fn capture(&self, region: &CaptureRegion) -> CaptureResult<Frame> {
        let frames = self.frames.lock().unwrap_or_else(|p| p.into_inner());
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        frames
            .get(index)
            .or_else(|| frames.last())
            .cloned()
            .ok_or(CaptureError::InvalidRegion {
                left: region.left,
                top: region.top,
                width: region.width,
                height: region.height,
            })
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        let frames = self.frames.lock().unwrap_or_else(|p| p.into_inner());
        frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Scan a directory for screenshot files, sorted by name for a stable replay order
fn scan_frame_files(dir: &Path) -> CaptureResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| CaptureError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                    .unwrap_or(false)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(CaptureError::NoFrames {
            path: dir.to_path_buf(),
        });
    }
    Ok(paths)
}
