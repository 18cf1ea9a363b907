//! Single-color tolerance matching over captured frames

use crate::devices::Frame;
use image::Rgb;
use serde::{Deserialize, Serialize};

/// Color to look for, with a per-channel tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Allowed difference (+/-) on each channel
    pub tolerance: u8,
}

impl TargetColor {
    pub fn new(r: u8, g: u8, b: u8, tolerance: u8) -> Self {
        Self { r, g, b, tolerance }
    }

    pub fn rgb(&self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}

impl Default for TargetColor {
    fn default() -> Self {
        // Bobber red
        Self::new(181, 36, 35, 20)
    }
}

fn channel_in_range(sample: u8, target: u8, tolerance: u8) -> bool {
    let lower = target.saturating_sub(tolerance);
    let upper = target.saturating_add(tolerance);
    (lower..=upper).contains(&sample)
}

/// True when every RGB channel of `sample` is within `tolerance` of `target`.
///
/// Bounds are clamped to 0..=255, so a target of 250 with tolerance 20 accepts 230..=255.
pub fn matches(sample: Rgb<u8>, target: Rgb<u8>, tolerance: u8) -> bool {
    channel_in_range(sample[0], target[0], tolerance)
        && channel_in_range(sample[1], target[1], tolerance)
        && channel_in_range(sample[2], target[2], tolerance)
}

/// Row of the first matching pixel in row-major scan order, or `None`.
///
/// Rows are scanned top to bottom and each row left to right; the first hit wins
/// even if a closer match appears later. Channels are read according to the
/// frame's [`ChannelOrder`](crate::devices::ChannelOrder).
pub fn locate(frame: &Frame, target: Rgb<u8>, tolerance: u8) -> Option<u32> {
    let width = frame.width() as usize;
    if width == 0 {
        return None;
    }
    (0..frame.pixel_count())
        .find(|&i| {
            frame
                .pixel_at(i)
                .is_some_and(|sample| matches(sample, target, tolerance))
        })
        .map(|i| (i / width) as u32)
}

/// Convenience wrapper taking the target and tolerance from a [`TargetColor`].
pub fn locate_target(frame: &Frame, target: &TargetColor) -> Option<u32> {
    locate(frame, target.rgb(), target.tolerance)
}
