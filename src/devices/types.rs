// Core device types and the three service contracts the controller drives
use super::error::{CaptureResult, InjectionResult, ListenError};
use image::{DynamicImage, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        };
        f.write_str(name)
    }
}

impl FromStr for MouseButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            other => Err(format!("unknown mouse button '{other}'")),
        }
    }
}

/// Name of a physical key as delivered by an [`EventSource`].
///
/// Names are compared case-insensitively, so `F6`, `f6` and ` f6 ` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeySymbol(String);

impl KeySymbol {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for KeySymbol {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<&str> for KeySymbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<KeySymbol> for String {
    fn from(key: KeySymbol) -> Self {
        key.0
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Screen rectangle handed to a [`FrameGrabber`], in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Box centred on the screen covering `fraction` of its width and height.
    pub fn centered(screen_width: u32, screen_height: u32, fraction: f32) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let width = (screen_width as f32 * fraction) as u32;
        let height = (screen_height as f32 * fraction) as u32;
        Self {
            left: (screen_width / 2).saturating_sub(width / 2),
            top: (screen_height / 2).saturating_sub(height / 2),
            width,
            height,
        }
    }

    /// Clip region to screen boundaries
    pub fn clip_to_screen(mut self, screen_width: u32, screen_height: u32) -> Self {
        self.left = self.left.min(screen_width.saturating_sub(1));
        self.top = self.top.min(screen_height.saturating_sub(1));
        self.width = self.width.min(screen_width.saturating_sub(self.left));
        self.height = self.height.min(screen_height.saturating_sub(self.top));
        self
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Default for CaptureRegion {
    fn default() -> Self {
        // 15% of a 1920x1080 screen, centred
        Self::centered(1920, 1080, 0.15)
    }
}

/// Byte layout of one pixel inside a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    Rgba,
    Bgr,
    /// Layout produced by most desktop screen grabbers
    Bgra,
}

impl ChannelOrder {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ChannelOrder::Rgb | ChannelOrder::Bgr => 3,
            ChannelOrder::Rgba | ChannelOrder::Bgra => 4,
        }
    }

    /// Offsets of the red, green and blue bytes within one pixel.
    pub fn rgb_offsets(self) -> (usize, usize, usize) {
        match self {
            ChannelOrder::Rgb | ChannelOrder::Rgba => (0, 1, 2),
            ChannelOrder::Bgr | ChannelOrder::Bgra => (2, 1, 0),
        }
    }
}

/// Row-major block of color samples for one captured region.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    order: ChannelOrder,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, order: ChannelOrder, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            order,
            data,
        }
    }

    /// Frame of a single color, mostly useful as a test fixture.
    pub fn filled(width: u32, height: u32, order: ChannelOrder, color: Rgb<u8>) -> Self {
        let mut frame = Self::new(
            width,
            height,
            order,
            vec![0; width as usize * height as usize * order.bytes_per_pixel()],
        );
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, color);
            }
        }
        frame
    }

    /// Re-encodes a decoded image into the given channel order.
    pub fn from_image(img: &DynamicImage, order: ChannelOrder) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let bpp = order.bytes_per_pixel();
        let (ri, gi, bi) = order.rgb_offsets();
        let mut data = vec![0u8; width as usize * height as usize * bpp];
        for (i, px) in rgba.pixels().enumerate() {
            let base = i * bpp;
            data[base + ri] = px[0];
            data[base + gi] = px[1];
            data[base + bi] = px[2];
            if bpp == 4 {
                data[base + 3] = px[3];
            }
        }
        Self::new(width, height, order, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of complete pixels actually present in the buffer.
    pub fn pixel_count(&self) -> usize {
        let declared = self.width as usize * self.height as usize;
        declared.min(self.data.len() / self.order.bytes_per_pixel())
    }

    /// Sample at (x, y) as RGB, or `None` when outside the frame or the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb<u8>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixel_at(index)
    }

    pub(crate) fn pixel_at(&self, index: usize) -> Option<Rgb<u8>> {
        let bpp = self.order.bytes_per_pixel();
        let base = index * bpp;
        let px = self.data.get(base..base + bpp)?;
        let (ri, gi, bi) = self.order.rgb_offsets();
        Some(Rgb([px[ri], px[gi], px[bi]]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.order.bytes_per_pixel();
        let base = (y as usize * self.width as usize + x as usize) * bpp;
        let (ri, gi, bi) = self.order.rgb_offsets();
        if let Some(px) = self.data.get_mut(base..base + bpp) {
            px[ri] = color[0];
            px[gi] = color[1];
            px[bi] = color[2];
            if bpp == 4 {
                px[3] = 255;
            }
        }
    }
}

// Trait defining synthetic mouse input (OS hook, dry run, test double)
pub trait InputInjector: Send + Sync {
    fn press(&self, button: MouseButton) -> InjectionResult<()>;
    fn release(&self, button: MouseButton) -> InjectionResult<()>;
    fn click(&self, button: MouseButton, count: u32) -> InjectionResult<()>;
    fn name(&self) -> &str;
}

// Trait defining region capture; must be cheap enough to call at >= 3 Hz
pub trait FrameGrabber: Send + Sync {
    fn capture(&self, region: &CaptureRegion) -> CaptureResult<Frame>;
    fn screen_dimensions(&self) -> (u32, u32);
    fn name(&self) -> &str;
}

/// Source of key-down notifications.
///
/// `listen` blocks on its own thread and invokes `handler` once per key-down until
/// the source is exhausted. The handler must return quickly.
pub trait EventSource: Send {
    fn listen(&mut self, handler: &mut dyn FnMut(KeySymbol)) -> Result<(), ListenError>;
}
