/// Pixel layout of a decoded frame as reported by the capture backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3 bytes per pixel, R G B order.
    Rgb,
    /// 1 byte per pixel, luma only.
    Gray,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Gray => 1,
        }
    }
}

/// A single decoded video frame. Produced and consumed per tick, never retained.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

impl Frame {
    /// Normalizes to 3-channel RGB before display: pass-through for color
    /// frames, per-pixel expansion for grayscale ones.
    pub fn into_rgb(self) -> Frame {
        match self.layout {
            PixelLayout::Rgb => self,
            PixelLayout::Gray => {
                let mut rgb = Vec::with_capacity(self.data.len() * 3);
                for &luma in &self.data {
                    rgb.push(luma);
                    rgb.push(luma);
                    rgb.push(luma);
                }
                Frame {
                    width: self.width,
                    height: self.height,
                    layout: PixelLayout::Rgb,
                    data: rgb,
                }
            }
        }
    }

}

/// An open decoding session against a source descriptor (file path, URL, or
/// device string). Descriptors are opaque and passed through unmodified.
///
/// `read_frame` returning `None` means either a transient read failure or
/// genuine end-of-stream; a single read cannot tell them apart, so callers
/// retry once before concluding end-of-stream.
pub trait CaptureSource {
    /// Attempts to begin decoding. Returns whether a decodable stream was
    /// established. May block for as long as the underlying source stalls.
    fn open(&mut self, descriptor: &str) -> bool;

    fn is_opened(&self) -> bool;

    /// Closes the handle. Safe to call on an already-closed handle.
    fn release(&mut self);

    /// Native frame rate of the stream. Only meaningful while open; returns
    /// 0.0 when closed.
    fn frame_rate(&self) -> f64;

    /// Pulls the next decoded frame. May block on I/O.
    fn read_frame(&mut self) -> Option<Frame>;
}
