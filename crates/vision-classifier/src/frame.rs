//! Non-owning image views handed to the engine.

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

/// Pixel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameFormat {
    /// Interleaved RGB, 8 bits per channel
    #[default]
    Rgb,
}

impl FrameFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Rgb => 3,
        }
    }
}

/// Borrowed view over a caller-owned pixel buffer.
///
/// The view lives exactly as long as the classify call that built it: the
/// `'a` lifetime ties it to the caller's slice, so it cannot be stored past
/// that call. No bytes are copied.
///
/// Construction does not check the buffer length against the dimensions.
/// The engine owns format validation and reports a short buffer as a
/// classification failure; [`FrameView::expected_len`] is there to help it.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    data: &'a [u8],
    dimension: Dimension,
    format: FrameFormat,
}

impl<'a> FrameView<'a> {
    /// Wrap a row-major RGB buffer without padding.
    pub fn from_rgb_raw(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            dimension: Dimension::new(width, height),
            format: FrameFormat::Rgb,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Bytes the declared dimensions require.
    pub fn expected_len(&self) -> usize {
        self.dimension
            .pixels()
            .saturating_mul(self.format.bytes_per_pixel())
    }

    /// True if the buffer covers the declared dimensions.
    pub fn is_complete(&self) -> bool {
        self.data.len() >= self.expected_len()
    }

    fn stride(&self) -> usize {
        (self.dimension.width as usize).saturating_mul(self.format.bytes_per_pixel())
    }

    /// One row of pixel data, or `None` if out of bounds or truncated.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.dimension.height {
            return None;
        }
        let stride = self.stride();
        let start = (y as usize).checked_mul(stride)?;
        self.data.get(start..start.checked_add(stride)?)
    }

    /// RGB triple at `(x, y)`, or `None` if out of bounds or truncated.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.dimension.width {
            return None;
        }
        let row = self.row(y)?;
        let i = x as usize * self.format.bytes_per_pixel();
        Some([row[i], row[i + 1], row[i + 2]])
    }
}
