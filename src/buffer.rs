use crate::node::error::{Error, Result};

/// Largest number of channels a pixel may have (RGBA).
pub const MAX_CHANNELS: usize = 4;

/// One pixel's channel values.
///
/// Only the first `channels` entries are meaningful for a buffer with
/// `channels` channels; the remainder are zero.
pub type Color = [u8; MAX_CHANNELS];

/// Axis-aligned rectangle inside a `PixelBuffer`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

impl Region {
	pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
		Self { x, y, width, height }
	}

	/// Number of pixels covered.
	pub fn area(&self) -> u64 {
		self.width as u64 * self.height as u64
	}

	/// Exclusive right edge.
	pub fn right(&self) -> u32 {
		self.x + self.width
	}

	/// Exclusive bottom edge.
	pub fn bottom(&self) -> u32 {
		self.y + self.height
	}

	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Whether the region can be divided into four non-empty quadrants.
	pub fn is_splittable(&self) -> bool {
		self.width >= 2 && self.height >= 2
	}

	/// Divides the region into quadrants ordered top-left, top-right,
	/// bottom-left, bottom-right.
	///
	/// When a dimension is odd the left/top quadrants take the extra unit,
	/// so the quadrants always tile the region exactly. Returns `None` for
	/// regions narrower or shorter than two pixels.
	pub fn split(&self) -> Option<[Region; 4]> {
		if !self.is_splittable() {
			return None;
		}
		let left_w = self.width - self.width / 2;
		let top_h = self.height - self.height / 2;
		let (right_w, bottom_h) = (self.width - left_w, self.height - top_h);
		let (mid_x, mid_y) = (self.x + left_w, self.y + top_h);
		Some([
			Region::new(self.x, self.y, left_w, top_h),
			Region::new(mid_x, self.y, right_w, top_h),
			Region::new(self.x, mid_y, left_w, bottom_h),
			Region::new(mid_x, mid_y, right_w, bottom_h),
		])
	}
}

/// Dense row-major image of 8-bit channel values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
	width: u32,
	height: u32,
	channels: usize,
	data: Vec<u8>,
}

impl PixelBuffer {
	/// Wraps raw pixel data.
	///
	/// `data` must hold exactly `width * height * channels` bytes, and
	/// `channels` must be between 1 and `MAX_CHANNELS`.
	pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
		if channels == 0 || channels > MAX_CHANNELS {
			return Err(Error::UnsupportedChannels(channels));
		}
		let expected = width as usize * height as usize * channels;
		if data.len() != expected {
			return Err(Error::BufferSize { expected, actual: data.len() });
		}
		Ok(Self { width, height, channels, data })
	}

	/// Creates a buffer with every pixel set to `color`.
	pub fn filled(width: u32, height: u32, channels: usize, color: Color) -> Result<Self> {
		if channels == 0 || channels > MAX_CHANNELS {
			return Err(Error::UnsupportedChannels(channels));
		}
		let data = color[..channels].iter()
			.copied()
			.cycle()
			.take(width as usize * height as usize * channels)
			.collect();
		Self::new(width, height, channels, data)
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn channels(&self) -> usize {
		self.channels
	}

	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Region covering the whole buffer.
	pub fn region(&self) -> Region {
		Region::new(0, 0, self.width, self.height)
	}

	/// Whether `region` lies entirely within the buffer.
	pub fn contains_region(&self, region: &Region) -> bool {
		// Widened so edges past u32::MAX can't wrap
		region.x as u64 + region.width as u64 <= self.width as u64 &&
			region.y as u64 + region.height as u64 <= self.height as u64
	}

	/// Bytes per row.
	pub fn stride(&self) -> usize {
		self.width as usize * self.channels
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
		&mut self.data
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.data
	}

	/// Channel values of the pixel at `(x, y)`, or `None` outside the buffer.
	pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
		if x >= self.width || y >= self.height {
			return None;
		}
		let start = y as usize * self.stride() + x as usize * self.channels;
		Some(&self.data[start..start + self.channels])
	}

	/// The bytes of row `y` that fall inside `region`.
	pub(crate) fn row_span(&self, region: &Region, y: u32) -> &[u8] {
		let start = y as usize * self.stride() + region.x as usize * self.channels;
		&self.data[start..start + region.width as usize * self.channels]
	}
}
