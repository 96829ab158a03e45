use thiserror::Error;

use crate::buffer::Region;

/// Reason why an image couldn't be turned into a quadtree or rendered back.
#[derive(Debug, Error)]
pub enum Error {
	/// A tuning parameter is outside its allowed range.
	#[error("invalid parameter {name}: {value}")]
	InvalidParameter { name: &'static str, value: String },
	/// A region has zero area or extends past the buffer. Only reachable
	/// through a bug in the builder.
	#[error("invalid region: {0:?}")]
	InvalidRegion(Region),
	/// The input image has no pixels.
	#[error("empty image: no pixels to process")]
	EmptyBuffer,
	/// The pixel data length doesn't match the stated dimensions.
	#[error("pixel data has {actual} bytes, expected {expected}")]
	BufferSize { expected: usize, actual: usize },
	/// The channel count is zero or more than four.
	#[error("unsupported channel count: {0}")]
	UnsupportedChannels(usize),
	/// A render target's dimensions differ from the quadtree's root region.
	#[error("render target is {actual:?}, quadtree covers {expected:?}")]
	DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },
	/// An image couldn't be converted to or from the `image` crate's types.
	#[error("image error: {0}")]
	Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
