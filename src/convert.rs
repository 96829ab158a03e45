use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::{DynamicImage, ImageBuffer};

use crate::buffer::PixelBuffer;
use crate::node::error::Result;

impl PixelBuffer {
	/// Copies a decoded image into a `PixelBuffer`.
	///
	/// 8-bit gray, gray-alpha, RGB and RGBA images keep their channel
	/// layout; anything else (16-bit, float) is converted to 8-bit RGBA.
	pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
		let (width, height) = (img.width(), img.height());
		let (channels, data) = match img {
			DynamicImage::ImageLuma8(b) => (1, b.as_raw().clone()),
			DynamicImage::ImageLumaA8(b) => (2, b.as_raw().clone()),
			DynamicImage::ImageRgb8(b) => (3, b.as_raw().clone()),
			DynamicImage::ImageRgba8(b) => (4, b.as_raw().clone()),
			other => {
				log::debug!("converting {:?} image to 8-bit RGBA", other.color());
				(4, other.to_rgba8().into_raw())
			}
		};
		Self::new(width, height, channels, data)
	}

	/// Wraps the buffer as the 8-bit `DynamicImage` variant matching its
	/// channel count, ready for encoding.
	pub fn into_dynamic(self) -> Result<DynamicImage> {
		let (width, height, channels) = (self.width(), self.height(), self.channels());
		let data = self.into_bytes();
		let img = match channels {
			1 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
			2 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
			3 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
			_ => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
		};
		img.ok_or_else(|| ImageError::Parameter(
			ParameterError::from_kind(ParameterErrorKind::DimensionMismatch)
		).into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_rgb_layout() {
		let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3])));
		let buf = PixelBuffer::from_dynamic(&img).unwrap();
		assert_eq!((buf.width(), buf.height(), buf.channels()), (3, 2, 3));
		assert_eq!(buf.pixel(2, 1), Some(&[1u8, 2, 3][..]));
		assert_eq!(buf.into_dynamic().unwrap(), img);
	}

	#[test]
	fn widens_sixteen_bit_to_rgba() {
		let img = DynamicImage::ImageLuma16(image::ImageBuffer::from_pixel(2, 2, image::Luma([u16::MAX])));
		let buf = PixelBuffer::from_dynamic(&img).unwrap();
		assert_eq!(buf.channels(), 4);
		assert_eq!(buf.pixel(0, 0), Some(&[255u8, 255, 255, 255][..]));
	}

	#[test]
	fn gray_alpha_round_trips() {
		let buf = PixelBuffer::new(2, 1, 2, vec![10, 20, 30, 40]).unwrap();
		match buf.clone().into_dynamic().unwrap() {
			DynamicImage::ImageLumaA8(b) => assert_eq!(b.into_raw(), buf.into_bytes()),
			other => panic!("unexpected variant {:?}", other.color()),
		}
	}
}
