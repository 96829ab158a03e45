use crate::buffer::{Color, PixelBuffer, MAX_CHANNELS};
use super::error::{Error, Result};
use super::NodeKind;

/// Color of leaf outlines in the visualization. Alpha channels, where
/// present, are drawn fully opaque instead.
pub const OUTLINE_COLOR: Color = [0; MAX_CHANNELS];

/// `OUTLINE_COLOR` adjusted for a pixel layout with `channels` channels.
fn outline_marker(channels: usize) -> Color {
	let mut marker = OUTLINE_COLOR;
	// Gray-alpha and RGBA keep alpha in the last channel
	if channels == 2 || channels == 4 {
		marker[channels - 1] = u8::MAX;
	}
	marker
}

impl super::QuadtreeNode {
	/// Paints every leaf's color over its region into a new buffer with
	/// `channels` channels.
	///
	/// The tree must be rooted at the image origin, as trees from `build` are.
	pub fn render(&self, channels: usize) -> Result<PixelBuffer> {
		let mut out = PixelBuffer::filled(self.region.right(), self.region.bottom(), channels, [0; MAX_CHANNELS])?;
		self.render_into(&mut out)?;
		Ok(out)
	}

	/// Like `render`, then outlines each leaf's region with a
	/// one-pixel border of `OUTLINE_COLOR`.
	pub fn render_outlines(&self, channels: usize) -> Result<PixelBuffer> {
		let mut out = PixelBuffer::filled(self.region.right(), self.region.bottom(), channels, [0; MAX_CHANNELS])?;
		self.render_outlines_into(&mut out)?;
		Ok(out)
	}

	/// Paints the leaves into an existing buffer of the tree's dimensions.
	pub fn render_into(&self, target: &mut PixelBuffer) -> Result<()> {
		self.paint(target, None)
	}

	/// Paints the leaves and their outlines into an existing buffer of the
	/// tree's dimensions.
	pub fn render_outlines_into(&self, target: &mut PixelBuffer) -> Result<()> {
		let marker = outline_marker(target.channels());
		self.paint(target, Some(marker))
	}

	fn paint(&self, target: &mut PixelBuffer, outline: Option<Color>) -> Result<()> {
		let expected = (self.region.right(), self.region.bottom());
		let actual = (target.width(), target.height());
		if expected != actual {
			return Err(Error::DimensionMismatch { expected, actual });
		}
		let (stride, channels) = (target.stride(), target.channels());
		if stride == 0 {
			return Ok(());
		}
		// Every pixel belongs to exactly one leaf, so rows can be painted
		// independently.
		#[cfg(feature = "parallel")]
		{
			use rayon::prelude::*;
			target.as_bytes_mut()
				.par_chunks_exact_mut(stride)
				.enumerate()
				.for_each(|(y, row)| self.paint_row(y as u32, row, channels, outline));
		}
		#[cfg(not(feature = "parallel"))]
		{
			target.as_bytes_mut()
				.chunks_exact_mut(stride)
				.enumerate()
				.for_each(|(y, row)| self.paint_row(y as u32, row, channels, outline));
		}
		Ok(())
	}

	/// Paints the part of row `y` covered by this node's leaves.
	fn paint_row(&self, y: u32, row: &mut [u8], channels: usize, outline: Option<Color>) {
		let region = &self.region;
		if y < region.y || y >= region.bottom() {
			return;
		}
		match &self.kind {
			NodeKind::Internal { children } => {
				for child in children.iter() {
					child.paint_row(y, row, channels, outline);
				}
			},
			NodeKind::Leaf { color } => {
				let span = &mut row[region.x as usize * channels..region.right() as usize * channels];
				for pixel in span.chunks_exact_mut(channels) {
					pixel.copy_from_slice(&color[..channels]);
				}
				if let Some(marker) = outline {
					let marker = &marker[..channels];
					if y == region.y || y + 1 == region.bottom() {
						for pixel in span.chunks_exact_mut(channels) {
							pixel.copy_from_slice(marker);
						}
					} else {
						let last = span.len() - channels;
						span[..channels].copy_from_slice(marker);
						span[last..].copy_from_slice(marker);
					}
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::buffer::{PixelBuffer, Region};
	use crate::node::error::Error;
	use crate::node::{BuildOptions, QuadtreeNode};

	fn build(buf: &PixelBuffer, max_depth: u32, max_std_dev: f64) -> QuadtreeNode {
		QuadtreeNode::build(buf, &BuildOptions { max_depth, max_std_dev }).unwrap()
	}

	#[test]
	fn uniform_quadrants_round_trip_exactly() {
		let buf = PixelBuffer::new(4, 4, 1, vec![
			10, 10, 200, 200,
			10, 10, 200, 200,
			200, 200, 10, 10,
			200, 200, 10, 10,
		]).unwrap();
		let tree = build(&buf, 4, 0.);
		assert_eq!(tree.render(1).unwrap(), buf);
	}

	#[test]
	fn single_leaf_fills_with_mean() {
		let buf = PixelBuffer::new(3, 1, 3, vec![
			0, 0, 0,   30, 60, 90,   60, 120, 180,
		]).unwrap();
		let out = build(&buf, 0, 0.).render(3).unwrap();
		assert_eq!(out.as_bytes(), &[30, 60, 90, 30, 60, 90, 30, 60, 90]);
	}

	#[test]
	fn outlines_cover_only_leaf_borders() {
		let buf = PixelBuffer::filled(4, 4, 3, [50, 100, 150, 0]).unwrap();
		let vis = build(&buf, 4, 0.).render_outlines(3).unwrap();
		for y in 0..4 {
			for x in 0..4 {
				let expected: &[u8] = if x == 0 || y == 0 || x == 3 || y == 3 {
					&[0, 0, 0]
				} else {
					&[50, 100, 150]
				};
				assert_eq!(vis.pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
			}
		}
	}

	#[test]
	fn outlines_keep_alpha_opaque() {
		let buf = PixelBuffer::filled(3, 3, 4, [9, 9, 9, 40]).unwrap();
		let vis = build(&buf, 2, 0.).render_outlines(4).unwrap();
		assert_eq!(vis.pixel(0, 0), Some(&[0u8, 0, 0, 255][..]));
		assert_eq!(vis.pixel(1, 1), Some(&[9u8, 9, 9, 40][..]));
	}

	#[test]
	fn outlines_follow_each_leaf() {
		let buf = PixelBuffer::new(4, 4, 1, vec![
			10, 10, 200, 200,
			10, 10, 200, 200,
			200, 200, 10, 10,
			200, 200, 10, 10,
		]).unwrap();
		let vis = build(&buf, 4, 0.).render_outlines(1).unwrap();
		// 2x2 leaves are all border
		assert!(vis.as_bytes().iter().all(|&v| v == 0));
	}

	#[test]
	fn rejects_mismatched_target() {
		let buf = PixelBuffer::filled(4, 4, 1, [1, 0, 0, 0]).unwrap();
		let tree = build(&buf, 1, 0.);
		let mut target = PixelBuffer::filled(4, 3, 1, [0; 4]).unwrap();
		assert!(matches!(
			tree.render_into(&mut target),
			Err(Error::DimensionMismatch { expected: (4, 4), actual: (4, 3) })
		));
		assert_eq!(tree.region, Region::new(0, 0, 4, 4));
	}
}
