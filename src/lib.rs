//! Lossy image compression by region quadtree.
//!
//! An image is split into quadrants recursively until each region's
//! color is uniform enough (or a depth ceiling is hit); every remaining
//! region is then painted with its average color. The partition can also
//! be drawn as outlined rectangles to show where detail was kept.

pub mod buffer;
pub mod convert;
pub mod node;

pub use buffer::{Color, PixelBuffer, Region, MAX_CHANNELS};
pub use node::*;
pub use node::error::{Error, Result};
pub use node::render::OUTLINE_COLOR;
pub use node::stats::RegionStats;

/// Settings for a single `compress` run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressOptions {
	/// Ceiling on quadtree depth; `u32::MAX` effectively disables it.
	pub max_depth: u32,
	/// Per-channel standard deviation tolerated inside one region.
	pub max_std_dev: f64,
	/// Also render the partition outlines.
	pub visualize: bool,
}

impl Default for CompressOptions {
	fn default() -> Self {
		Self {
			max_depth: u32::MAX,
			max_std_dev: 5.,
			visualize: false,
		}
	}
}

impl CompressOptions {
	pub fn build_options(&self) -> BuildOptions {
		BuildOptions { max_depth: self.max_depth, max_std_dev: self.max_std_dev }
	}
}

/// Shape of the quadtree a run produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeSummary {
	pub height: u32,
	pub leaf_count: usize,
	pub node_count: usize,
}

impl From<&QuadtreeNode> for TreeSummary {
	fn from(tree: &QuadtreeNode) -> Self {
		Self {
			height: tree.height(),
			leaf_count: tree.leaf_count(),
			node_count: tree.node_count(),
		}
	}
}

/// Output of `compress`.
#[derive(Clone, Debug)]
pub struct Compressed {
	/// The averaged image, same dimensions and layout as the input.
	pub image: PixelBuffer,
	/// Averaged image with leaf outlines, if requested.
	pub visualization: Option<PixelBuffer>,
	pub summary: TreeSummary,
}

/// Builds a quadtree over `buffer` and renders it back.
///
/// The input is never modified. Invalid options or an empty buffer are
/// rejected before any processing.
pub fn compress(buffer: &PixelBuffer, options: &CompressOptions) -> Result<Compressed> {
	let tree = QuadtreeNode::build(buffer, &options.build_options())?;
	let summary = TreeSummary::from(&tree);
	log::info!(
		"partitioned {}x{} image into {} regions, tree height {}",
		buffer.width(), buffer.height(), summary.leaf_count, summary.height
	);

	let image = tree.render(buffer.channels())?;
	let visualization = if options.visualize {
		Some(tree.render_outlines(buffer.channels())?)
	} else {
		None
	};
	Ok(Compressed { image, visualization, summary })
}
