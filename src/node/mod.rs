pub mod error;
pub mod stats;

use crate::buffer::{Color, PixelBuffer, Region, MAX_CHANNELS};
use error::{Error, Result};
use stats::RegionStats;

/// Child regions at least this large are built on the thread pool.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_AREA: u64 = 1 << 14;

/// Nodes this deep or deeper build their children sequentially.
#[cfg(feature = "parallel")]
const PARALLEL_MAX_DEPTH: u32 = 4;

/// Limits that decide when a region stops splitting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildOptions {
	/// Deepest level a node may sit at; nodes at this depth are always leaves.
	pub max_depth: u32,
	/// Largest per-channel standard deviation a leaf may have.
	pub max_std_dev: f64,
}

impl BuildOptions {
	pub fn validate(&self) -> Result<()> {
		if self.max_std_dev.is_nan() || self.max_std_dev < 0. {
			return Err(Error::InvalidParameter {
				name: "max_std_dev",
				value: self.max_std_dev.to_string(),
			});
		}
		Ok(())
	}
}

/// Whether a node was averaged or subdivided.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	/// The region is drawn as one flat color.
	Leaf { color: Color },
	/// Quadrants ordered top-left, top-right, bottom-left, bottom-right.
	Internal { children: Box<[QuadtreeNode; 4]> },
}

/// Node in a quadtree partitioning an image.
///
/// Leaves carry the average color of their region; internal nodes own
/// exactly four children which tile the node's region.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadtreeNode {
	pub region: Region,
	pub depth: u32,
	/// Per-channel standard deviation measured when the node was decided.
	pub std_dev: [f64; MAX_CHANNELS],
	pub kind: NodeKind,
}

impl QuadtreeNode {
	/// Partitions the whole of `buffer` into a quadtree.
	///
	/// Fails before doing any work if the options are out of range or the
	/// buffer has no pixels.
	pub fn build(buffer: &PixelBuffer, options: &BuildOptions) -> Result<Self> {
		options.validate()?;
		if buffer.is_empty() {
			return Err(Error::EmptyBuffer);
		}
		log::debug!(
			"building quadtree over {}x{} ({} channels), max depth {}, max std dev {}",
			buffer.width(), buffer.height(), buffer.channels(),
			options.max_depth, options.max_std_dev
		);
		Self::build_region(buffer, buffer.region(), 0, options)
	}

	/// Decides a single region, recursing into its quadrants if it is
	/// not uniform enough.
	fn build_region(
		buffer: &PixelBuffer,
		region: Region,
		depth: u32,
		options: &BuildOptions
	) -> Result<Self> {
		let stats = RegionStats::compute(buffer, region)?;
		let quadrants = if depth >= options.max_depth || stats.is_uniform(options.max_std_dev) {
			None
		} else {
			region.split()
		};
		let kind = match quadrants {
			None => NodeKind::Leaf { color: stats.average_color() },
			Some(quads) => {
				log::trace!("splitting {:?} at depth {} (std dev {:?})", region, depth, stats.std_dev);
				NodeKind::Internal { children: Box::new(Self::build_children(buffer, quads, depth + 1, options)?) }
			}
		};
		Ok(Self { region, depth, std_dev: stats.std_dev, kind })
	}

	#[cfg(feature = "parallel")]
	fn build_children(
		buffer: &PixelBuffer,
		quads: [Region; 4],
		depth: u32,
		options: &BuildOptions
	) -> Result<[Self; 4]> {
		if depth > PARALLEL_MAX_DEPTH || quads[0].area() < PARALLEL_MIN_AREA {
			return Self::build_children_seq(buffer, quads, depth, options);
		}
		let build = |r| Self::build_region(buffer, r, depth, options);
		let ((tl, tr), (bl, br)) = rayon::join(
			|| rayon::join(|| build(quads[0]), || build(quads[1])),
			|| rayon::join(|| build(quads[2]), || build(quads[3])),
		);
		Ok([tl?, tr?, bl?, br?])
	}

	#[cfg(not(feature = "parallel"))]
	fn build_children(
		buffer: &PixelBuffer,
		quads: [Region; 4],
		depth: u32,
		options: &BuildOptions
	) -> Result<[Self; 4]> {
		Self::build_children_seq(buffer, quads, depth, options)
	}

	fn build_children_seq(
		buffer: &PixelBuffer,
		quads: [Region; 4],
		depth: u32,
		options: &BuildOptions
	) -> Result<[Self; 4]> {
		let [tl, tr, bl, br] = quads;
		Ok([
			Self::build_region(buffer, tl, depth, options)?,
			Self::build_region(buffer, tr, depth, options)?,
			Self::build_region(buffer, bl, depth, options)?,
			Self::build_region(buffer, br, depth, options)?,
		])
	}

	pub fn is_leaf(&self) -> bool {
		matches!(self.kind, NodeKind::Leaf { .. })
	}

	/// The averaged color, if this is a leaf.
	pub fn color(&self) -> Option<Color> {
		match self.kind {
			NodeKind::Leaf { color } => Some(color),
			NodeKind::Internal { .. } => None,
		}
	}

	pub fn children(&self) -> Option<&[QuadtreeNode; 4]> {
		match &self.kind {
			NodeKind::Leaf { .. } => None,
			NodeKind::Internal { children } => Some(&**children),
		}
	}

	/// Number of levels below this node; zero for a leaf.
	pub fn height(&self) -> u32 {
		self.children()
			.map(|c| 1 + c.iter().map(QuadtreeNode::height).max().unwrap_or(0))
			.unwrap_or(0)
	}

	pub fn leaf_count(&self) -> usize {
		self.children()
			.map(|c| c.iter().map(QuadtreeNode::leaf_count).sum())
			.unwrap_or(1)
	}

	pub fn node_count(&self) -> usize {
		1 + self.children()
			.map(|c| c.iter().map(QuadtreeNode::node_count).sum())
			.unwrap_or(0)
	}

	/// Depth-first iterator over the leaves, children visited in
	/// top-left, top-right, bottom-left, bottom-right order.
	pub fn leaves(&self) -> Leaves<'_> {
		Leaves { stack: vec![self] }
	}
}

/// Iterator returned by `QuadtreeNode::leaves`.
pub struct Leaves<'a> {
	stack: Vec<&'a QuadtreeNode>,
}

impl<'a> Iterator for Leaves<'a> {
	type Item = &'a QuadtreeNode;

	fn next(&mut self) -> Option<Self::Item> {
		while let Some(node) = self.stack.pop() {
			match &node.kind {
				NodeKind::Leaf { .. } => return Some(node),
				NodeKind::Internal { children } => self.stack.extend(children.iter().rev()),
			}
		}
		None
	}
}

pub mod render;
