use crate::buffer::{Color, PixelBuffer, Region, MAX_CHANNELS};
use super::error::{Error, Result};

/// Per-channel mean and population standard deviation of a region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionStats {
	pub channels: usize,
	pub mean: [f64; MAX_CHANNELS],
	pub std_dev: [f64; MAX_CHANNELS],
}

impl RegionStats {
	/// Measures every pixel inside `region`.
	///
	/// Sums are kept as integers, so a uniform region has a standard
	/// deviation of exactly zero.
	pub fn compute(buffer: &PixelBuffer, region: Region) -> Result<Self> {
		if region.is_empty() || !buffer.contains_region(&region) {
			return Err(Error::InvalidRegion(region));
		}
		let channels = buffer.channels();
		let mut sum = [0u64; MAX_CHANNELS];
		let mut sum_sq = [0u64; MAX_CHANNELS];
		for row in region.y..region.bottom() {
			for pixel in buffer.row_span(&region, row).chunks_exact(channels) {
				for (c, &v) in pixel.iter().enumerate() {
					sum[c] += v as u64;
					sum_sq[c] += v as u64 * v as u64;
				}
			}
		}

		let n = region.area();
		let mut mean = [0.; MAX_CHANNELS];
		let mut std_dev = [0.; MAX_CHANNELS];
		for c in 0..channels {
			mean[c] = sum[c] as f64 / n as f64;
			// N * sum(x^2) - sum(x)^2 is never negative and fits in u128
			let spread = n as u128 * sum_sq[c] as u128 - sum[c] as u128 * sum[c] as u128;
			std_dev[c] = (spread as f64).sqrt() / n as f64;
		}
		Ok(Self { channels, mean, std_dev })
	}

	/// Whether no channel varies more than `max_std_dev`.
	pub fn is_uniform(&self, max_std_dev: f64) -> bool {
		self.std_dev[..self.channels].iter().all(|&s| s <= max_std_dev)
	}

	/// Means rounded to the nearest channel value.
	pub fn average_color(&self) -> Color {
		let mut color = [0; MAX_CHANNELS];
		for (out, m) in color.iter_mut().zip(&self.mean[..self.channels]) {
			*out = m.round().clamp(0., 255.) as u8;
		}
		color
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gray(width: u32, height: u32, data: &[u8]) -> PixelBuffer {
		PixelBuffer::new(width, height, 1, data.to_vec()).unwrap()
	}

	#[test]
	fn uniform_region_has_zero_deviation() {
		let buf = PixelBuffer::filled(5, 3, 3, [7, 80, 255, 0]).unwrap();
		let stats = RegionStats::compute(&buf, buf.region()).unwrap();
		assert_eq!(stats.mean[..3], [7., 80., 255.]);
		assert_eq!(stats.std_dev[..3], [0., 0., 0.]);
		assert!(stats.is_uniform(0.));
		assert_eq!(stats.average_color(), [7, 80, 255, 0]);
	}

	#[test]
	fn population_deviation() {
		// 0 and 10: mean 5, population deviation 5 (sample would be ~7.07)
		let buf = gray(2, 1, &[0, 10]);
		let stats = RegionStats::compute(&buf, buf.region()).unwrap();
		assert_eq!(stats.mean[0], 5.);
		assert!((stats.std_dev[0] - 5.).abs() < 1e-12);
		assert!(!stats.is_uniform(4.9));
		assert!(stats.is_uniform(5.));
	}

	#[test]
	fn only_reads_inside_region() {
		let buf = gray(3, 3, &[
			0, 0, 0,
			0, 9, 9,
			0, 9, 9,
		]);
		let stats = RegionStats::compute(&buf, Region::new(1, 1, 2, 2)).unwrap();
		assert_eq!(stats.mean[0], 9.);
		assert_eq!(stats.std_dev[0], 0.);
	}

	#[test]
	fn channels_are_independent() {
		let buf = PixelBuffer::new(2, 1, 2, vec![0, 100, 255, 100]).unwrap();
		let stats = RegionStats::compute(&buf, buf.region()).unwrap();
		assert_eq!(stats.mean[..2], [127.5, 100.]);
		assert!((stats.std_dev[0] - 127.5).abs() < 1e-12);
		assert_eq!(stats.std_dev[1], 0.);
		assert_eq!(stats.average_color(), [128, 100, 0, 0]);
	}

	#[test]
	fn means_and_deviations_stay_in_range() {
		let data = (0..64u32).map(|n| (n * 37 % 256) as u8).collect::<Vec<_>>();
		let buf = gray(8, 8, &data);
		for region in [Region::new(0, 0, 8, 8), Region::new(3, 1, 5, 2), Region::new(7, 7, 1, 1)] {
			let stats = RegionStats::compute(&buf, region).unwrap();
			assert!((0. ..=255.).contains(&stats.mean[0]));
			assert!(stats.std_dev[0] >= 0.);
		}
	}

	#[test]
	fn rejects_degenerate_regions() {
		let buf = gray(2, 2, &[1, 2, 3, 4]);
		assert!(matches!(
			RegionStats::compute(&buf, Region::new(0, 0, 0, 2)),
			Err(Error::InvalidRegion(_))
		));
		assert!(matches!(
			RegionStats::compute(&buf, Region::new(1, 1, 2, 1)),
			Err(Error::InvalidRegion(_))
		));
		assert!(matches!(
			RegionStats::compute(&buf, Region::new(u32::MAX, 0, 2, 1)),
			Err(Error::InvalidRegion(_))
		));
		assert!(matches!(
			RegionStats::compute(&buf, Region::new(0, u32::MAX - 1, 1, 3)),
			Err(Error::InvalidRegion(_))
		));
	}
}
