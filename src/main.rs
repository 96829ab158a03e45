use clap::{value_parser, Arg, ArgAction, Command};
use image::error::ImageError;

use quadtree_compress::{compress, CompressOptions, PixelBuffer};

use std::path::{Path, PathBuf};

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Maps a decoding or encoding failure to a message and exit code.
fn image_error_exit(e: ImageError) -> ! {
	let (msg, code) = match e {
		ImageError::Decoding(_) | ImageError::Unsupported(_) => ("Invalid image data", 4),
		ImageError::Limits(_) => ("Computation limits exceeded", 5),
		ImageError::IoError(_) => ("File not found or could not be read", 3),
		_ => ("An error occurred", 10)
	};
	log::debug!("{}", e);
	error_exit(msg, code)
}

/// `input.png` becomes `input_<suffix>.png`, next to the input.
fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
	let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
	let name = match input.extension() {
		Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
		None => format!("{}_{}", stem, suffix),
	};
	input.with_file_name(name)
}

/// The partition visualization is saved beside the compressed output.
fn visualization_path(output: &Path) -> PathBuf {
	sibling_path(output, "visualized")
}

/// `clap`-based CLI for compressing images.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data
///
/// 5: computation limits exceeded
///
/// 10: other, potentially unknown error
fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let matches = Command::new("quadtree_compress")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Compresses an image by averaging colors over uniform quadtree regions.")
		.arg(Arg::new("max-depth")
			.short('d')
			.long("max-depth")
			.value_name("N")
			.help("Maximum quadtree depth; defaults to unbounded")
			.allow_negative_numbers(true)
			.value_parser(value_parser!(i64)))
		.arg(Arg::new("max-std-dev")
			.short('s')
			.long("max-std-dev")
			.value_name("F")
			.help("Color standard deviation tolerated in one region; defaults to 5")
			.allow_negative_numbers(true)
			.value_parser(value_parser!(f64))
			.default_value("5"))
		.arg(Arg::new("visualize")
			.short('v')
			.long("visualize")
			.help("Also save the region partition, outlined, next to the output as OUTPUT_visualized")
			.action(ArgAction::SetTrue))
		.arg(Arg::new("output")
			.short('o')
			.long("output")
			.value_name("FILE")
			.help("Path to output file; defaults to INPUT_compressed with the same extension"))
		.arg(Arg::new("INPUT")
			.help("Path to input image")
			.required(true)
			.index(1))
		.try_get_matches()
		.unwrap_or_else(|e| {
			// Help and version requests aren't failures
			if !e.use_stderr() {
				e.exit()
			}
			if let Err(io) = e.print() {
				log::error!("could not print usage error: {}", io);
			}
			std::process::exit(1)
		});

	// Presence is enforced by clap for these
	let input_path = PathBuf::from(matches.get_one::<String>("INPUT").map(String::as_str).unwrap_or_default());
	let max_std_dev = matches.get_one::<f64>("max-std-dev").copied().unwrap_or(5.);
	let max_depth = match matches.get_one::<i64>("max-depth").copied() {
		None => u32::MAX,
		Some(n) => match u32::try_from(n) {
			Ok(n) => n,
			Err(_) => error_exit("max-depth must be a non-negative integer", 2)
		}
	};
	let options = CompressOptions {
		max_depth,
		max_std_dev,
		visualize: matches.get_flag("visualize"),
	};

	let source = match image::open(&input_path) {
		Ok(i) => i,
		Err(e) => image_error_exit(e)
	};
	let buffer = match PixelBuffer::from_dynamic(&source) {
		Ok(b) => b,
		Err(_) => error_exit("Invalid image data", 4)
	};
	let result = match compress(&buffer, &options) {
		Ok(r) => r,
		Err(quadtree_compress::Error::InvalidParameter { name, value }) =>
			error_exit(&format!("Invalid value for {}: {}", name, value), 2),
		Err(quadtree_compress::Error::EmptyBuffer) => error_exit("Input image has no pixels", 4),
		Err(e) => error_exit(&e.to_string(), 10)
	};
	eprintln!(
		"{} regions, quadtree height {}",
		result.summary.leaf_count, result.summary.height
	);

	let output_path = matches.get_one::<String>("output")
		.map(PathBuf::from)
		.unwrap_or_else(|| sibling_path(&input_path, "compressed"));
	save(result.image, &output_path);

	if let Some(vis) = result.visualization {
		save(vis, &visualization_path(&output_path));
	}
}

fn save(buffer: PixelBuffer, path: &Path) {
	let img = match buffer.into_dynamic() {
		Ok(i) => i,
		Err(e) => error_exit(&e.to_string(), 10)
	};
	match img.save(path) {
		Ok(_) => log::info!("wrote {}", path.display()),
		Err(ImageError::IoError(_)) => error_exit("Could not save output", 3),
		Err(e) => image_error_exit(e)
	}
}
