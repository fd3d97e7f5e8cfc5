use std::path::PathBuf;

use nifkit::nif::{NifFile, Result};

use crate::cmd::util::{ParseArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[command(flatten)]
	pub parse: ParseArgs,
}

/// Print header fields and block type counts.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json, parse } = args;

	let file = NifFile::open_with(&path, &parse.options())?;
	let counts = file.type_counts();

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			header: file.header.line.clone(),
			version: file.header.version_label(),
			supported_version: file.header.is_supported_version(),
			num_objects: file.header.num_objects,
			trailing_bytes: file.trailing_bytes,
			block_types: counts
				.iter()
				.map(|(type_name, count)| TypeCountJson {
					type_name: *type_name,
					count: *count,
				})
				.collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("header: {}", file.header.line);
	println!("version: {}", file.header.version_label());
	println!("supported_version: {}", file.header.is_supported_version());
	println!("num_objects: {}", file.header.num_objects);
	println!("trailing_bytes: {}", file.trailing_bytes);
	println!("block_types:");
	for (type_name, count) in counts {
		println!("  {type_name}: {count}");
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct TypeCountJson {
	type_name: &'static str,
	count: usize,
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	header: String,
	version: String,
	supported_version: bool,
	num_objects: u32,
	trailing_bytes: usize,
	block_types: Vec<TypeCountJson>,
}
