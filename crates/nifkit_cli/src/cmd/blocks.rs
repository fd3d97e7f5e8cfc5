use std::path::PathBuf;

use nifkit::nif::{NifFile, RawBlock, Result};

use crate::cmd::util::{ParseArgs, emit_json, link_label};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[command(flatten)]
	pub parse: ParseArgs,
}

/// List every decoded block with its outgoing links.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json, parse } = args;
	let file = NifFile::open_with(&path, &parse.options())?;

	if json {
		let payload = BlocksJson {
			path: path.display().to_string(),
			blocks: file.blocks().iter().enumerate().map(|(index, block)| block_json(index, block)).collect(),
		};
		return emit_json(&payload);
	}

	for (index, block) in file.blocks().iter().enumerate() {
		println!("#{index} {} \"{}\"", block.type_name(), block.name());
		if let RawBlock::GeometryData(data) = block {
			println!(
				"  vertices={} normals={} colors={} uv_sets={} triangles={}",
				data.vertex_count,
				data.normals.is_some(),
				data.colors.is_some(),
				data.uv_set_count,
				data.triangle_count
			);
		}
		for (field, link) in block.links() {
			println!("  {field} -> {}", link_label(link));
		}
	}

	Ok(())
}

fn block_json(index: usize, block: &RawBlock) -> BlockJson {
	let (vertex_count, triangle_count) = match block {
		RawBlock::GeometryData(data) => (Some(data.vertex_count), Some(data.triangle_count)),
		_ => (None, None),
	};
	BlockJson {
		index,
		type_name: block.type_name(),
		name: block.name().to_owned(),
		translation: block.attributed().map(|item| item.transform.translation),
		vertex_count,
		triangle_count,
		links: block
			.links()
			.into_iter()
			.map(|(field, link)| LinkJson {
				field,
				target: (link >= 0).then_some(link),
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct LinkJson {
	field: &'static str,
	target: Option<i32>,
}

#[derive(serde::Serialize)]
struct BlockJson {
	index: usize,
	type_name: &'static str,
	name: String,
	translation: Option<[f32; 3]>,
	vertex_count: Option<u16>,
	triangle_count: Option<u16>,
	links: Vec<LinkJson>,
}

#[derive(serde::Serialize)]
struct BlocksJson {
	path: String,
	blocks: Vec<BlockJson>,
}
