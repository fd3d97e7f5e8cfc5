use std::path::PathBuf;

use nifkit::nif::{MAX_SCENE_DEPTH, NifFile, Result, SceneNode, SceneOptions};

use crate::cmd::util::{ParseArgs, emit_json, vec3_label};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	/// Deepest tree level still expanded.
	#[arg(long, default_value_t = SceneOptions::default().max_depth, value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_SCENE_DEPTH)))]
	pub max_depth: u32,
	/// Maximum number of output nodes.
	#[arg(long, default_value_t = SceneOptions::default().max_nodes)]
	pub max_nodes: usize,
	#[command(flatten)]
	pub parse: ParseArgs,
}

/// Build and print the scene tree rooted at block 0.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		json,
		max_depth,
		max_nodes,
		parse,
	} = args;

	let file = NifFile::open_with(&path, &parse.options())?;
	let root = file.scene(&SceneOptions { max_depth, max_nodes });

	if json {
		let payload = SceneFileJson {
			path: path.display().to_string(),
			node_count: root.node_count(),
			mesh_count: root.mesh_count(),
			root: node_json(&root),
		};
		return emit_json(&payload);
	}

	root.walk(&mut |node, depth| {
		let pad = "  ".repeat(depth as usize);
		let index = node.block_index.map_or_else(|| "-".to_owned(), |index| format!("#{index}"));
		let translation = vec3_label(node.local.w_axis.truncate().to_array());
		let mut line = format!("{pad}{} \"{}\" {index} t={translation}", node.kind.as_str(), node.name);
		match &node.geometry {
			Some(geometry) => line.push_str(&format!(" vertices={} triangles={}", geometry.positions.len(), geometry.triangle_count())),
			None if node.is_placeholder() => line.push_str(" (placeholder)"),
			None => {}
		}
		println!("{line}");
	});
	println!("nodes: {} meshes: {}", root.node_count(), root.mesh_count());

	Ok(())
}

fn node_json(node: &SceneNode) -> SceneNodeJson {
	let geometry = node.geometry.as_ref();
	SceneNodeJson {
		kind: node.kind.as_str(),
		name: node.name.clone(),
		block_index: node.block_index,
		placeholder: node.is_placeholder(),
		matrix: node.local.to_cols_array(),
		vertices: geometry.map(|item| item.positions.len()),
		normals: geometry.map(|item| item.normals.len()),
		uvs: geometry.map(|item| item.uvs.len()),
		colors: geometry.map(|item| item.colors.len()),
		triangles: geometry.map(|item| item.triangle_count()),
		children: node.children.iter().map(node_json).collect(),
	}
}

#[derive(serde::Serialize)]
struct SceneNodeJson {
	kind: &'static str,
	name: String,
	block_index: Option<usize>,
	placeholder: bool,
	matrix: [f32; 16],
	vertices: Option<usize>,
	normals: Option<usize>,
	uvs: Option<usize>,
	colors: Option<usize>,
	triangles: Option<usize>,
	children: Vec<SceneNodeJson>,
}

#[derive(serde::Serialize)]
struct SceneFileJson {
	path: String,
	node_count: usize,
	mesh_count: usize,
	root: SceneNodeJson,
}
