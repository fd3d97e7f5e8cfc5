use glam::Vec4;
use nifkit_testkit::{GeometrySpec, NifWriter, NodeSpec, ShapeSpec, TransformSpec, VERSION_4_0_0_2};

use crate::nif::{MAX_SCENE_DEPTH, NifFile, ParseOptions, RawBlock, SceneNode, SceneNodeKind, SceneOptions, build_scene};

fn parse(bytes: &[u8]) -> NifFile {
	NifFile::parse(bytes, &ParseOptions::default()).expect("synthetic file parses")
}

fn scene(bytes: &[u8]) -> SceneNode {
	parse(bytes).scene(&SceneOptions::default())
}

#[test]
fn children_follow_link_order_and_copy_geometry() {
	let mut geometry = GeometrySpec::triangle("TriData");
	geometry.colors = Some(vec![[0.5, 0.5, 0.5, 1.0]; 3]);
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 4)
		.node(&NodeSpec::new("Root", &[2, 1]))
		.node(&NodeSpec::new("Nested", &[]))
		.shape(&ShapeSpec::new("Tri", 3))
		.geometry_data(&geometry)
		.finish();
	let file = parse(&bytes);
	let root = file.scene(&SceneOptions::default());

	assert_eq!(root.kind, SceneNodeKind::Group);
	assert_eq!(root.name, "Root");
	assert_eq!(root.block_index, Some(0));
	let names: Vec<_> = root.children.iter().map(|child| child.name.as_str()).collect();
	assert_eq!(names, ["Tri", "Nested"]);
	assert_eq!(root.children[1].kind, SceneNodeKind::Group);
	assert!(root.children[1].children.is_empty());

	let mesh = &root.children[0];
	assert_eq!(mesh.kind, SceneNodeKind::Mesh);
	assert!(!mesh.is_placeholder());
	let geometry = mesh.geometry.as_ref().expect("mesh has geometry");

	let RawBlock::GeometryData(data) = &file.blocks()[3] else {
		panic!("block 3 should be geometry data");
	};
	assert_eq!(Some(&geometry.positions), data.vertices.as_ref());
	assert_eq!(Some(&geometry.normals), data.normals.as_ref());
	assert_eq!(Some(&geometry.uvs), data.uvs.as_ref());
	assert_eq!(Some(&geometry.colors), data.colors.as_ref());
	assert_eq!(geometry.indices, vec![0, 1, 2]);
	assert_eq!(geometry.triangle_count(), 1);
	assert_eq!(geometry.bound_radius, data.bound_radius);
}

#[test]
fn group_transform_uses_transposed_rotation() {
	let mut root = NodeSpec::new("Rotated", &[]);
	root.transform = TransformSpec {
		translation: [0.0, 0.0, 5.0],
		rotation: [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
		scale: 1.0,
	};
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 1).node(&root).finish();
	let node = scene(&bytes);

	assert_eq!(node.local.x_axis, Vec4::new(0.0, 1.0, 0.0, 0.0));
	assert_eq!(node.local.y_axis, Vec4::new(-1.0, 0.0, 0.0, 0.0));
	assert_eq!(node.local.z_axis, Vec4::new(0.0, 0.0, 1.0, 0.0));
	assert_eq!(node.local.w_axis, Vec4::new(0.0, 0.0, 5.0, 1.0));
}

#[test]
fn out_of_range_data_link_yields_placeholder_mesh() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 4)
		.node(&NodeSpec::new("Root", &[1, 2]))
		.shape(&ShapeSpec::new("Broken", 99))
		.shape(&ShapeSpec::new("Fine", 3))
		.geometry_data(&GeometrySpec::triangle("FineData"))
		.finish();
	let root = scene(&bytes);

	assert_eq!(root.children.len(), 2);
	let broken = &root.children[0];
	assert_eq!(broken.kind, SceneNodeKind::Mesh);
	assert_eq!(broken.name, "Broken");
	assert!(broken.geometry.is_none());
	assert!(broken.is_placeholder());

	let fine = &root.children[1];
	assert_eq!(fine.geometry.as_ref().map(|item| item.positions.len()), Some(3));
	assert_eq!(root.mesh_count(), 1);
}

#[test]
fn minimal_two_block_file_builds_group_with_empty_mesh() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 2)
		.node(&NodeSpec::new("Root", &[1]))
		.shape(&ShapeSpec::new("Empty", -1))
		.finish();
	let root = scene(&bytes);

	assert_eq!(root.kind, SceneNodeKind::Group);
	assert_eq!(root.children.len(), 1);
	let child = &root.children[0];
	assert_eq!(child.kind, SceneNodeKind::Mesh);
	assert!(child.geometry.is_none());
	assert!(child.children.is_empty());
}

#[test]
fn null_child_links_are_skipped_and_bad_ones_become_placeholders() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 2)
		.node(&NodeSpec::new("Root", &[-1, 1, 42, -1]))
		.node(&NodeSpec::new("Only", &[]))
		.finish();
	let root = scene(&bytes);

	let kinds: Vec<_> = root.children.iter().map(|child| child.kind).collect();
	assert_eq!(kinds, [SceneNodeKind::Group, SceneNodeKind::Placeholder]);
	assert_eq!(root.children[1].block_index, None);
}

#[test]
fn data_link_to_non_geometry_block_has_no_geometry() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 2)
		.node(&NodeSpec::new("Root", &[1]))
		.shape(&ShapeSpec::new("PointsAtRoot", 0))
		.finish();
	let root = scene(&bytes);
	assert!(root.children[0].geometry.is_none());
}

#[test]
fn geometry_block_linked_as_child_is_placeholder() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 2)
		.node(&NodeSpec::new("Root", &[1]))
		.geometry_data(&GeometrySpec::triangle("Loose"))
		.finish();
	let root = scene(&bytes);
	assert_eq!(root.children[0].kind, SceneNodeKind::Placeholder);
	assert_eq!(root.children[0].block_index, Some(1));
}

#[test]
fn shared_block_is_built_once_per_parent() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 3)
		.node(&NodeSpec::new("Root", &[1, 1]))
		.shape(&ShapeSpec::new("Shared", 2))
		.geometry_data(&GeometrySpec::triangle("SharedData"))
		.finish();
	let root = scene(&bytes);

	assert_eq!(root.children.len(), 2);
	assert_eq!(root.children[0], root.children[1]);
	assert_eq!(root.mesh_count(), 2);
}

#[test]
fn self_referencing_node_stops_at_max_depth() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 1).node(&NodeSpec::new("Loop", &[0])).finish();
	let file = parse(&bytes);
	let root = file.scene(&SceneOptions {
		max_depth: 3,
		..SceneOptions::default()
	});

	assert_eq!(root.node_count(), 5);
	let mut deepest = &root;
	while let Some(child) = deepest.children.first() {
		deepest = child;
	}
	assert_eq!(deepest.kind, SceneNodeKind::Placeholder);
	assert_eq!(deepest.block_index, Some(0));
}

#[test]
fn branching_self_loop_fills_node_budget_and_stops() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 1).node(&NodeSpec::new("Loop", &[0, 0])).finish();
	let file = parse(&bytes);

	let options = SceneOptions::default();
	let root = file.scene(&options);
	assert_eq!(root.node_count(), options.max_nodes);

	let small = file.scene(&SceneOptions {
		max_nodes: 10,
		..SceneOptions::default()
	});
	assert_eq!(small.node_count(), 10);
	assert_eq!(small.name, "Loop");
}

#[test]
fn node_budget_drops_trailing_children() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 2)
		.node(&NodeSpec::new("Root", &[1, 1, 1, 1]))
		.node(&NodeSpec::new("Leaf", &[]))
		.finish();
	let root = parse(&bytes).scene(&SceneOptions {
		max_nodes: 3,
		..SceneOptions::default()
	});
	assert_eq!(root.children.len(), 2);
	assert!(root.children.iter().all(|child| child.kind == SceneNodeKind::Group));
}

#[test]
fn oversized_max_depth_is_clamped() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 1).node(&NodeSpec::new("Loop", &[0])).finish();
	let root = parse(&bytes).scene(&SceneOptions {
		max_depth: u32::MAX,
		max_nodes: usize::MAX,
	});

	let mut deepest = 0;
	root.walk(&mut |_, depth| deepest = deepest.max(depth));
	assert_eq!(deepest, MAX_SCENE_DEPTH + 1);
	assert_eq!(root.node_count(), MAX_SCENE_DEPTH as usize + 2);
}

#[test]
fn empty_block_array_builds_placeholder_root() {
	let root = build_scene(&[], &SceneOptions::default());
	assert_eq!(root.kind, SceneNodeKind::Placeholder);
	assert_eq!(root.node_count(), 1);
}

#[test]
fn walk_visits_pre_order_with_depth() {
	let bytes = NifWriter::with_header(VERSION_4_0_0_2, 4)
		.node(&NodeSpec::new("A", &[1, 3]))
		.node(&NodeSpec::new("B", &[2]))
		.node(&NodeSpec::new("C", &[]))
		.node(&NodeSpec::new("D", &[]))
		.finish();
	let root = scene(&bytes);

	let mut seen = Vec::new();
	root.walk(&mut |node, depth| seen.push((node.name.clone(), depth)));
	assert_eq!(
		seen,
		[("A".to_owned(), 0), ("B".to_owned(), 1), ("C".to_owned(), 2), ("D".to_owned(), 1)]
	);
}
