use glam::Mat4;
use log::{debug, warn};

use crate::nif::{GeometryDataBlock, Link, NULL_LINK, RawBlock, resolve_link};

/// Hard ceiling on [`SceneOptions::max_depth`]; larger values are clamped.
pub const MAX_SCENE_DEPTH: u32 = 512;

/// Runtime limits for scene construction.
#[derive(Debug, Clone)]
pub struct SceneOptions {
	/// Deepest level still expanded; anything below becomes a placeholder.
	pub max_depth: u32,
	/// Maximum number of output nodes, placeholders included. Child links
	/// past the budget are not built.
	pub max_nodes: usize,
}

impl Default for SceneOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_nodes: 16384,
		}
	}
}

/// Role of one output node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneNodeKind {
	/// Transform group built from a node block.
	Group,
	/// Drawable built from a shape block. Geometry may still be absent.
	Mesh,
	/// Stand-in for a link that could not be built.
	Placeholder,
}

impl SceneNodeKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Group => "group",
			Self::Mesh => "mesh",
			Self::Placeholder => "placeholder",
		}
	}
}

/// Owned copy of one geometry block's buffers. Absent buffers are empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshGeometry {
	/// Vertex positions.
	pub positions: Vec<[f32; 3]>,
	/// Vertex normals.
	pub normals: Vec<[f32; 3]>,
	/// First UV set.
	pub uvs: Vec<[f32; 2]>,
	/// RGBA vertex colors.
	pub colors: Vec<[f32; 4]>,
	/// Flat triangle list, three indices per triangle.
	pub indices: Vec<u16>,
	/// Bounding sphere center.
	pub bound_center: [f32; 3],
	/// Bounding sphere radius.
	pub bound_radius: f32,
}

impl MeshGeometry {
	fn from_block(data: &GeometryDataBlock) -> Self {
		Self {
			positions: data.vertices.clone().unwrap_or_default(),
			normals: data.normals.clone().unwrap_or_default(),
			uvs: data.uvs.clone().unwrap_or_default(),
			colors: data.colors.clone().unwrap_or_default(),
			indices: data.triangles.iter().flatten().flatten().copied().collect(),
			bound_center: data.bound_center,
			bound_radius: data.bound_radius,
		}
	}

	/// Number of triangles in the index buffer.
	pub fn triangle_count(&self) -> usize {
		self.indices.len() / 3
	}
}

/// One node of the owned output tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
	/// Node role.
	pub kind: SceneNodeKind,
	/// Source object name, empty for placeholders without a source block.
	pub name: String,
	/// Source block position, when the link resolved.
	pub block_index: Option<usize>,
	/// Local transform, column-major.
	pub local: Mat4,
	/// Geometry for mesh nodes whose data link resolved.
	pub geometry: Option<MeshGeometry>,
	/// Children in source child-link order.
	pub children: Vec<SceneNode>,
}

impl SceneNode {
	fn placeholder(block_index: Option<usize>) -> Self {
		Self {
			kind: SceneNodeKind::Placeholder,
			name: String::new(),
			block_index,
			local: Mat4::IDENTITY,
			geometry: None,
			children: Vec::new(),
		}
	}

	/// Whether this node stands in for something that could not be built.
	pub fn is_placeholder(&self) -> bool {
		match self.kind {
			SceneNodeKind::Placeholder => true,
			SceneNodeKind::Mesh => self.geometry.is_none(),
			SceneNodeKind::Group => false,
		}
	}

	/// Visit this node and its descendants pre-order with their depth.
	pub fn walk<F: FnMut(&SceneNode, u32)>(&self, visit: &mut F) {
		self.walk_at(0, visit);
	}

	fn walk_at<F: FnMut(&SceneNode, u32)>(&self, depth: u32, visit: &mut F) {
		visit(self, depth);
		for child in &self.children {
			child.walk_at(depth + 1, visit);
		}
	}

	/// Total nodes in this subtree.
	pub fn node_count(&self) -> usize {
		1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
	}

	/// Mesh nodes in this subtree that carry geometry.
	pub fn mesh_count(&self) -> usize {
		let own = usize::from(self.geometry.is_some());
		own + self.children.iter().map(SceneNode::mesh_count).sum::<usize>()
	}
}

/// Build the owned scene tree rooted at block 0.
///
/// Unresolvable links become placeholders instead of failing the build. A
/// block reachable from two parents is built once per parent, so the node
/// budget is what bounds link cycles with more than one child.
pub fn build_scene(blocks: &[RawBlock], options: &SceneOptions) -> SceneNode {
	let mut builder = SceneBuilder {
		blocks,
		max_depth: options.max_depth.min(MAX_SCENE_DEPTH),
		remaining: options.max_nodes.max(1),
		truncated: false,
	};
	let root = builder.build_link(0, 0);
	if builder.truncated {
		warn!("scene truncated at {} nodes", options.max_nodes.max(1));
	}
	root
}

struct SceneBuilder<'b> {
	blocks: &'b [RawBlock],
	max_depth: u32,
	remaining: usize,
	truncated: bool,
}

impl SceneBuilder<'_> {
	fn build_link(&mut self, link: Link, depth: u32) -> SceneNode {
		self.remaining -= 1;

		let Some(index) = resolve_link(link, self.blocks.len()) else {
			debug!("link {link} does not resolve among {} blocks, using placeholder", self.blocks.len());
			return SceneNode::placeholder(None);
		};

		if depth > self.max_depth {
			debug!("block {index} below max depth {}, using placeholder", self.max_depth);
			return SceneNode::placeholder(Some(index));
		}

		let blocks = self.blocks;
		match &blocks[index] {
			RawBlock::Node(node) => {
				let mut children = Vec::new();
				for child in node.child_links.iter().filter(|child| **child != NULL_LINK) {
					if self.remaining == 0 {
						debug!("node budget spent, dropping remaining children of block {index}");
						self.truncated = true;
						break;
					}
					children.push(self.build_link(*child, depth + 1));
				}
				SceneNode {
					kind: SceneNodeKind::Group,
					name: node.attributed.name.clone(),
					block_index: Some(index),
					local: node.attributed.transform.local_matrix(),
					geometry: None,
					children,
				}
			}
			RawBlock::Shape(shape) => {
				let geometry = match resolve_link(shape.data_link, blocks.len()).map(|data| &blocks[data]) {
					Some(RawBlock::GeometryData(data)) => Some(MeshGeometry::from_block(data)),
					_ => {
						debug!("shape block {index} data link {} has no geometry", shape.data_link);
						None
					}
				};
				SceneNode {
					kind: SceneNodeKind::Mesh,
					name: shape.attributed.name.clone(),
					block_index: Some(index),
					local: shape.attributed.transform.local_matrix(),
					geometry,
					children: Vec::new(),
				}
			}
			RawBlock::GeometryData(_) => {
				debug!("block {index} is geometry data linked as a child, using placeholder");
				SceneNode::placeholder(Some(index))
			}
		}
	}
}

#[cfg(test)]
mod tests;
