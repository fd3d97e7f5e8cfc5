use glam::{Mat3, Mat4, Vec3};

/// Index into the flat block array, or [`NULL_LINK`].
pub type Link = i32;

/// Reserved link value meaning "no target".
pub const NULL_LINK: Link = -1;

/// Map a raw link to an array position when it is in `[0, len)`.
pub fn resolve_link(link: Link, len: usize) -> Option<usize> {
	let index = usize::try_from(link).ok()?;
	(index < len).then_some(index)
}

/// Closed set of block layouts this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
	/// Transform group with child links (`NiNode`).
	Node,
	/// Drawable shape referencing a geometry block (`NiTriShape`).
	Shape,
	/// Raw triangle mesh buffers (`NiTriShapeData`).
	GeometryData,
}

impl BlockKind {
	/// Every supported kind, in dispatch order.
	pub const ALL: [Self; 3] = [Self::Node, Self::Shape, Self::GeometryData];

	/// Exact type name announced inline in the block stream.
	pub fn type_name(self) -> &'static str {
		match self {
			Self::Node => "NiNode",
			Self::Shape => "NiTriShape",
			Self::GeometryData => "NiTriShapeData",
		}
	}

	/// Look up a kind by its exact on-disk type name.
	pub fn from_type_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.type_name() == name)
	}
}

/// Local transform as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
	/// Translation vector.
	pub translation: [f32; 3],
	/// Rotation matrix, one inner array per stored row.
	pub rotation: [[f32; 3]; 3],
	/// Uniform scale.
	pub scale: f32,
}

impl Transform {
	/// Identity transform.
	pub const IDENTITY: Self = Self {
		translation: [0.0; 3],
		rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
		scale: 1.0,
	};

	/// Compose translation, rotation, and scale into one column-major matrix.
	pub fn local_matrix(&self) -> Mat4 {
		// Stored rows become basis columns, i.e. the transpose of the on-disk matrix.
		let rotation = Mat3::from_cols_array_2d(&self.rotation);
		Mat4::from_translation(Vec3::from_array(self.translation)) * Mat4::from_mat3(rotation) * Mat4::from_scale(Vec3::splat(self.scale))
	}
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// Fields shared by node and shape blocks, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributed {
	/// Object name.
	pub name: String,
	/// Raw flag bits.
	pub flags: u16,
	/// Local transform.
	pub transform: Transform,
	/// Attached property blocks.
	pub property_links: Vec<Link>,
	/// Collision object, or [`NULL_LINK`].
	pub collision_link: Link,
}

/// Transform group block.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBlock {
	/// Shared object fields.
	pub attributed: Attributed,
	/// Child objects in display order.
	pub child_links: Vec<Link>,
	/// Dynamic effects (lights, texture effects).
	pub effect_links: Vec<Link>,
}

/// Drawable mesh node block.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeBlock {
	/// Shared object fields.
	pub attributed: Attributed,
	/// Geometry data block.
	pub data_link: Link,
	/// Skin instance, unused by this decoder.
	pub skin_link: Link,
}

/// Triangle mesh buffers. Optional buffers are `None` when their presence flag was zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDataBlock {
	/// Object name.
	pub name: String,
	/// Declared vertex count shared by every per-vertex buffer.
	pub vertex_count: u16,
	/// Vertex positions.
	pub vertices: Option<Vec<[f32; 3]>>,
	/// Vertex normals.
	pub normals: Option<Vec<[f32; 3]>>,
	/// Bounding sphere center.
	pub bound_center: [f32; 3],
	/// Bounding sphere radius.
	pub bound_radius: f32,
	/// Per-vertex RGBA colors.
	pub colors: Option<Vec<[f32; 4]>>,
	/// Number of UV sets present on disk.
	pub uv_set_count: u16,
	/// First UV set; further sets are read and dropped.
	pub uvs: Option<Vec<[f32; 2]>>,
	/// Declared triangle count.
	pub triangle_count: u16,
	/// Triangle vertex indices.
	pub triangles: Option<Vec<[u16; 3]>>,
}

/// One decoded block, tagged by layout.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBlock {
	/// `NiNode`.
	Node(NodeBlock),
	/// `NiTriShape`.
	Shape(ShapeBlock),
	/// `NiTriShapeData`.
	GeometryData(GeometryDataBlock),
}

impl RawBlock {
	/// Layout kind of this block.
	pub fn kind(&self) -> BlockKind {
		match self {
			Self::Node(_) => BlockKind::Node,
			Self::Shape(_) => BlockKind::Shape,
			Self::GeometryData(_) => BlockKind::GeometryData,
		}
	}

	/// On-disk type name.
	pub fn type_name(&self) -> &'static str {
		self.kind().type_name()
	}

	/// Object name.
	pub fn name(&self) -> &str {
		match self {
			Self::Node(node) => &node.attributed.name,
			Self::Shape(shape) => &shape.attributed.name,
			Self::GeometryData(data) => &data.name,
		}
	}

	/// Shared object fields, absent for geometry data.
	pub fn attributed(&self) -> Option<&Attributed> {
		match self {
			Self::Node(node) => Some(&node.attributed),
			Self::Shape(shape) => Some(&shape.attributed),
			Self::GeometryData(_) => None,
		}
	}

	/// Every outgoing link with a field label, including nulls.
	pub fn links(&self) -> Vec<(&'static str, Link)> {
		let mut out = Vec::new();
		if let Some(attributed) = self.attributed() {
			out.extend(attributed.property_links.iter().map(|link| ("property", *link)));
			out.push(("collision", attributed.collision_link));
		}
		match self {
			Self::Node(node) => {
				out.extend(node.child_links.iter().map(|link| ("child", *link)));
				out.extend(node.effect_links.iter().map(|link| ("effect", *link)));
			}
			Self::Shape(shape) => {
				out.push(("data", shape.data_link));
				out.push(("skin", shape.skin_link));
			}
			Self::GeometryData(_) => {}
		}
		out
	}
}
