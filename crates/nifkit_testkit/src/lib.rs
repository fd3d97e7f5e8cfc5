//! Shared test helpers for workspace crates.
//!
//! There are no binary fixtures in this repository; tests assemble `.nif`
//! streams and cache archives byte by byte with the writers below.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bzip2::Compression;
use bzip2::write::BzEncoder;

/// Header line written by [`NifWriter::with_header`].
pub const HEADER_LINE: &str = "NetImmerse File Format, Version 4.0.0.2";
/// Version tag of the legacy layout.
pub const VERSION_4_0_0_2: u32 = 0x0400_0002;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Create an empty per-test directory under the target dir.
pub fn scratch_dir(name: &str) -> PathBuf {
	let dir = target_dir().join("nifkit-tests").join(name);
	let _ = fs::remove_dir_all(&dir);
	fs::create_dir_all(&dir).expect("scratch dir is creatable");
	dir
}

/// Local transform written in stream order.
#[derive(Debug, Clone, Copy)]
pub struct TransformSpec {
	/// Translation vector.
	pub translation: [f32; 3],
	/// Rotation rows.
	pub rotation: [[f32; 3]; 3],
	/// Uniform scale.
	pub scale: f32,
}

impl Default for TransformSpec {
	fn default() -> Self {
		Self {
			translation: [0.0; 3],
			rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
			scale: 1.0,
		}
	}
}

/// `NiNode` record contents.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
	/// Object name.
	pub name: String,
	/// Flag bits.
	pub flags: u16,
	/// Local transform.
	pub transform: TransformSpec,
	/// Property links.
	pub properties: Vec<i32>,
	/// Collision link; written as-is.
	pub collision: i32,
	/// Child links.
	pub children: Vec<i32>,
	/// Effect links.
	pub effects: Vec<i32>,
}

impl NodeSpec {
	/// Node with identity transform, no collision, and the given children.
	pub fn new(name: &str, children: &[i32]) -> Self {
		Self {
			name: name.to_owned(),
			collision: -1,
			children: children.to_vec(),
			..Self::default()
		}
	}
}

/// `NiTriShape` record contents.
#[derive(Debug, Clone)]
pub struct ShapeSpec {
	/// Object name.
	pub name: String,
	/// Local transform.
	pub transform: TransformSpec,
	/// Geometry data link.
	pub data_link: i32,
	/// Skin link.
	pub skin_link: i32,
}

impl ShapeSpec {
	/// Shape with identity transform and no skin.
	pub fn new(name: &str, data_link: i32) -> Self {
		Self {
			name: name.to_owned(),
			transform: TransformSpec::default(),
			data_link,
			skin_link: -1,
		}
	}
}

/// `NiTriShapeData` record contents. `None` buffers are written with a zero presence flag.
#[derive(Debug, Clone, Default)]
pub struct GeometrySpec {
	/// Object name.
	pub name: String,
	/// Vertex count prefix.
	pub vertex_count: u16,
	/// Positions.
	pub vertices: Option<Vec<[f32; 3]>>,
	/// Normals.
	pub normals: Option<Vec<[f32; 3]>>,
	/// Bounding sphere center.
	pub bound_center: [f32; 3],
	/// Bounding sphere radius.
	pub bound_radius: f32,
	/// RGBA colors.
	pub colors: Option<Vec<[f32; 4]>>,
	/// UV sets, each holding one pair per vertex.
	pub uv_sets: Option<Vec<Vec<[f32; 2]>>>,
	/// Triangles.
	pub triangles: Option<Vec<[u16; 3]>>,
	/// Match groups.
	pub match_groups: Vec<Vec<u16>>,
}

impl GeometrySpec {
	/// A single triangle with positions, normals, one UV set, and no colors.
	pub fn triangle(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			vertex_count: 3,
			vertices: Some(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
			normals: Some(vec![[0.0, 0.0, 1.0]; 3]),
			bound_center: [0.25, 0.25, 0.0],
			bound_radius: 1.0,
			colors: None,
			uv_sets: Some(vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]]),
			triangles: Some(vec![[0, 1, 2]]),
			match_groups: vec![vec![0, 1]],
		}
	}
}

/// Little-endian `.nif` stream builder.
#[derive(Debug, Clone, Default)]
pub struct NifWriter {
	buf: Vec<u8>,
}

impl NifWriter {
	/// Empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Writer primed with the header line, `version`, and object count.
	pub fn with_header(version: u32, num_objects: u32) -> Self {
		Self::new().raw(HEADER_LINE.as_bytes()).u8(b'\n').u32(version).u32(num_objects)
	}

	/// Current byte length.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// Whether nothing has been written.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Append raw bytes.
	pub fn raw(mut self, bytes: &[u8]) -> Self {
		self.buf.extend_from_slice(bytes);
		self
	}

	/// Append one byte.
	pub fn u8(self, value: u8) -> Self {
		self.raw(&[value])
	}

	/// Append a `u16`.
	pub fn u16(self, value: u16) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append a `u32`.
	pub fn u32(self, value: u32) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append an `i32`.
	pub fn i32(self, value: i32) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append an `f32`.
	pub fn f32(self, value: f32) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append a slice of floats.
	pub fn f32s(self, values: &[f32]) -> Self {
		values.iter().fold(self, |out, value| out.f32(*value))
	}

	/// Append a `u32`-length-prefixed string.
	pub fn string(self, value: &str) -> Self {
		self.u32(value.len() as u32).raw(value.as_bytes())
	}

	/// Append a counted link list.
	pub fn links(self, links: &[i32]) -> Self {
		links.iter().fold(self.u32(links.len() as u32), |out, link| out.i32(*link))
	}

	fn transform(self, transform: &TransformSpec) -> Self {
		transform
			.rotation
			.iter()
			.fold(self.f32s(&transform.translation), |out, row| out.f32s(row))
			.f32(transform.scale)
	}

	fn attributed(self, name: &str, flags: u16, transform: &TransformSpec, properties: &[i32], collision: i32) -> Self {
		self.string(name).u16(flags).transform(transform).links(properties).i32(collision)
	}

	/// Append a complete `NiNode` block including its type name.
	pub fn node(self, spec: &NodeSpec) -> Self {
		self.string("NiNode")
			.attributed(&spec.name, spec.flags, &spec.transform, &spec.properties, spec.collision)
			.links(&spec.children)
			.links(&spec.effects)
	}

	/// Append a complete `NiTriShape` block including its type name.
	pub fn shape(self, spec: &ShapeSpec) -> Self {
		self.string("NiTriShape")
			.attributed(&spec.name, 0, &spec.transform, &[], -1)
			.i32(spec.data_link)
			.i32(spec.skin_link)
	}

	/// Append a complete `NiTriShapeData` block including its type name.
	pub fn geometry_data(self, spec: &GeometrySpec) -> Self {
		let mut out = self.string("NiTriShapeData").string(&spec.name).u16(spec.vertex_count);
		out = out.flagged(spec.vertices.as_deref().map(flatten3));
		out = out.flagged(spec.normals.as_deref().map(flatten3));
		out = out.f32s(&spec.bound_center).f32(spec.bound_radius);
		out = out.flagged(spec.colors.as_deref().map(|items| items.iter().flatten().copied().collect()));

		out = match &spec.uv_sets {
			Some(sets) => {
				let flat: Vec<f32> = sets.iter().flatten().flatten().copied().collect();
				out.u16(sets.len() as u16).u8(1).f32s(&flat)
			}
			None => out.u16(0).u8(0),
		};

		out = match &spec.triangles {
			Some(triangles) => {
				let count = triangles.len() as u16;
				let prefixed = out.u16(count).u32(u32::from(count) * 3);
				triangles.iter().flatten().fold(prefixed, |out, index| out.u16(*index))
			}
			None => out.u16(0).u32(0),
		};

		out = out.u16(spec.match_groups.len() as u16);
		for group in &spec.match_groups {
			out = group.iter().fold(out.u16(group.len() as u16), |out, index| out.u16(*index));
		}
		out
	}

	fn flagged(self, values: Option<Vec<f32>>) -> Self {
		match values {
			Some(values) => self.u8(1).f32s(&values),
			None => self.u8(0),
		}
	}

	/// Return the assembled bytes.
	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

fn flatten3(items: &[[f32; 3]]) -> Vec<f32> {
	items.iter().flatten().copied().collect()
}

/// Big-endian named sub-file archive builder.
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
	entries: Vec<(i32, u32, Vec<u8>)>,
}

impl ArchiveWriter {
	/// Empty archive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a stored entry.
	pub fn entry(mut self, name_hash: i32, data: &[u8]) -> Self {
		self.entries.push((name_hash, data.len() as u32, data.to_vec()));
		self
	}

	/// Add an entry whose declared unpacked size differs from its payload.
	pub fn packed_entry(mut self, name_hash: i32, unpacked_len: u32, data: &[u8]) -> Self {
		self.entries.push((name_hash, unpacked_len, data.to_vec()));
		self
	}

	/// Add an entry stored as headerless bzip2.
	pub fn bzip2_entry(self, name_hash: i32, data: &[u8]) -> Self {
		self.packed_entry(name_hash, data.len() as u32, &bzip2_headerless(data))
	}

	/// Assemble with matching outer sizes.
	pub fn finish(self) -> Vec<u8> {
		let body = self.body();
		let len = body.len() as u32;
		let mut out = Vec::with_capacity(body.len() + 6);
		out.extend_from_slice(&u24_be(len));
		out.extend_from_slice(&u24_be(len));
		out.extend_from_slice(&body);
		out
	}

	/// Assemble with the whole body stored as headerless bzip2.
	pub fn finish_compressed(self) -> Vec<u8> {
		let body = self.body();
		let packed = bzip2_headerless(&body);
		let mut out = Vec::with_capacity(packed.len() + 6);
		out.extend_from_slice(&u24_be(body.len() as u32));
		out.extend_from_slice(&u24_be(packed.len() as u32));
		out.extend_from_slice(&packed);
		out
	}

	fn body(&self) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
		for (hash, unpacked, data) in &self.entries {
			out.extend_from_slice(&hash.to_be_bytes());
			out.extend_from_slice(&u24_be(*unpacked));
			out.extend_from_slice(&u24_be(data.len() as u32));
		}
		for (_, _, data) in &self.entries {
			out.extend_from_slice(data);
		}
		out
	}
}

/// Compress with bzip2 at 100k blocks and strip the 4-byte `BZh1` header.
pub fn bzip2_headerless(data: &[u8]) -> Vec<u8> {
	let mut encoder = BzEncoder::new(Vec::new(), Compression::new(1));
	encoder.write_all(data).expect("write into Vec");
	let framed = encoder.finish().expect("finish bzip2 stream");
	framed[4..].to_vec()
}

fn u24_be(value: u32) -> [u8; 3] {
	let [_, a, b, c] = value.to_be_bytes();
	[a, b, c]
}
