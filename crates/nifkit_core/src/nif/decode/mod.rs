use log::{debug, error};

use crate::nif::{
	Attributed, BlockKind, ByteStream, GeometryDataBlock, Link, NifError, NifHeader, NodeBlock, RawBlock, Result, ShapeBlock, Transform,
};

/// Runtime ceilings applied to length and count prefixes.
#[derive(Debug, Clone)]
pub struct ParseOptions {
	/// Maximum byte length of one inline string.
	pub max_string_len: usize,
	/// Maximum number of entries in one link list.
	pub max_link_count: usize,
	/// Maximum object count accepted from the header.
	pub max_blocks: usize,
}

impl Default for ParseOptions {
	fn default() -> Self {
		Self {
			max_string_len: 4096,
			max_link_count: 65536,
			max_blocks: 1 << 20,
		}
	}
}

type DecodeFn = fn(&mut FieldReader<'_, '_>) -> Result<RawBlock>;

/// Field layout per supported type name. Anything not listed aborts the parse.
const DECODERS: [(BlockKind, DecodeFn); 3] = [
	(BlockKind::Node, read_node),
	(BlockKind::Shape, read_shape),
	(BlockKind::GeometryData, read_geometry_data),
];

fn decoder_for(type_name: &str) -> Option<DecodeFn> {
	DECODERS.iter().find(|(kind, _)| kind.type_name() == type_name).map(|(_, decode)| *decode)
}

/// Decode `header.num_objects` blocks in file order.
///
/// The returned vector's positions are the link values other blocks use.
/// Any failure discards every block decoded so far.
pub fn decode_blocks(stream: &mut ByteStream<'_>, header: &NifHeader, opt: &ParseOptions) -> Result<Vec<RawBlock>> {
	let count = usize::try_from(header.num_objects).map_err(|_| NifError::TooManyBlocks {
		count: header.num_objects,
		max: opt.max_blocks,
	})?;
	if count > opt.max_blocks {
		return Err(NifError::TooManyBlocks {
			count: header.num_objects,
			max: opt.max_blocks,
		});
	}

	let mut blocks = Vec::with_capacity(count.min(1024));
	for index in 0..count {
		let at = stream.position();
		let mut fields = FieldReader { stream: &mut *stream, opt };
		let type_name = fields.read_string("type name").map_err(|err| err.in_block(index, at, "?"))?;

		let Some(decode) = decoder_for(&type_name) else {
			error!("block {index} at offset {at} has unknown type {type_name:?}, aborting");
			return Err(NifError::UnknownBlockType { index, at, type_name });
		};

		let block = decode(&mut fields).map_err(|err| err.in_block(index, at, &type_name))?;
		debug!("block {index} {type_name} at {at}..{}", stream.position());
		blocks.push(block);
	}

	Ok(blocks)
}

struct FieldReader<'s, 'a> {
	stream: &'s mut ByteStream<'a>,
	opt: &'s ParseOptions,
}

impl FieldReader<'_, '_> {
	fn read_string(&mut self, what: &'static str) -> Result<String> {
		let at = self.stream.position();
		let len = self.stream.read_u32_le()?;
		let len = self.checked_len(what, at, u64::from(len), self.opt.max_string_len)?;
		let raw = self.stream.read_bytes(len)?;
		Ok(String::from_utf8_lossy(&raw).into_owned())
	}

	fn checked_len(&self, what: &'static str, at: usize, len: u64, max: usize) -> Result<usize> {
		match usize::try_from(len) {
			Ok(value) if value <= max => Ok(value),
			_ => Err(NifError::ImplausibleLength { what, at, len, max }),
		}
	}

	fn read_link(&mut self) -> Result<Link> {
		self.stream.read_i32_le()
	}

	fn read_link_list(&mut self, what: &'static str) -> Result<Vec<Link>> {
		let at = self.stream.position();
		let count = self.stream.read_u32_le()?;
		let count = self.checked_len(what, at, u64::from(count), self.opt.max_link_count)?;
		self.stream.ensure(count.saturating_mul(4))?;
		(0..count).map(|_| self.read_link()).collect()
	}

	fn read_flag(&mut self) -> Result<bool> {
		Ok(self.stream.read_u8()? != 0)
	}

	fn read_f32s<const N: usize>(&mut self) -> Result<[f32; N]> {
		let mut out = [0.0_f32; N];
		for item in &mut out {
			*item = self.stream.read_f32_le()?;
		}
		Ok(out)
	}

	fn read_f32_runs<const N: usize>(&mut self, count: usize) -> Result<Vec<[f32; N]>> {
		self.stream.ensure(count.saturating_mul(N * 4))?;
		(0..count).map(|_| self.read_f32s::<N>()).collect()
	}

	/// Read `count` items of `N` floats only when the preceding presence flag is set.
	fn read_flagged_f32_runs<const N: usize>(&mut self, count: usize) -> Result<Option<Vec<[f32; N]>>> {
		if !self.read_flag()? {
			return Ok(None);
		}
		self.read_f32_runs::<N>(count).map(Some)
	}

	fn read_u16_list(&mut self) -> Result<Vec<u16>> {
		let count = usize::from(self.stream.read_u16_le()?);
		self.stream.ensure(count * 2)?;
		(0..count).map(|_| self.stream.read_u16_le()).collect()
	}

	fn read_transform(&mut self) -> Result<Transform> {
		let translation = self.read_f32s::<3>()?;
		let rotation = [self.read_f32s::<3>()?, self.read_f32s::<3>()?, self.read_f32s::<3>()?];
		let scale = self.stream.read_f32_le()?;
		Ok(Transform { translation, rotation, scale })
	}

	fn read_attributed(&mut self) -> Result<Attributed> {
		let name = self.read_string("name")?;
		let flags = self.stream.read_u16_le()?;
		let transform = self.read_transform()?;
		let property_links = self.read_link_list("property links")?;
		let collision_link = self.read_link()?;
		Ok(Attributed {
			name,
			flags,
			transform,
			property_links,
			collision_link,
		})
	}
}

fn read_node(fields: &mut FieldReader<'_, '_>) -> Result<RawBlock> {
	let attributed = fields.read_attributed()?;
	let child_links = fields.read_link_list("child links")?;
	let effect_links = fields.read_link_list("effect links")?;
	Ok(RawBlock::Node(NodeBlock {
		attributed,
		child_links,
		effect_links,
	}))
}

fn read_shape(fields: &mut FieldReader<'_, '_>) -> Result<RawBlock> {
	let attributed = fields.read_attributed()?;
	let data_link = fields.read_link()?;
	let skin_link = fields.read_link()?;
	Ok(RawBlock::Shape(ShapeBlock {
		attributed,
		data_link,
		skin_link,
	}))
}

fn read_geometry_data(fields: &mut FieldReader<'_, '_>) -> Result<RawBlock> {
	// Geometry data carries only a name, not the attributed transform prefix.
	let name = fields.read_string("name")?;
	let vertex_count = fields.stream.read_u16_le()?;
	let count = usize::from(vertex_count);

	let vertices = fields.read_flagged_f32_runs::<3>(count)?;
	let normals = fields.read_flagged_f32_runs::<3>(count)?;
	let bound_center = fields.read_f32s::<3>()?;
	let bound_radius = fields.stream.read_f32_le()?;
	let colors = fields.read_flagged_f32_runs::<4>(count)?;

	let uv_set_count = fields.stream.read_u16_le()?;
	let uvs = if fields.read_flag()? {
		let mut sets = (0..uv_set_count).map(|_| fields.read_f32_runs::<2>(count));
		let first = sets.next().transpose()?;
		for extra in sets {
			extra?;
		}
		first
	} else {
		None
	};

	let triangle_count = fields.stream.read_u16_le()?;
	let triangle_points = fields.stream.read_u32_le()?;
	let triangles = if triangle_points != 0 {
		let count = usize::from(triangle_count);
		fields.stream.ensure(count * 6)?;
		let mut out = Vec::with_capacity(count);
		for _ in 0..count {
			out.push([fields.stream.read_u16_le()?, fields.stream.read_u16_le()?, fields.stream.read_u16_le()?]);
		}
		Some(out)
	} else {
		None
	};

	let match_group_count = fields.stream.read_u16_le()?;
	for _ in 0..match_group_count {
		fields.read_u16_list()?;
	}

	Ok(RawBlock::GeometryData(GeometryDataBlock {
		name,
		vertex_count,
		vertices,
		normals,
		bound_center,
		bound_radius,
		colors,
		uv_set_count,
		uvs,
		triangle_count,
		triangles,
	}))
}
