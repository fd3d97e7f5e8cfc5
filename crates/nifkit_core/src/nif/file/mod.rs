use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::nif::{
	ByteStream, Link, NifHeader, ParseOptions, RawBlock, Result, SceneNode, SceneOptions, build_scene, decode_blocks, resolve_link,
};

/// Fully decoded `.nif` model: header plus the flat block array.
#[derive(Debug, Clone)]
pub struct NifFile {
	/// Parsed file header.
	pub header: NifHeader,
	/// Bytes left after the last block (footer data this decoder ignores).
	pub trailing_bytes: usize,
	blocks: Vec<RawBlock>,
}

impl NifFile {
	/// Read and decode a file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::open_with(path, &ParseOptions::default())
	}

	/// [`NifFile::open`] with explicit limits.
	pub fn open_with(path: impl AsRef<Path>, opt: &ParseOptions) -> Result<Self> {
		let bytes = fs::read(path)?;
		Self::parse(&bytes, opt)
	}

	/// Decode an in-memory buffer. Nothing borrowed from `bytes` is retained.
	pub fn parse(bytes: &[u8], opt: &ParseOptions) -> Result<Self> {
		let mut stream = ByteStream::new(bytes);
		let header = NifHeader::parse(&mut stream)?;
		let blocks = decode_blocks(&mut stream, &header, opt)?;

		Ok(Self {
			header,
			trailing_bytes: stream.remaining(),
			blocks,
		})
	}

	/// All blocks in link order.
	pub fn blocks(&self) -> &[RawBlock] {
		&self.blocks
	}

	/// Resolve a link into its block, `None` for null or out-of-range links.
	pub fn block(&self, link: Link) -> Option<&RawBlock> {
		resolve_link(link, self.blocks.len()).map(|index| &self.blocks[index])
	}

	/// Count blocks per type name.
	pub fn type_counts(&self) -> BTreeMap<&'static str, usize> {
		let mut counts = BTreeMap::new();
		for block in &self.blocks {
			*counts.entry(block.type_name()).or_insert(0) += 1;
		}
		counts
	}

	/// Build the owned scene tree rooted at block 0.
	pub fn scene(&self, options: &SceneOptions) -> SceneNode {
		build_scene(&self.blocks, options)
	}

	/// Drop the header and return the block array.
	pub fn into_blocks(self) -> Vec<RawBlock> {
		self.blocks
	}
}

#[cfg(test)]
mod tests;
