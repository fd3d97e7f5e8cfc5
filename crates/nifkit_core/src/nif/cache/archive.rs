use std::io::Read;

use bzip2::read::BzDecoder;

use crate::nif::{ByteStream, Endianness, NifError, Result};

/// Stream header stripped from every packed payload (bzip2, 100k blocks).
const BZIP2_HEADER: &[u8] = b"BZh1";

/// Bytes taken by the outer unpacked/packed size pair.
const OUTER_HEADER_LEN: usize = 6;

/// Hash used to key archive entries by name (case-insensitive).
pub fn archive_name_hash(name: &str) -> i32 {
	name.bytes()
		.map(|byte| byte.to_ascii_uppercase())
		.fold(0_i32, |hash, byte| hash.wrapping_mul(61).wrapping_add(i32::from(byte)).wrapping_sub(32))
}

/// One entry in an archive's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveEntry {
	/// Name hash, see [`archive_name_hash`].
	pub name_hash: i32,
	/// Declared unpacked size.
	pub unpacked_len: u32,
	/// Stored payload size.
	pub packed_len: u32,
	/// Payload offset within the archive body.
	pub offset: usize,
}

impl ArchiveEntry {
	/// Whether the payload is stored bzip2-packed.
	pub fn is_compressed(&self) -> bool {
		self.unpacked_len != self.packed_len
	}
}

/// Named sub-file archive held in memory.
///
/// When the outer sizes differ the whole body is packed and is inflated once
/// here; otherwise each entry may be packed on its own.
#[derive(Debug, Clone)]
pub struct Archive {
	body: Vec<u8>,
	packed_whole: bool,
	entries: Vec<ArchiveEntry>,
}

impl Archive {
	/// Parse the archive header and entry table, taking ownership of `data`.
	pub fn parse(data: Vec<u8>) -> Result<Self> {
		let mut stream = ByteStream::new(&data);
		let unpacked = stream.read_u24(Endianness::Big)?;
		let packed = stream.read_u24(Endianness::Big)?;

		let packed_whole = unpacked != packed;
		let body = if packed_whole {
			stream.ensure(packed as usize)?;
			inflate(&data[OUTER_HEADER_LEN..OUTER_HEADER_LEN + packed as usize], unpacked)?
		} else {
			data[OUTER_HEADER_LEN..].to_vec()
		};

		let entries = read_entries(&body)?;
		Ok(Self {
			body,
			packed_whole,
			entries,
		})
	}

	/// Whether the body was stored packed as a whole.
	pub fn is_packed_whole(&self) -> bool {
		self.packed_whole
	}

	/// Entry table in stored order.
	pub fn entries(&self) -> &[ArchiveEntry] {
		&self.entries
	}

	/// Look up an entry by name.
	pub fn find(&self, name: &str) -> Option<&ArchiveEntry> {
		let hash = archive_name_hash(name);
		self.entries.iter().find(|entry| entry.name_hash == hash)
	}

	/// Copy out an entry's payload by name, inflating packed entries.
	pub fn file(&self, name: &str) -> Result<Vec<u8>> {
		let entry = self.find(name).ok_or_else(|| NifError::ArchiveEntryNotFound { name: name.to_owned() })?;
		let payload = &self.body[entry.offset..entry.offset + entry.packed_len as usize];
		if entry.is_compressed() {
			return inflate(payload, entry.unpacked_len);
		}
		Ok(payload.to_vec())
	}
}

/// Inflate a headerless bzip2 payload and check its declared size.
fn inflate(packed: &[u8], unpacked_len: u32) -> Result<Vec<u8>> {
	let expected = unpacked_len as usize;
	let mut out = Vec::with_capacity(expected);
	BzDecoder::new(BZIP2_HEADER.chain(packed))
		.take(u64::from(unpacked_len) + 1)
		.read_to_end(&mut out)
		.map_err(|source| NifError::ArchiveDecompress { source })?;

	if out.len() != expected {
		return Err(NifError::ArchiveSizeMismatch {
			expected: unpacked_len,
			actual: out.len(),
		});
	}
	Ok(out)
}

fn read_entries(body: &[u8]) -> Result<Vec<ArchiveEntry>> {
	let mut stream = ByteStream::new(body);
	let count = usize::from(stream.read_u16(Endianness::Big)?);
	stream.ensure(count * 10)?;
	let mut table = Vec::with_capacity(count);
	for _ in 0..count {
		let name_hash = stream.read_i32(Endianness::Big)?;
		let unpacked_len = stream.read_u24(Endianness::Big)?;
		let packed_len = stream.read_u24(Endianness::Big)?;
		table.push((name_hash, unpacked_len, packed_len));
	}

	let mut offset = stream.position();
	let mut entries = Vec::with_capacity(count);
	for (index, (name_hash, unpacked_len, packed_len)) in table.into_iter().enumerate() {
		let len = packed_len as usize;
		if offset + len > body.len() {
			return Err(NifError::ArchiveEntryOutOfRange {
				index,
				offset,
				len,
				have: body.len(),
			});
		}
		entries.push(ArchiveEntry {
			name_hash,
			unpacked_len,
			packed_len,
			offset,
		});
		offset += len;
	}

	Ok(entries)
}
