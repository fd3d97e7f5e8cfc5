use std::path::PathBuf;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, NifError>;

/// Errors produced while reading `.nif` streams and raw cache files.
#[derive(Debug, Error)]
pub enum NifError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Leading text line is not a NetImmerse header.
	#[error("not a NetImmerse file (header at offset {at}: {line:?})")]
	BadMagic {
		/// Offset of the header line.
		at: usize,
		/// Header text that was read, if any.
		line: String,
	},
	/// A length or count prefix exceeded its configured ceiling.
	#[error("implausible {what} length {len} at offset {at} (max {max})")]
	ImplausibleLength {
		/// Which prefix was being read.
		what: &'static str,
		/// Offset of the prefix.
		at: usize,
		/// Declared length.
		len: u64,
		/// Configured ceiling.
		max: usize,
	},
	/// Object count in the header exceeded configured ceiling.
	#[error("object count {count} exceeds limit {max}")]
	TooManyBlocks {
		/// Declared object count.
		count: u32,
		/// Configured ceiling.
		max: usize,
	},
	/// Block announced a type name with no known field layout.
	#[error("unknown block type {type_name:?} for block {index} at offset {at}")]
	UnknownBlockType {
		/// Block index in parse order.
		index: usize,
		/// Offset where the block's type name starts.
		at: usize,
		/// Type name read from the stream.
		type_name: String,
	},
	/// A field read failed while decoding one block.
	#[error("block {index} ({type_name}) at offset {at}: {source}")]
	Block {
		/// Block index in parse order.
		index: usize,
		/// Offset where the block starts.
		at: usize,
		/// Type name, or `?` when the type name itself could not be read.
		type_name: String,
		/// Underlying failure.
		source: Box<NifError>,
	},
	/// Cache root is missing or not a directory.
	#[error("not a cache directory: {}", .path.display())]
	NotADirectory {
		/// Requested path.
		path: PathBuf,
	},
	/// No raw file exists for the requested cache index.
	#[error("cache index {index} not found")]
	CacheIndexNotFound {
		/// Requested index.
		index: u32,
	},
	/// Compressed archive data failed to inflate.
	#[error("archive bzip2 data is corrupt: {source}")]
	ArchiveDecompress {
		/// Decoder failure.
		source: std::io::Error,
	},
	/// Inflated archive data does not match its declared size.
	#[error("archive data inflated to {actual} bytes, expected {expected}")]
	ArchiveSizeMismatch {
		/// Declared unpacked size.
		expected: u32,
		/// Bytes actually produced, capped one past `expected`.
		actual: usize,
	},
	/// Requested archive entry name has no matching hash.
	#[error("archive entry not found: {name}")]
	ArchiveEntryNotFound {
		/// Requested entry name.
		name: String,
	},
	/// Archive entry payload extends past the archive data.
	#[error("archive entry {index} out of range: offset={offset}, len={len}, have={have}")]
	ArchiveEntryOutOfRange {
		/// Entry position in the archive table.
		index: usize,
		/// Payload start offset.
		offset: usize,
		/// Declared payload length.
		len: usize,
		/// Total archive bytes.
		have: usize,
	},
}

impl NifError {
	/// Wrap a field failure with the block it occurred in.
	pub(crate) fn in_block(self, index: usize, at: usize, type_name: &str) -> Self {
		Self::Block {
			index,
			at,
			type_name: type_name.to_owned(),
			source: Box::new(self),
		}
	}
}
