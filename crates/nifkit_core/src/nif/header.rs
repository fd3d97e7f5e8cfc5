use log::warn;

use crate::nif::{ByteStream, NifError, Result};

/// Required prefix of the leading text line.
pub const NIF_MAGIC: &str = "NetImmerse File Format";
/// Binary version tag of the legacy layout this decoder understands (4.0.0.2).
pub const SUPPORTED_VERSION: u32 = 0x0400_0002;

/// Parsed header fields preceding the block stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NifHeader {
	/// Text header line without its terminator.
	pub line: String,
	/// Binary version tag.
	pub version: u32,
	/// Number of blocks that follow.
	pub num_objects: u32,
}

impl NifHeader {
	/// Read the header from the start of `stream`.
	///
	/// A bad text line is fatal. A version other than [`SUPPORTED_VERSION`]
	/// only logs a warning.
	pub fn parse(stream: &mut ByteStream<'_>) -> Result<Self> {
		let at = stream.position();
		let line = stream.read_line().map_err(|_| NifError::BadMagic { at, line: String::new() })?;
		if !line.starts_with(NIF_MAGIC) {
			return Err(NifError::BadMagic { at, line });
		}

		let version = stream.read_u32_le()?;
		if version != SUPPORTED_VERSION {
			warn!(
				"nif version {} differs from supported {}, continuing",
				format_version(version),
				format_version(SUPPORTED_VERSION)
			);
		}

		let num_objects = stream.read_u32_le()?;
		Ok(Self { line, version, num_objects })
	}

	/// Whether the version tag matches the supported layout.
	pub fn is_supported_version(&self) -> bool {
		self.version == SUPPORTED_VERSION
	}

	/// Dotted version label such as `4.0.0.2`.
	pub fn version_label(&self) -> String {
		format_version(self.version)
	}
}

fn format_version(version: u32) -> String {
	let [a, b, c, d] = version.to_be_bytes();
	format!("{a}.{b}.{c}.{d}")
}
