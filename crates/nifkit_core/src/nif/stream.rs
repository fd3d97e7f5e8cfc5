use crate::nif::{NifError, Result};

/// Byte order for multi-byte primitive reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
	/// Least significant byte first.
	Little,
	/// Most significant byte first.
	Big,
}

impl Endianness {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}
}

/// Forward-only cursor over an immutable byte buffer.
///
/// Every successful read advances the position by exactly the width it
/// consumed. A read that would run past the end fails without moving the
/// cursor.
pub struct ByteStream<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> ByteStream<'a> {
	/// Create a stream positioned at offset 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Fail unless at least `n` more bytes are available.
	pub fn ensure(&self, n: usize) -> Result<()> {
		if n > self.remaining() {
			return Err(NifError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}
		Ok(())
	}

	fn take(&mut self, n: usize) -> Result<&'a [u8]> {
		self.ensure(n)?;
		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.take(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		let [byte] = self.take_array::<1>()?;
		Ok(byte)
	}

	/// Read a `u16` using the selected endianness.
	pub fn read_u16(&mut self, endianness: Endianness) -> Result<u16> {
		let buf = self.take_array::<2>()?;
		Ok(match endianness {
			Endianness::Little => u16::from_le_bytes(buf),
			Endianness::Big => u16::from_be_bytes(buf),
		})
	}

	/// Read a 3-byte unsigned integer widened to `u32`.
	pub fn read_u24(&mut self, endianness: Endianness) -> Result<u32> {
		let [a, b, c] = self.take_array::<3>()?;
		Ok(match endianness {
			Endianness::Little => u32::from_le_bytes([a, b, c, 0]),
			Endianness::Big => u32::from_be_bytes([0, a, b, c]),
		})
	}

	/// Read a `u32` using the selected endianness.
	pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32> {
		let buf = self.take_array::<4>()?;
		Ok(match endianness {
			Endianness::Little => u32::from_le_bytes(buf),
			Endianness::Big => u32::from_be_bytes(buf),
		})
	}

	/// Read an `i32` using the selected endianness.
	pub fn read_i32(&mut self, endianness: Endianness) -> Result<i32> {
		let buf = self.take_array::<4>()?;
		Ok(match endianness {
			Endianness::Little => i32::from_le_bytes(buf),
			Endianness::Big => i32::from_be_bytes(buf),
		})
	}

	/// Read an IEEE-754 single using the selected endianness.
	pub fn read_f32(&mut self, endianness: Endianness) -> Result<f32> {
		let buf = self.take_array::<4>()?;
		Ok(match endianness {
			Endianness::Little => f32::from_le_bytes(buf),
			Endianness::Big => f32::from_be_bytes(buf),
		})
	}

	/// Read a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16> {
		self.read_u16(Endianness::Little)
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		self.read_u32(Endianness::Little)
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		self.read_i32(Endianness::Little)
	}

	/// Read a little-endian `f32`.
	pub fn read_f32_le(&mut self) -> Result<f32> {
		self.read_f32(Endianness::Little)
	}

	/// Read the next `n` bytes as an owned copy.
	pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
		Ok(self.take(n)?.to_vec())
	}

	/// Read bytes up to the next `\n`, consuming but not returning the terminator.
	pub fn read_line(&mut self) -> Result<String> {
		let rem = &self.bytes[self.pos.min(self.bytes.len())..];
		let Some(rel_end) = rem.iter().position(|byte| *byte == b'\n') else {
			return Err(NifError::UnexpectedEof {
				at: self.pos,
				need: rem.len() + 1,
				rem: rem.len(),
			});
		};

		let line = String::from_utf8_lossy(&rem[..rel_end]).into_owned();
		self.pos += rel_end + 1;
		Ok(line)
	}
}
