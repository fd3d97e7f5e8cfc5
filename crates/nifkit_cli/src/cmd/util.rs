use std::io::Write;

use nifkit::nif::{Link, ParseOptions, Result};

/// Decode limits shared by every command that opens a `.nif`.
#[derive(clap::Args, Debug, Clone)]
pub struct ParseArgs {
	/// Maximum inline string length in bytes.
	#[arg(long, default_value_t = ParseOptions::default().max_string_len)]
	pub max_string_len: usize,
	/// Maximum entries in one link list.
	#[arg(long, default_value_t = ParseOptions::default().max_link_count)]
	pub max_link_count: usize,
	/// Maximum object count accepted from the header.
	#[arg(long, default_value_t = ParseOptions::default().max_blocks)]
	pub max_blocks: usize,
}

impl ParseArgs {
	/// Convert flags into library options.
	pub fn options(&self) -> ParseOptions {
		ParseOptions {
			max_string_len: self.max_string_len,
			max_link_count: self.max_link_count,
			max_blocks: self.max_blocks,
		}
	}
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn emit_json<T: serde::Serialize>(value: &T) -> Result<()> {
	let mut out = std::io::stdout().lock();
	serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
	writeln!(out)?;
	Ok(())
}

/// Render a link as its index or `null`.
pub(crate) fn link_label(link: Link) -> String {
	if link < 0 { "null".to_owned() } else { link.to_string() }
}

/// Render a float triple compactly.
pub(crate) fn vec3_label(value: [f32; 3]) -> String {
	format!("({}, {}, {})", value[0], value[1], value[2])
}
