use std::fs;
use std::path::PathBuf;

use nifkit::nif::{CacheDir, Result, archive_name_hash};

use crate::cmd::util::emit_json;

#[derive(clap::Subcommand)]
pub enum Command {
	/// List available file indices.
	List {
		dir: PathBuf,
		#[arg(long)]
		json: bool,
	},
	/// Print the entry table of the archive stored at an index.
	Entries {
		dir: PathBuf,
		index: u32,
		#[arg(long)]
		json: bool,
	},
	/// Write one named archive entry to disk.
	Extract {
		dir: PathBuf,
		index: u32,
		#[arg(long)]
		name: String,
		#[arg(long)]
		out: PathBuf,
	},
}

/// Dispatch a cache subcommand.
pub fn run(command: Command) -> Result<()> {
	match command {
		Command::List { dir, json } => run_list(dir, json),
		Command::Entries { dir, index, json } => run_entries(dir, index, json),
		Command::Extract { dir, index, name, out } => run_extract(dir, index, &name, out),
	}
}

fn run_list(dir: PathBuf, json: bool) -> Result<()> {
	let cache = CacheDir::open(&dir)?;
	let mut files = Vec::new();
	for index in cache.list_indices() {
		let size = match cache.path(index) {
			Some(path) => fs::metadata(path)?.len(),
			None => 0,
		};
		files.push(CacheFileJson { index, size });
	}

	if json {
		return emit_json(&CacheListJson {
			dir: dir.display().to_string(),
			files,
		});
	}

	println!("dir: {}", dir.display());
	for file in &files {
		println!("  {}: {} bytes", file.index, file.size);
	}
	println!("count: {}", files.len());
	Ok(())
}

fn run_entries(dir: PathBuf, index: u32, json: bool) -> Result<()> {
	let archive = CacheDir::open(&dir)?.archive(index)?;
	let entries: Vec<_> = archive
		.entries()
		.iter()
		.map(|entry| ArchiveEntryJson {
			name_hash: entry.name_hash,
			unpacked_len: entry.unpacked_len,
			packed_len: entry.packed_len,
			offset: entry.offset,
			compressed: entry.is_compressed(),
		})
		.collect();

	if json {
		return emit_json(&ArchiveJson {
			index,
			packed_whole: archive.is_packed_whole(),
			entries,
		});
	}

	for entry in &entries {
		println!(
			"  hash={:#010x} unpacked={} packed={} offset={}{}",
			entry.name_hash,
			entry.unpacked_len,
			entry.packed_len,
			entry.offset,
			if entry.compressed { " (compressed)" } else { "" }
		);
	}
	println!("entries: {} packed_whole: {}", entries.len(), archive.is_packed_whole());
	Ok(())
}

fn run_extract(dir: PathBuf, index: u32, name: &str, out: PathBuf) -> Result<()> {
	let bytes = CacheDir::open(&dir)?.named_file(index, name)?;
	fs::write(&out, &bytes)?;
	println!("wrote {} bytes ({name}, hash {}) to {}", bytes.len(), archive_name_hash(name), out.display());
	Ok(())
}

#[derive(serde::Serialize)]
struct CacheFileJson {
	index: u32,
	size: u64,
}

#[derive(serde::Serialize)]
struct CacheListJson {
	dir: String,
	files: Vec<CacheFileJson>,
}

#[derive(serde::Serialize)]
struct ArchiveEntryJson {
	name_hash: i32,
	unpacked_len: u32,
	packed_len: u32,
	offset: usize,
	compressed: bool,
}

#[derive(serde::Serialize)]
struct ArchiveJson {
	index: u32,
	packed_whole: bool,
	entries: Vec<ArchiveEntryJson>,
}
