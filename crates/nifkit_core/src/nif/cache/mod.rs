use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::nif::{NifError, Result};

mod archive;

pub use archive::{Archive, ArchiveEntry, archive_name_hash};

/// Directory of raw extracted cache files named by index (`12` or `12.dat`).
#[derive(Debug, Clone)]
pub struct CacheDir {
	root: PathBuf,
	files: BTreeMap<u32, PathBuf>,
}

impl CacheDir {
	/// Scan `root` for index-named files. Other files are ignored.
	pub fn open(root: impl AsRef<Path>) -> Result<Self> {
		let root = root.as_ref().to_path_buf();
		if !root.is_dir() {
			return Err(NifError::NotADirectory { path: root });
		}

		let mut files = BTreeMap::new();
		for entry in fs::read_dir(&root)? {
			let entry = entry?;
			if !entry.file_type()?.is_file() {
				continue;
			}
			let name = entry.file_name();
			let Some((index, bare)) = name.to_str().and_then(parse_index_name) else {
				continue;
			};
			// A bare `12` wins over `12.dat` when both exist.
			if bare || !files.contains_key(&index) {
				files.insert(index, entry.path());
			}
		}

		Ok(Self { root, files })
	}

	/// Directory this cache was opened from.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Available indices in ascending order.
	pub fn list_indices(&self) -> Vec<u32> {
		self.files.keys().copied().collect()
	}

	/// Path backing an index.
	pub fn path(&self, index: u32) -> Option<&Path> {
		self.files.get(&index).map(PathBuf::as_path)
	}

	/// Read the raw bytes stored for `index`.
	pub fn read(&self, index: u32) -> Result<Vec<u8>> {
		let path = self.path(index).ok_or(NifError::CacheIndexNotFound { index })?;
		Ok(fs::read(path)?)
	}

	/// Read `index` and parse it as a named sub-file archive.
	pub fn archive(&self, index: u32) -> Result<Archive> {
		Archive::parse(self.read(index)?)
	}

	/// Fetch one named entry out of the archive stored at `index`.
	pub fn named_file(&self, index: u32, name: &str) -> Result<Vec<u8>> {
		self.archive(index)?.file(name)
	}
}

fn parse_index_name(name: &str) -> Option<(u32, bool)> {
	let (stem, bare) = match name.strip_suffix(".dat") {
		Some(stem) => (stem, false),
		None => (name, true),
	};
	if stem.is_empty() || !stem.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}
	stem.parse().ok().map(|index| (index, bare))
}
