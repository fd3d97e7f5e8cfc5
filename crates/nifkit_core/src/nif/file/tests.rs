use std::fs;

use nifkit_testkit::{GeometrySpec, NifWriter, NodeSpec, ShapeSpec, VERSION_4_0_0_2, scratch_dir};

use crate::nif::{BlockKind, NifError, NifFile, ParseOptions};

fn sample() -> Vec<u8> {
	NifWriter::with_header(VERSION_4_0_0_2, 3)
		.node(&NodeSpec::new("Root", &[1]))
		.shape(&ShapeSpec::new("Tri", 2))
		.geometry_data(&GeometrySpec::triangle("TriData"))
		.finish()
}

#[test]
fn parse_reports_counts_and_trailing_bytes() {
	let mut bytes = sample();
	bytes.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
	let file = NifFile::parse(&bytes, &ParseOptions::default()).expect("parses");

	assert_eq!(file.header.num_objects, 3);
	assert_eq!(file.trailing_bytes, 8);
	assert_eq!(file.blocks().len(), 3);

	let counts = file.type_counts();
	assert_eq!(counts.get("NiNode"), Some(&1));
	assert_eq!(counts.get("NiTriShape"), Some(&1));
	assert_eq!(counts.get("NiTriShapeData"), Some(&1));
}

#[test]
fn block_lookup_resolves_links() {
	let file = NifFile::parse(&sample(), &ParseOptions::default()).expect("parses");
	assert_eq!(file.block(2).map(|block| block.kind()), Some(BlockKind::GeometryData));
	assert!(file.block(-1).is_none());
	assert!(file.block(3).is_none());
}

#[test]
fn fatal_error_returns_no_file() {
	let mut bytes = sample();
	bytes.truncate(bytes.len() - 1);
	let err = NifFile::parse(&bytes, &ParseOptions::default()).expect_err("truncated file fails");
	assert!(matches!(err, NifError::Block { index: 2, .. }));
}

#[test]
fn open_matches_in_memory_parse() {
	let dir = scratch_dir("file_open_from_disk");
	let path = dir.join("model.nif");
	fs::write(&path, sample()).expect("write model");

	let opened = NifFile::open(&path).expect("model opens");
	let parsed = NifFile::parse(&sample(), &ParseOptions::default()).expect("parses");
	assert_eq!(opened.header, parsed.header);
	assert_eq!(opened.blocks(), parsed.blocks());
}

#[test]
fn open_foreign_header_reports_bad_magic() {
	let dir = scratch_dir("file_open_foreign_header");
	let path = dir.join("newer.nif");
	let mut bytes = b"Gamebryo File Format, Version 20.0.0.5\n".to_vec();
	bytes.extend_from_slice(&[0_u8; 8]);
	fs::write(&path, bytes).expect("write");

	let err = NifFile::open(&path).expect_err("foreign header is not accepted");
	assert!(matches!(err, NifError::BadMagic { at: 0, ref line } if line.starts_with("Gamebryo File Format")));
}

#[test]
fn open_binary_junk_reports_bad_magic() {
	let dir = scratch_dir("file_open_junk");
	let path = dir.join("not_a_model.bin");
	fs::write(&path, b"\x89PNG\r\n").expect("write");

	let err = NifFile::open(&path).expect_err("png is not a nif");
	assert!(matches!(err, NifError::BadMagic { .. }));
}

#[test]
fn open_missing_file_is_io_error() {
	let dir = scratch_dir("file_open_missing");
	let err = NifFile::open(dir.join("absent.nif")).expect_err("missing file fails");
	assert!(matches!(err, NifError::Io(_)));
}
