mod block;
mod cache;
mod decode;
mod error;
mod file;
mod header;
mod scene;
mod stream;

/// Decoded block records and link helpers.
pub use block::{Attributed, BlockKind, GeometryDataBlock, Link, NULL_LINK, NodeBlock, RawBlock, ShapeBlock, Transform, resolve_link};
/// Raw cache directory and named sub-file archives.
pub use cache::{Archive, ArchiveEntry, CacheDir, archive_name_hash};
/// Block decoding entry points and limits.
pub use decode::{ParseOptions, decode_blocks};
/// Error and result aliases.
pub use error::{NifError, Result};
/// File abstraction over one decoded model.
pub use file::NifFile;
/// Text header and version tag.
pub use header::{NIF_MAGIC, NifHeader, SUPPORTED_VERSION};
/// Scene graph output types and builder.
pub use scene::{MAX_SCENE_DEPTH, MeshGeometry, SceneNode, SceneNodeKind, SceneOptions, build_scene};
/// Forward-only binary cursor.
pub use stream::{ByteStream, Endianness};
