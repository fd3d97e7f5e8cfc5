/// Block listing command.
pub mod blocks;
/// Cache directory commands.
pub mod cache;
/// File-level information command.
pub mod info;
/// Scene tree command.
pub mod scene;
/// Shared formatting and flag helpers.
pub mod util;
