//! Core building blocks shared by the htkprep utilities.
//!
//! - [`features`]: binary feature file framing (header + row-major `f32` matrix)
//!   and the `parmKind` tag.
//! - [`mask`]: positional copy/drop/stop masks used to derive names from
//!   identifiers and directories.
//! - [`scp`]: string surgery on SCP path-list lines.
//! - [`text`]: C-style number formatting for text outputs.

pub mod features;
pub mod mask;
pub mod scp;
pub mod text;
