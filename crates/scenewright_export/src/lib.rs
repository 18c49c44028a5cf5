//! Export adapters for Scenewright screenplays.
//!
//! Exports read a finished [`Screenplay`](scenewright_core::Screenplay) and never
//! modify it:
//!
//! - [`script_text`] renders the script as scene-delimited markdown text
//! - [`transitions_markdown`] lists the transition between each pair of scenes
//! - [`keyframe_archive`] packs every keyframe into a zip archive
//! - [`ExportBundle`] writes all of the above into a directory
//!
//! # Example
//!
//! ```no_run
//! use scenewright_core::Screenplay;
//! use scenewright_export::ExportBundle;
//!
//! # fn run(screenplay: Screenplay) -> Result<(), scenewright_error::ExportError> {
//! let written = ExportBundle::new(screenplay, None).write_to("out")?;
//! println!("wrote {} files", written.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod bundle;
mod text;

pub use archive::{KEYFRAME_ARCHIVE, keyframe_archive, keyframe_filename};
pub use bundle::{ExportBundle, SCRIPT_FILE, THUMBNAIL_FILE, TRANSITIONS_FILE};
pub use text::{script_text, transitions_markdown};
